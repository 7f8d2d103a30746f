//! Display strings used by the tree builder and the narrative.

use serde::{Deserialize, Serialize};

/// Language the per-step narrative sentences are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Chinese,
    English,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLabels {
    pub language: Language,
    pub root_id: String,
    /// Prepended to the raw query text to form the root label.
    pub root_prefix: String,
    pub metrics_title: String,
    pub dimensions_title: String,
    pub filters_title: String,
    pub timeline: String,
    pub decomposition_stage: String,
    pub sql_description: String,
    pub sql: String,
}

impl TreeLabels {
    pub fn chinese() -> Self {
        Self {
            language: Language::Chinese,
            root_id: "root-json".to_string(),
            root_prefix: "用户查询：".to_string(),
            metrics_title: "指标".to_string(),
            dimensions_title: "维度".to_string(),
            filters_title: "过滤条件".to_string(),
            timeline: "时间线".to_string(),
            decomposition_stage: "拆解目标（指标/维度/过滤条件）".to_string(),
            sql_description: "基于时间线执行：拆解 → 取数/过滤 → 关联 → 汇总。".to_string(),
            sql: "-- 如需展示 SQL，可在此处生成拼接\n".to_string(),
        }
    }

    pub fn english() -> Self {
        Self {
            language: Language::English,
            root_id: "root-json".to_string(),
            root_prefix: "User query: ".to_string(),
            metrics_title: "Metrics".to_string(),
            dimensions_title: "Dimensions".to_string(),
            filters_title: "Filters".to_string(),
            timeline: "Timeline".to_string(),
            decomposition_stage: "Decompose the goal (metrics / dimensions / filters)".to_string(),
            sql_description: "Executed along the timeline: decompose → retrieve/filter → join → aggregate.".to_string(),
            sql: "-- SQL rendering can be assembled here\n".to_string(),
        }
    }

    /// Returns the named preset (`zh` or `en`).
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "zh" | "zh-CN" | "chinese" => Some(Self::chinese()),
            "en" | "english" => Some(Self::english()),
            _ => None,
        }
    }
}

impl Default for TreeLabels {
    fn default() -> Self {
        Self::chinese()
    }
}
