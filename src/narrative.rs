//! Derived text: a numbered timeline narrating the pipeline, plus the SQL
//! description and SQL placeholder.

use crate::labels::{Language, TreeLabels};
use crate::record::PipelineStep;
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedText {
    pub nl_steps: Vec<String>,
    pub sql_description: String,
    pub sql: String,
}

/// First entry is the timeline label, then the decomposition stage, then one
/// sentence per pipeline step in order.
pub fn derive_text(pipeline: &[PipelineStep], labels: &TreeLabels) -> DerivedText {
    let mut nl_steps = Vec::with_capacity(pipeline.len() + 2);
    nl_steps.push(labels.timeline.clone());
    nl_steps.push(format!("1) {}", labels.decomposition_stage));
    for (i, step) in pipeline.iter().enumerate() {
        nl_steps.push(format!("{}) {}", i + 2, describe_step(step, labels.language)));
    }

    DerivedText {
        nl_steps,
        sql_description: labels.sql_description.clone(),
        sql: labels.sql.clone(),
    }
}

pub fn describe_step(step: &PipelineStep, language: Language) -> String {
    match language {
        Language::Chinese => describe_zh(step),
        Language::English => describe_en(step),
    }
}

fn describe_zh(step: &PipelineStep) -> String {
    match step {
        PipelineStep::DataRetrieval { table_name, columns } if columns.is_empty() => {
            format!("从 {} 读取数据", table_name)
        }
        PipelineStep::DataRetrieval { table_name, columns } => {
            format!("从 {} 读取 {}", table_name, columns.iter().join("、"))
        }
        PipelineStep::Filter { input, condition, output } => {
            format!("筛选 {}（{}）得到 {}", input, condition, output)
        }
        PipelineStep::Join { left, right, on, output, .. } => {
            format!("按 {} 关联 {} 与 {} 得到 {}", on, left, right, output)
        }
        PipelineStep::Aggregate { input, group_by, metrics, .. } => {
            let outputs = metrics.iter().map(|m| &m.alias).join("、");
            if group_by.is_empty() {
                format!("汇总 {} 得到 {}", input, outputs)
            } else {
                format!("按 {} 汇总 {} 得到 {}", group_by.iter().join("、"), input, outputs)
            }
        }
    }
}

fn describe_en(step: &PipelineStep) -> String {
    match step {
        PipelineStep::DataRetrieval { table_name, columns } if columns.is_empty() => {
            format!("Read {}", table_name)
        }
        PipelineStep::DataRetrieval { table_name, columns } => {
            format!("Read {} from {}", columns.iter().join(", "), table_name)
        }
        PipelineStep::Filter { input, condition, output } => {
            format!("Filter {} where {} into {}", input, condition, output)
        }
        PipelineStep::Join { left, right, on, output, .. } => {
            format!("Join {} with {} on {} into {}", left, right, on, output)
        }
        PipelineStep::Aggregate { input, group_by, metrics, .. } => {
            let outputs = metrics
                .iter()
                .map(|m| format!("{}({}) as {}", m.function, m.field, m.alias))
                .join(", ");
            if group_by.is_empty() {
                format!("Aggregate {} into {}", input, outputs)
            } else {
                format!("Aggregate {} by {} into {}", input, group_by.iter().join(", "), outputs)
            }
        }
    }
}
