//! Input Record
//!
//! The analytic record a tree is built from: the raw user query, its
//! decomposition into metrics / dimensions / filters, free-text concept
//! notes and the ordered pipeline of retrieval / transform steps.

use crate::error::{BiTreeError, Result};
use crate::tree::NodeType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Key under which fixtures and the transform endpoint nest the record.
pub const ENVELOPE_KEY: &str = "bi_process_tree";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiProcessTree {
    pub user_query: UserQuery,
    pub query_decomposition: QueryDecomposition,
    #[serde(default)]
    pub concept_annotations: Vec<ConceptAnnotation>,
    #[serde(default)]
    pub pipeline: Vec<PipelineStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuery {
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDecomposition {
    pub metrics: Vec<MetricConcept>,
    pub dimensions: Vec<DimensionConcept>,
    pub filters: Vec<FilterConcept>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConcept {
    pub name: String,
    pub technical_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionConcept {
    pub name: String,
    pub technical_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConcept {
    pub field_name: String,
    pub technical_name: String,
    pub operator: String,
    /// Scalar for `=`, array for `BETWEEN` / `IN`; kept as-is.
    pub value: serde_json::Value,
}

/// A knowledge note about one concept. `concept` is an annotation key that
/// is resolved to a concept node id by [`crate::annotations::AnnotationTargets`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptAnnotation {
    pub concept: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineStep {
    DataRetrieval {
        #[serde(rename = "tableName", alias = "table_name")]
        table_name: String,
        #[serde(default)]
        columns: Vec<String>,
    },
    Filter {
        input: String,
        condition: String,
        output: String,
    },
    Join {
        left: String,
        right: String,
        on: String,
        output: String,
        #[serde(rename = "tableName", alias = "table_name")]
        table_name: String,
        #[serde(default)]
        columns: Vec<String>,
    },
    Aggregate {
        input: String,
        #[serde(default)]
        group_by: Vec<String>,
        metrics: Vec<AggregateMetric>,
        #[serde(rename = "tableName", alias = "table_name")]
        table_name: String,
        #[serde(default)]
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetric {
    pub field: String,
    #[serde(rename = "fn")]
    pub function: String,
    #[serde(rename = "as")]
    pub alias: String,
}

impl PipelineStep {
    pub fn node_type(&self) -> NodeType {
        match self {
            PipelineStep::DataRetrieval { .. } => NodeType::DataRetrieval,
            PipelineStep::Filter { .. } => NodeType::Filter,
            PipelineStep::Join { .. } => NodeType::Join,
            PipelineStep::Aggregate { .. } => NodeType::Aggregate,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    bi_process_tree: BiProcessTree,
}

impl BiProcessTree {
    /// Parse either a bare record or one wrapped as `{"bi_process_tree": {...}}`.
    ///
    /// The text is decoded straight into the record so that structural
    /// errors carry the line and column of the offending object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(BiTreeError::from_parse)?;
        if value.get(ENVELOPE_KEY).is_some() {
            serde_json::from_str::<Envelope>(json)
                .map(|envelope| envelope.bi_process_tree)
                .map_err(BiTreeError::from_parse)
        } else {
            serde_json::from_str(json).map_err(BiTreeError::from_parse)
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "user_query": {"raw_text": "2022年销售额"},
        "query_decomposition": {"metrics": [], "dimensions": [], "filters": []}
    }"#;

    #[test]
    fn test_bare_and_wrapped_records_parse_the_same() {
        let bare = BiProcessTree::from_json_str(MINIMAL).unwrap();
        let wrapped = BiProcessTree::from_json_str(&format!(r#"{{"bi_process_tree": {}}}"#, MINIMAL)).unwrap();
        assert_eq!(bare, wrapped);
        assert!(bare.pipeline.is_empty());
        assert!(bare.concept_annotations.is_empty());
    }

    #[test]
    fn test_missing_decomposition_is_structural_error() {
        let err = BiProcessTree::from_json_str(r#"{"user_query": {"raw_text": "x"}}"#).unwrap_err();
        assert!(matches!(err, BiTreeError::MissingField { ref field, .. } if field == "query_decomposition"));

        let err = BiProcessTree::from_json_str(r#"{"bi_process_tree": {"user_query": {"raw_text": "x"}}}"#).unwrap_err();
        assert!(matches!(err, BiTreeError::MissingField { ref field, .. } if field == "query_decomposition"));
    }

    #[test]
    fn test_metric_without_aggregation_parses() {
        let record = BiProcessTree::from_json_str(
            r#"{
                "user_query": {"raw_text": "销售额"},
                "query_decomposition": {
                    "metrics": [{"name": "销售额", "technical_name": "sales"}],
                    "dimensions": [],
                    "filters": []
                }
            }"#,
        )
        .unwrap();
        assert_eq!(record.query_decomposition.metrics[0].aggregation, None);
    }

    #[test]
    fn test_missing_field_reports_position() {
        let json = concat!(
            "{\"user_query\": {\"raw_text\": \"x\"},\n",
            "\"query_decomposition\": {\n",
            "\"metrics\": [{\"technical_name\": \"sales\"}],\n",
            "\"dimensions\": [{\"technical_name\": \"store_name\"}],\n",
            "\"filters\": []}}"
        );
        let metric_err = BiProcessTree::from_json_str(json).unwrap_err();
        match metric_err {
            BiTreeError::MissingField { field, line, .. } => {
                assert_eq!(field, "name");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let fixed_metric = json.replace(r#"{"technical_name": "sales"}"#, r#"{"name": "销售额", "technical_name": "sales"}"#);
        match BiProcessTree::from_json_str(&fixed_metric).unwrap_err() {
            BiTreeError::MissingField { field, line, .. } => {
                assert_eq!(field, "name");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_steps_parse_by_type_tag() {
        let json = r#"[
            {"type": "data_retrieval", "tableName": "orders", "columns": ["date", "sales"]},
            {"type": "filter", "input": "orders", "condition": "date = '2022-01-01'", "output": "day_orders"},
            {"type": "join", "left": "a", "right": "b", "on": "store_name", "output": "ab", "table_name": "ab", "columns": []},
            {"type": "aggregate", "input": "ab", "metrics": [{"field": "sales", "fn": "SUM", "as": "total"}], "tableName": "result"}
        ]"#;
        let steps: Vec<PipelineStep> = serde_json::from_str(json).unwrap();

        let kinds: Vec<NodeType> = steps.iter().map(PipelineStep::node_type).collect();
        assert_eq!(kinds, vec![NodeType::DataRetrieval, NodeType::Filter, NodeType::Join, NodeType::Aggregate]);
        match &steps[3] {
            PipelineStep::Aggregate { group_by, metrics, .. } => {
                assert!(group_by.is_empty());
                assert_eq!(metrics[0].alias, "total");
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_step_type_rejected() {
        let err = serde_json::from_str::<PipelineStep>(r#"{"type": "window", "input": "x"}"#);
        assert!(err.is_err());
    }
}
