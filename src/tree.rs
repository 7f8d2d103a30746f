//! Visualization Tree
//!
//! A rooted, ordered tree of [`TreeNode`]s. Every node carries a category from
//! the closed [`NodeType`] set and, except for the root, a [`NodeData`] payload
//! whose shape follows that category. Serialized field names match what the
//! tree renderer consumes (`type`, `tableName`, `fn`, `as`, ...).

use crate::record::AggregateMetric;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Root,
    /// Bucket holding metrics or dimensions.
    Projection,
    /// Filter bucket, filter concept or filter pipeline step.
    Filter,
    Metric,
    Dimension,
    /// Natural-language knowledge note.
    Nl,
    DataRetrieval,
    Join,
    Aggregate,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Projection => "projection",
            NodeType::Filter => "filter",
            NodeType::Metric => "metric",
            NodeType::Dimension => "dimension",
            NodeType::Nl => "nl",
            NodeType::DataRetrieval => "data_retrieval",
            NodeType::Join => "join",
            NodeType::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category payload.
///
/// Untagged on the wire: the node's `type` field already names the category.
/// Variant order matters for deserialization, most specific shapes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeData {
    Join {
        left: String,
        right: String,
        on: String,
        output: String,
        #[serde(rename = "tableName")]
        table_name: String,
        columns: Vec<String>,
    },
    Aggregate {
        input: String,
        group_by: Vec<String>,
        metrics: Vec<AggregateMetric>,
        #[serde(rename = "tableName")]
        table_name: String,
        columns: Vec<String>,
    },
    DataRetrieval {
        #[serde(rename = "tableName")]
        table_name: String,
        columns: Vec<String>,
    },
    FilterStep {
        input: String,
        condition: String,
        output: String,
    },
    FilterConcept {
        technical_name: String,
        operator: String,
        value: serde_json::Value,
    },
    /// A metric without aggregation has the same wire shape as a dimension;
    /// [`TreeNode`] deserialization uses the node type to tell them apart.
    Metric {
        technical_name: String,
        #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "Option::deserialize")]
        aggregation: Option<String>,
    },
    Dimension {
        technical_name: String,
    },
    Note {
        description: String,
    },
    Bucket {
        title: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTreeNode")]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData>,
}

#[derive(Deserialize)]
struct RawTreeNode {
    id: String,
    label: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default)]
    children: Vec<TreeNode>,
    #[serde(default)]
    data: Option<NodeData>,
}

impl From<RawTreeNode> for TreeNode {
    fn from(raw: RawTreeNode) -> Self {
        let data = match (raw.node_type, raw.data) {
            (NodeType::Metric, Some(NodeData::Dimension { technical_name })) => {
                Some(NodeData::Metric { technical_name, aggregation: None })
            }
            (_, data) => data,
        };
        Self {
            id: raw.id,
            label: raw.label,
            node_type: raw.node_type,
            children: raw.children,
            data,
        }
    }
}

impl TreeNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType, data: Option<NodeData>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            children: Vec::new(),
            data,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal starting at (and including) this node.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.iter().find(|node| node.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Builder output: the tree plus its derived text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResponse {
    pub root: TreeNode,
    pub nl_steps: Vec<String>,
    pub sql_description: String,
    pub sql: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        let mut root = TreeNode::new("root", "q", NodeType::Root, None);
        let mut a = TreeNode::new("a", "A", NodeType::Projection, Some(NodeData::Bucket { title: "A".into() }));
        a.children.push(TreeNode::new("a1", "", NodeType::Nl, Some(NodeData::Note { description: "n".into() })));
        let b = TreeNode::new("b", "B", NodeType::Filter, Some(NodeData::Bucket { title: "B".into() }));
        root.children.push(a);
        root.children.push(b);
        root
    }

    #[test]
    fn test_preorder_visits_parent_before_children_in_order() {
        let root = sample();
        let ids: Vec<&str> = root.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_find_count_depth() {
        let root = sample();
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.depth(), 3);
        assert_eq!(root.find("a1").map(|n| n.node_type), Some(NodeType::Nl));
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn test_root_serializes_without_data() {
        let json = serde_json::to_value(TreeNode::new("root", "q", NodeType::Root, None)).unwrap();
        assert_eq!(json["type"], "root");
        assert!(json.get("data").is_none());
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn test_payload_wire_names() {
        let node = TreeNode::new(
            "step-1",
            "",
            NodeType::DataRetrieval,
            Some(NodeData::DataRetrieval { table_name: "orders".into(), columns: vec!["date".into()] }),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "data_retrieval");
        assert_eq!(json["data"]["tableName"], "orders");
    }

    #[test]
    fn test_untagged_payload_reads_back_as_same_variant() {
        let dimension = NodeData::Dimension { technical_name: "store_name".into() };
        let metric = NodeData::Metric { technical_name: "sales".into(), aggregation: Some("SUM".into()) };
        for data in [dimension, metric] {
            let back: NodeData = serde_json::from_value(serde_json::to_value(&data).unwrap()).unwrap();
            assert_eq!(back, data);
        }
    }

    #[test]
    fn test_metric_without_aggregation_keeps_its_variant() {
        let mut bucket = TreeNode::new("bucket-metrics", "指标", NodeType::Projection, Some(NodeData::Bucket { title: "指标".into() }));
        bucket.children.push(TreeNode::new(
            "metric-sales",
            "销售额",
            NodeType::Metric,
            Some(NodeData::Metric { technical_name: "sales".into(), aggregation: None }),
        ));
        bucket.children.push(TreeNode::new(
            "dimension-store_name",
            "门店",
            NodeType::Dimension,
            Some(NodeData::Dimension { technical_name: "store_name".into() }),
        ));

        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["children"][0]["data"], serde_json::json!({"technical_name": "sales"}));

        let back: TreeNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, bucket);
    }
}
