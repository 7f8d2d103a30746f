use crate::tree::{NodeData, TreeNode};
use itertools::Itertools;

/// Render a tree as a human-readable multiline outline, one node per line in
/// pre-order, indented two spaces per level.
pub fn outline(root: &TreeNode) -> String {
    let mut out = String::new();
    fmt_node(root, 0, &mut out);
    out
}

fn fmt_node(node: &TreeNode, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    out.push_str(&format!("{pad}[{}] {}", node.node_type, node.id));
    if !node.label.is_empty() {
        out.push_str(&format!(" \"{}\"", node.label));
    }
    if let Some(summary) = node.data.as_ref().and_then(summarize) {
        out.push_str(&format!(" {summary}"));
    }
    out.push('\n');
    for child in &node.children {
        fmt_node(child, indent + 1, out);
    }
}

fn summarize(data: &NodeData) -> Option<String> {
    let summary = match data {
        // the bucket title already shows up as its label
        NodeData::Bucket { .. } => return None,
        NodeData::Metric { technical_name, aggregation } => match aggregation {
            Some(aggregation) => format!("{aggregation}({technical_name})"),
            None => technical_name.clone(),
        },
        NodeData::Dimension { technical_name } => technical_name.clone(),
        NodeData::FilterConcept { technical_name, operator, value } => {
            format!("{technical_name} {operator} {value}")
        }
        NodeData::Note { description } => format!("note: {description}"),
        NodeData::DataRetrieval { table_name, columns } => {
            format!("table={table_name} columns=[{}]", columns.iter().join(", "))
        }
        NodeData::FilterStep { input, condition, output } => {
            format!("{input} -> {output} where {condition}")
        }
        NodeData::Join { left, right, on, output, .. } => {
            format!("{left} ⋈ {right} on={on} -> {output}")
        }
        NodeData::Aggregate { input, group_by, metrics, table_name, .. } => {
            let aggs = metrics
                .iter()
                .map(|m| format!("{} := {}({})", m.alias, m.function, m.field))
                .join(", ");
            format!("{input} group_by=[{}] aggs=[{aggs}] -> {table_name}", group_by.iter().join(", "))
        }
    };
    Some(summary)
}
