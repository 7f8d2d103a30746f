//! Tree Builder
//!
//! Converts one [`BiProcessTree`] into a [`TransformResponse`] in a single pass:
//!
//! 1. root node labelled with the raw query
//! 2. three fixed buckets (metrics, dimensions, filters)
//! 3. one concept node per decomposition entry, in input order
//! 4. knowledge notes hung under the concept they annotate
//! 5. the pipeline as a linear chain anchored under the filters bucket
//!
//! Ids are derived from semantic keys only, so the same record always yields
//! the same tree.

use crate::annotations::AnnotationTargets;
use crate::error::{BiTreeError, Result};
use crate::labels::TreeLabels;
use crate::narrative::derive_text;
use crate::record::{BiProcessTree, ConceptAnnotation, DimensionConcept, FilterConcept, MetricConcept, PipelineStep};
use crate::tree::{NodeData, NodeType, TransformResponse, TreeNode};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

pub const METRICS_BUCKET_ID: &str = "bucket-metrics";
pub const DIMENSIONS_BUCKET_ID: &str = "bucket-dimensions";
pub const FILTERS_BUCKET_ID: &str = "bucket-filters";

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    labels: TreeLabels,
    targets: AnnotationTargets,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(mut self, labels: TreeLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_annotation_targets(mut self, targets: AnnotationTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn build(&self, record: &BiProcessTree) -> Result<TransformResponse> {
        let decomposition = &record.query_decomposition;
        ensure_unique_concepts("metric", decomposition.metrics.iter().map(|m| &m.technical_name))?;
        ensure_unique_concepts("dimension", decomposition.dimensions.iter().map(|d| &d.technical_name))?;
        ensure_unique_concepts("filter", decomposition.filters.iter().map(|f| &f.technical_name))?;

        let mut metrics = self.bucket(METRICS_BUCKET_ID, &self.labels.metrics_title, NodeType::Projection);
        metrics.children.extend(decomposition.metrics.iter().map(metric_node));

        let mut dimensions = self.bucket(DIMENSIONS_BUCKET_ID, &self.labels.dimensions_title, NodeType::Projection);
        dimensions.children.extend(decomposition.dimensions.iter().map(dimension_node));

        let mut filters = self.bucket(FILTERS_BUCKET_ID, &self.labels.filters_title, NodeType::Filter);
        filters.children.extend(decomposition.filters.iter().map(filter_node));

        debug!(
            "Concept layer: {} metrics, {} dimensions, {} filters",
            metrics.children.len(),
            dimensions.children.len(),
            filters.children.len()
        );

        let mut buckets = [metrics, dimensions, filters];
        let attached = self.attach_notes(&mut buckets, &record.concept_annotations);
        debug!("Annotation layer: {}/{} notes attached", attached, record.concept_annotations.len());

        let [metrics, dimensions, mut filters] = buckets;
        if let Some(head) = pipeline_chain(&record.pipeline) {
            filters.children.push(head);
        }
        debug!("Pipeline layer: {} steps", record.pipeline.len());

        let mut root = TreeNode::new(
            self.labels.root_id.clone(),
            format!("{}{}", self.labels.root_prefix, record.user_query.raw_text),
            NodeType::Root,
            None,
        );
        root.children = vec![metrics, dimensions, filters];

        ensure_unique_ids(&root)?;

        let text = derive_text(&record.pipeline, &self.labels);
        info!("Built tree with {} nodes, depth {}", root.node_count(), root.depth());

        Ok(TransformResponse {
            root,
            nl_steps: text.nl_steps,
            sql_description: text.sql_description,
            sql: text.sql,
        })
    }

    fn bucket(&self, id: &str, title: &str, node_type: NodeType) -> TreeNode {
        TreeNode::new(id, title, node_type, Some(NodeData::Bucket { title: title.to_string() }))
    }

    /// Hangs each note under its concept node. Notes whose target is not a
    /// concept in this tree are dropped. Returns the number attached.
    fn attach_notes(&self, buckets: &mut [TreeNode; 3], annotations: &[ConceptAnnotation]) -> usize {
        let mut per_concept: HashMap<String, usize> = HashMap::new();
        let mut attached = 0;

        for annotation in annotations {
            let target = self.targets.resolve(&annotation.concept);
            let concept = buckets
                .iter_mut()
                .flat_map(|bucket| bucket.children.iter_mut())
                .find(|concept| concept.id == target);

            let Some(concept) = concept else {
                warn!("Dropping note for '{}': no concept '{}' in tree", annotation.concept, target);
                continue;
            };

            let seen = per_concept.entry(concept.id.clone()).or_insert(0);
            *seen += 1;
            let id = if *seen == 1 {
                format!("{}-note", concept.id)
            } else {
                format!("{}-note-{}", concept.id, seen)
            };

            concept.children.push(TreeNode::new(
                id,
                "",
                NodeType::Nl,
                Some(NodeData::Note { description: annotation.description.clone() }),
            ));
            attached += 1;
        }

        attached
    }
}

/// Builds with the default labels and no annotation mapping.
pub fn build(record: &BiProcessTree) -> Result<TransformResponse> {
    TreeBuilder::new().build(record)
}

pub fn metric_id(technical_name: &str) -> String {
    format!("metric-{}", technical_name)
}

pub fn dimension_id(technical_name: &str) -> String {
    format!("dimension-{}", technical_name)
}

pub fn filter_id(technical_name: &str) -> String {
    format!("filter-{}", technical_name)
}

/// 1-based, in pipeline order.
pub fn step_id(index: usize) -> String {
    format!("step-{}", index)
}

fn metric_node(metric: &MetricConcept) -> TreeNode {
    TreeNode::new(
        metric_id(&metric.technical_name),
        metric.name.clone(),
        NodeType::Metric,
        Some(NodeData::Metric {
            technical_name: metric.technical_name.clone(),
            aggregation: metric.aggregation.clone(),
        }),
    )
}

fn dimension_node(dimension: &DimensionConcept) -> TreeNode {
    TreeNode::new(
        dimension_id(&dimension.technical_name),
        dimension.name.clone(),
        NodeType::Dimension,
        Some(NodeData::Dimension { technical_name: dimension.technical_name.clone() }),
    )
}

fn filter_node(filter: &FilterConcept) -> TreeNode {
    TreeNode::new(
        filter_id(&filter.technical_name),
        filter.field_name.clone(),
        NodeType::Filter,
        Some(NodeData::FilterConcept {
            technical_name: filter.technical_name.clone(),
            operator: filter.operator.clone(),
            value: filter.value.clone(),
        }),
    )
}

fn step_data(step: &PipelineStep) -> NodeData {
    match step.clone() {
        PipelineStep::DataRetrieval { table_name, columns } => NodeData::DataRetrieval { table_name, columns },
        PipelineStep::Filter { input, condition, output } => NodeData::FilterStep { input, condition, output },
        PipelineStep::Join { left, right, on, output, table_name, columns } => NodeData::Join {
            left,
            right,
            on,
            output,
            table_name,
            columns,
        },
        PipelineStep::Aggregate { input, group_by, metrics, table_name, columns } => NodeData::Aggregate {
            input,
            group_by,
            metrics,
            table_name,
            columns,
        },
    }
}

/// Step i+1 becomes the only child of step i. Returns the head.
fn pipeline_chain(steps: &[PipelineStep]) -> Option<TreeNode> {
    steps.iter().enumerate().rev().fold(None, |next, (i, step)| {
        let mut node = TreeNode::new(step_id(i + 1), "", step.node_type(), Some(step_data(step)));
        node.children.extend(next);
        Some(node)
    })
}

fn ensure_unique_concepts<'a>(kind: &'static str, names: impl Iterator<Item = &'a String>) -> Result<()> {
    match names.duplicates().next() {
        Some(name) => Err(BiTreeError::DuplicateConcept {
            kind,
            technical_name: name.clone(),
        }),
        None => Ok(()),
    }
}

fn ensure_unique_ids(root: &TreeNode) -> Result<()> {
    let mut seen = HashSet::new();
    for node in root.iter() {
        if !seen.insert(node.id.as_str()) {
            return Err(BiTreeError::DuplicateNodeId(node.id.clone()));
        }
    }
    Ok(())
}
