pub mod annotations;
pub mod builder;
pub mod config;
pub mod error;
pub mod labels;
pub mod narrative;
pub mod record;
pub mod render;
pub mod service;
pub mod source;
pub mod store;
pub mod tree;

pub use annotations::AnnotationTargets;
pub use builder::{build, TreeBuilder};
pub use config::ClientConfig;
pub use error::{BiTreeError, Result};
pub use labels::{Language, TreeLabels};
pub use record::{BiProcessTree, PipelineStep};
pub use service::TransformService;
pub use source::{FixtureRecordSource, HttpRecordSource, RecordSource, TransformRequest};
pub use store::{ResultStore, Snapshot};
pub use tree::{NodeData, NodeType, TransformResponse, TreeNode};
