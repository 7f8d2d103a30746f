//! Transform Service
//!
//! Fetch a record, build its tree, publish the result. The service is the
//! only writer of its [`ResultStore`]; a failed fetch or build leaves the
//! previous snapshot in place.

use crate::builder::TreeBuilder;
use crate::error::Result;
use crate::source::{RecordSource, TransformRequest};
use crate::store::{ResultStore, Snapshot};
use std::sync::Arc;
use tracing::{error, info};

pub struct TransformService {
    source: Box<dyn RecordSource>,
    builder: TreeBuilder,
    store: ResultStore,
}

impl TransformService {
    pub fn new(source: Box<dyn RecordSource>, builder: TreeBuilder, store: ResultStore) -> Self {
        Self { source, builder, store }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub async fn refresh(&self, request: &TransformRequest) -> Result<Arc<Snapshot>> {
        let record = self.source.fetch(request).await.map_err(|e| {
            error!("Fetch from {} source failed: {}", self.source.name(), e);
            e
        })?;
        info!("Building tree for query: {}", record.user_query.raw_text);

        let response = self.builder.build(&record)?;
        Ok(self.store.set(response))
    }
}
