//! Result Store
//!
//! Single-slot holder for the most recently built response. The slot is
//! replaced wholesale on every `set`; readers get an `Arc` to a complete
//! snapshot and keep it valid across later replacements.

use crate::tree::TransformResponse;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Starts at 1, increments on every replacement.
    pub version: u64,
    pub stored_at: DateTime<Utc>,
    pub response: TransformResponse,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Arc<Snapshot>>,
    version: u64,
}

/// Cloning shares the slot.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    slot: Arc<RwLock<Slot>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<Snapshot>> {
        // A poisoned slot still holds a whole snapshot: writers only swap the Arc.
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.current.clone()
    }

    /// Last write wins. Returns the snapshot just stored.
    pub fn set(&self, response: TransformResponse) -> Arc<Snapshot> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.version += 1;
        let snapshot = Arc::new(Snapshot {
            version: slot.version,
            stored_at: Utc::now(),
            response,
        });
        slot.current = Some(Arc::clone(&snapshot));
        info!("Stored tree version {}", snapshot.version);
        snapshot
    }

    pub fn version(&self) -> u64 {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).version
    }

    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.current = None;
    }
}
