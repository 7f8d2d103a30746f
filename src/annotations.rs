//! Annotation Targets
//!
//! Maps the key a knowledge note is filed under to the id of the concept
//! node it belongs to. The mapping is supplied alongside the record, it is
//! never inferred from it.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTargets {
    targets: BTreeMap<String, String>,
}

impl AnnotationTargets {
    /// Empty mapping: every annotation key is taken as a concept id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes bundled with the sample decomposition.
    pub fn sample() -> Self {
        Self::new()
            .with_target("sales", "metric-sales")
            .with_target("store_name", "dimension-store_name")
            .with_target("date", "filter-date")
            .with_target("province", "filter-province")
    }

    pub fn with_target(mut self, key: impl Into<String>, concept_id: impl Into<String>) -> Self {
        self.targets.insert(key.into(), concept_id.into());
        self
    }

    /// Concept id for `key`; unmapped keys resolve to themselves.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.targets.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FromIterator<(String, String)> for AnnotationTargets {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}
