use std::collections::BTreeSet;

use crate::common::{ClassCatalog, Detection};

/// Classes kept when no other set is given.
pub const DEFAULT_TARGET_CLASSES: [&str; 3] = ["laptop", "mouse", "person"];

/// Class names a pipeline keeps. Fixed once the pipeline is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetClassSet {
    names: BTreeSet<String>,
}

impl Default for TargetClassSet {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_CLASSES)
    }
}

impl TargetClassSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Name for a detection: the catalog entry for its class id, else the label
/// attached at inference time.
pub fn class_name<'a>(detection: &'a Detection, catalog: &'a ClassCatalog) -> Option<&'a str> {
    catalog
        .name(detection.class_id)
        .or(detection.label.as_deref())
}

/// Keeps the detections whose class name is in `targets`, in their original order.
pub fn filter_results(
    detections: &[Detection],
    catalog: &ClassCatalog,
    targets: &TargetClassSet,
) -> Vec<Detection> {
    detections
        .iter()
        .filter(|d| class_name(d, catalog).is_some_and(|name| targets.contains(name)))
        .cloned()
        .collect()
}
