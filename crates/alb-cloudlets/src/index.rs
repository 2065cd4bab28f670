//! Name-to-slot lookup over a data-center sequence.

use std::collections::HashMap;

use crate::model::DataCenterEntry;

/// Maps each `originId` to its position in one data-center sequence.
///
/// The index is only meaningful for the sequence it was built from and must
/// be rebuilt whenever that sequence is replaced. When an identifier occurs
/// more than once, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginIndex {
    slots: HashMap<String, usize>,
}

impl OriginIndex {
    /// Indexes `entries` in order.
    #[must_use]
    pub fn build(entries: &[DataCenterEntry]) -> Self {
        let slots = entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (entry.origin_id.clone(), slot))
            .collect();
        Self { slots }
    }

    /// Position of `origin_id`, if indexed.
    #[must_use]
    pub fn slot(&self, origin_id: &str) -> Option<usize> {
        self.slots.get(origin_id).copied()
    }

    /// Returns true when `origin_id` is indexed.
    #[must_use]
    pub fn contains(&self, origin_id: &str) -> bool {
        self.slots.contains_key(origin_id)
    }

    /// Number of distinct identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
