//! Ordered-collection reindexing.
//!
//! Every admin list screen (courses, modules, materials, homepage sections
//! and elements) keeps a dense, zero-based `order_index` per parent scope.
//! This module computes full index reassignments after a reorder gesture and
//! persists them as independent per-row writes.
//!
//! Known race: two overlapping reorders each recompute from a full snapshot,
//! so the later batch silently supersedes the earlier one (last-write-wins at
//! batch granularity). Acceptable for a single-admin back-office.

mod persist;
mod reindex;

pub use persist::{apply_assignments, OrderedKind, PartialFailure};
pub use reindex::{move_and_reindex, reindex_explicit, OrderAssignment, Ordered, ReorderError};

use serde::Deserialize;
use uuid::Uuid;

/// Wire shape for reorder endpoints. Either a single-element move gesture or
/// an explicit full ordering of sibling ids.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ReorderRequest {
    Move { from_index: usize, to_index: usize },
    Explicit { ordered_ids: Vec<Uuid> },
}

impl ReorderRequest {
    /// Compute the full assignment set for this request against the current
    /// sibling snapshot.
    pub fn assignments<T: Ordered>(&self, items: &[T]) -> Result<Vec<OrderAssignment>, ReorderError> {
        match self {
            Self::Move {
                from_index,
                to_index,
            } => move_and_reindex(items, *from_index, *to_index),
            Self::Explicit { ordered_ids } => reindex_explicit(items, ordered_ids),
        }
    }
}
