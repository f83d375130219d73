//! Persistence side of reindexing.

use futures::future::join_all;
use sqlx::PgPool;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use super::reindex::OrderAssignment;

/// The five entity kinds that carry an `order_index` column.
///
/// Closed set; the table name never comes from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedKind {
    Course,
    Module,
    Material,
    HomepageSection,
    HomepageElement,
}

impl OrderedKind {
    const fn table(self) -> &'static str {
        match self {
            Self::Course => "courses",
            Self::Module => "modules",
            Self::Material => "materials",
            Self::HomepageSection => "homepage_sections",
            Self::HomepageElement => "homepage_elements",
        }
    }
}

/// Some sibling writes landed, some did not.
///
/// There is no rollback: callers must treat local order state as stale and
/// refetch the authoritative order for the affected parent scope.
#[derive(Debug, Error)]
#[error("Reorder partially applied: {} of {total} writes failed", failed.len())]
pub struct PartialFailure {
    /// Ids whose `order_index` write failed.
    pub failed: Vec<Uuid>,
    /// Total number of writes attempted.
    pub total: usize,
}

/// Persist a full assignment set as independent per-row writes.
///
/// Writes are issued concurrently and are not transactional, matching the
/// one-update-per-sibling persistence model. A failed write does not roll
/// back the others.
pub async fn apply_assignments(
    pool: &PgPool,
    kind: OrderedKind,
    assignments: &[OrderAssignment],
) -> Result<(), PartialFailure> {
    let statement = format!(
        "UPDATE {} SET order_index = $2 WHERE id = $1",
        kind.table()
    );

    let writes = assignments.iter().map(|assignment| {
        let statement = statement.clone();
        async move {
            let result = sqlx::query(&statement)
                .bind(assignment.id)
                .bind(assignment.order_index)
                .execute(pool)
                .await;
            (assignment.id, result)
        }
    });

    let failed: Vec<Uuid> = join_all(writes)
        .await
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(_) => None,
            Err(e) => {
                error!(entity_id = %id, table = kind.table(), "Order index write failed: {}", e);
                Some(id)
            }
        })
        .collect();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(PartialFailure {
            failed,
            total: assignments.len(),
        })
    }
}
