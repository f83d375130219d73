//! Pure reindexing computation.

use thiserror::Error;
use uuid::Uuid;

/// Anything with a stable id that participates in an ordered sibling set.
pub trait Ordered {
    fn entity_id(&self) -> Uuid;
}

/// One persistence write: entity id and its new dense position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAssignment {
    pub id: Uuid,
    pub order_index: i32,
}

/// Reindex computation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    /// A move index fell outside the sibling set.
    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// An explicit ordering was not a permutation of the sibling set.
    #[error("Ordering must contain each sibling id exactly once")]
    NotAPermutation,
}

/// Move the element at `from` to position `to` and emit the full dense
/// assignment set for the resulting sequence.
///
/// Every sibling appears in the output, not just the moved one, since any
/// index between the two positions shifts. `from == to` is a legal no-op
/// that still returns the complete unchanged mapping.
pub fn move_and_reindex<T: Ordered>(
    items: &[T],
    from: usize,
    to: usize,
) -> Result<Vec<OrderAssignment>, ReorderError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::IndexOutOfRange { index, len });
        }
    }

    let mut ids: Vec<Uuid> = items.iter().map(Ordered::entity_id).collect();
    let moved = ids.remove(from);
    ids.insert(to, moved);

    Ok(dense_assignments(&ids))
}

/// Validate that `ordered_ids` is a permutation of the sibling set and emit
/// the dense assignment set for that ordering.
pub fn reindex_explicit<T: Ordered>(
    items: &[T],
    ordered_ids: &[Uuid],
) -> Result<Vec<OrderAssignment>, ReorderError> {
    if ordered_ids.len() != items.len() {
        return Err(ReorderError::NotAPermutation);
    }

    let mut current: Vec<Uuid> = items.iter().map(Ordered::entity_id).collect();
    current.sort_unstable();
    let mut requested: Vec<Uuid> = ordered_ids.to_vec();
    requested.sort_unstable();
    if current != requested {
        return Err(ReorderError::NotAPermutation);
    }

    Ok(dense_assignments(ordered_ids))
}

fn dense_assignments(ids: &[Uuid]) -> Vec<OrderAssignment> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| OrderAssignment {
            id: *id,
            order_index: position as i32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        id: Uuid,
    }

    impl Ordered for Item {
        fn entity_id(&self) -> Uuid {
            self.id
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|_| Item { id: Uuid::new_v4() }).collect()
    }

    #[test]
    fn test_move_forward_shifts_intermediates() {
        // [A,B,C,D], move A (0) to position 2 -> [B,C,A,D]
        let set = items(4);
        let (a, b, c, d) = (set[0].id, set[1].id, set[2].id, set[3].id);

        let result = move_and_reindex(&set, 0, 2).unwrap();

        let expected = [(b, 0), (c, 1), (a, 2), (d, 3)];
        for (assignment, (id, index)) in result.iter().zip(expected) {
            assert_eq!(assignment.id, id);
            assert_eq!(assignment.order_index, index);
        }
    }

    #[test]
    fn test_move_backward() {
        // [A,B,C,D], move D (3) to position 0 -> [D,A,B,C]
        let set = items(4);
        let result = move_and_reindex(&set, 3, 0).unwrap();

        assert_eq!(result[0].id, set[3].id);
        assert_eq!(result[1].id, set[0].id);
        assert_eq!(result[3].id, set[2].id);
    }

    #[test]
    fn test_noop_move_is_idempotent_and_complete() {
        let set = items(3);
        let result = move_and_reindex(&set, 1, 1).unwrap();

        assert_eq!(result.len(), 3);
        for (position, assignment) in result.iter().enumerate() {
            assert_eq!(assignment.id, set[position].id);
            assert_eq!(assignment.order_index, position as i32);
        }
    }

    #[test]
    fn test_out_of_range_indices_rejected() {
        let set = items(3);
        assert_eq!(
            move_and_reindex(&set, 3, 0),
            Err(ReorderError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            move_and_reindex(&set, 0, 7),
            Err(ReorderError::IndexOutOfRange { index: 7, len: 3 })
        );
    }

    #[test]
    fn test_every_move_yields_a_bijection() {
        let set = items(5);
        for from in 0..5 {
            for to in 0..5 {
                let result = move_and_reindex(&set, from, to).unwrap();
                let mut indices: Vec<i32> =
                    result.iter().map(|a| a.order_index).collect();
                indices.sort_unstable();
                assert_eq!(indices, vec![0, 1, 2, 3, 4]);

                let mut ids: Vec<Uuid> = result.iter().map(|a| a.id).collect();
                ids.sort_unstable();
                let mut expected: Vec<Uuid> = set.iter().map(|i| i.id).collect();
                expected.sort_unstable();
                assert_eq!(ids, expected);
            }
        }
    }

    #[test]
    fn test_explicit_reorder_accepts_permutation() {
        let set = items(3);
        let ordering = vec![set[2].id, set[0].id, set[1].id];

        let result = reindex_explicit(&set, &ordering).unwrap();

        assert_eq!(result[0], OrderAssignment { id: set[2].id, order_index: 0 });
        assert_eq!(result[1], OrderAssignment { id: set[0].id, order_index: 1 });
        assert_eq!(result[2], OrderAssignment { id: set[1].id, order_index: 2 });
    }

    #[test]
    fn test_explicit_reorder_rejects_non_permutations() {
        let set = items(3);

        // Wrong length
        assert_eq!(
            reindex_explicit(&set, &[set[0].id, set[1].id]),
            Err(ReorderError::NotAPermutation)
        );

        // Right length, foreign id
        assert_eq!(
            reindex_explicit(&set, &[set[0].id, set[1].id, Uuid::new_v4()]),
            Err(ReorderError::NotAPermutation)
        );

        // Duplicated id
        assert_eq!(
            reindex_explicit(&set, &[set[0].id, set[0].id, set[1].id]),
            Err(ReorderError::NotAPermutation)
        );
    }
}
