//! Tests for ordered-collection reindexing through the public API.
//!
//! Run with: `cargo test --test reorder_test`

use uuid::Uuid;

use lokakelas_server::ordering::{move_and_reindex, reindex_explicit, Ordered, ReorderError};

struct Sibling {
    id: Uuid,
}

impl Ordered for Sibling {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

fn siblings(n: usize) -> Vec<Sibling> {
    (0..n).map(|_| Sibling { id: Uuid::new_v4() }).collect()
}

/// Every (from, to) pair over a small set yields a dense 0..len-1 assignment
/// covering every sibling exactly once.
#[test]
fn test_every_move_yields_a_dense_permutation() {
    let set = siblings(5);

    for from in 0..set.len() {
        for to in 0..set.len() {
            let assignments = move_and_reindex(&set, from, to).unwrap();
            assert_eq!(assignments.len(), set.len());

            let mut indices: Vec<i32> = assignments.iter().map(|a| a.order_index).collect();
            indices.sort_unstable();
            assert_eq!(indices, vec![0, 1, 2, 3, 4]);

            let mut ids: Vec<Uuid> = assignments.iter().map(|a| a.id).collect();
            ids.sort_unstable();
            let mut expected: Vec<Uuid> = set.iter().map(|s| s.id).collect();
            expected.sort_unstable();
            assert_eq!(ids, expected);
        }
    }
}

/// Unmoved siblings keep their relative order around the moved one.
#[test]
fn test_relative_order_is_preserved() {
    let set = siblings(4);
    let assignments = move_and_reindex(&set, 3, 0).unwrap();

    let position = |id: Uuid| {
        assignments
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.order_index)
            .unwrap()
    };

    assert_eq!(position(set[3].id), 0);
    assert!(position(set[0].id) < position(set[1].id));
    assert!(position(set[1].id) < position(set[2].id));
}

#[test]
fn test_out_of_range_is_rejected() {
    let set = siblings(3);
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
fn test_explicit_ordering_must_be_a_permutation() {
    let set = siblings(3);
    let reversed: Vec<Uuid> = set.iter().rev().map(|s| s.id).collect();

    let assignments = reindex_explicit(&set, &reversed).unwrap();
    assert_eq!(assignments[0].id, set[2].id);
    assert_eq!(assignments[0].order_index, 0);
    assert_eq!(assignments[2].id, set[0].id);
    assert_eq!(assignments[2].order_index, 2);

    // Duplicated id in place of a sibling
    let duped = vec![set[0].id, set[0].id, set[2].id];
    assert_eq!(
        reindex_explicit(&set, &duped),
        Err(ReorderError::NotAPermutation)
    );
}
