//! Property tests for the deletion history.
//!
//! 1. Undoing every edit in reverse restores each earlier track exactly
//! 2. The highlight and the checked set always point inside the track

use gpx_track_editor::{TrackPoint, TrackStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    DeleteOne(usize),
    DeleteBefore(usize),
    DeleteAfter(usize),
    Toggle(usize),
    Select(usize),
    DeleteSelected,
    Undo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<usize>().prop_map(Op::DeleteOne),
        any::<usize>().prop_map(Op::DeleteBefore),
        any::<usize>().prop_map(Op::DeleteAfter),
        any::<usize>().prop_map(Op::Toggle),
        any::<usize>().prop_map(Op::Select),
        Just(Op::DeleteSelected),
        Just(Op::Undo),
    ]
}

fn track(n: usize) -> Vec<TrackPoint> {
    (0..n)
        .map(|i| TrackPoint::new(35.0 + i as f64 * 1e-4, 139.0).with_elevation(i as f64))
        .collect()
}

/// Applies `op` with its index folded into the track. Returns true when
/// the op was a structural edit that succeeded.
fn apply(store: &mut TrackStore, op: &Op) -> bool {
    let len = store.len();
    let pick = |i: usize| if len == 0 { 0 } else { i % len };
    match op {
        Op::DeleteOne(i) => store.delete_one(pick(*i)).is_ok(),
        Op::DeleteBefore(i) => store.delete_before(pick(*i)).is_ok(),
        Op::DeleteAfter(i) => store.delete_after(pick(*i)).is_ok(),
        Op::Toggle(i) => {
            let _ = store.toggle_checked(pick(*i));
            false
        }
        Op::Select(i) => {
            let _ = store.select(Some(pick(*i)));
            false
        }
        Op::DeleteSelected => store.delete_selected().is_ok(),
        Op::Undo => false,
    }
}

fn assert_selection_in_range(store: &TrackStore) {
    let len = store.len();
    if let Some(c) = store.cursor() {
        assert!(c < len, "cursor {} outside track of {}", c, len);
    }
    for &i in store.selection().checked() {
        assert!(i < len, "checked {} outside track of {}", i, len);
    }
}

proptest! {
    #[test]
    fn undo_restores_every_earlier_track(
        n in 1usize..40,
        ops in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let mut store = TrackStore::new();
        store.load(track(n));
        let mut history = vec![store.points().to_vec()];

        for op in &ops {
            if apply(&mut store, op) {
                history.push(store.points().to_vec());
            }
        }
        prop_assert_eq!(store.undo_depth(), history.len() - 1);

        history.pop();
        while let Some(expected) = history.pop() {
            prop_assert!(store.undo().is_ok());
            prop_assert_eq!(store.points(), &expected[..]);
        }
        prop_assert!(!store.can_undo());
    }

    #[test]
    fn selection_stays_inside_track(
        n in 0usize..30,
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut store = TrackStore::new();
        store.load(track(n));

        for op in &ops {
            if matches!(op, Op::Undo) {
                let _ = store.undo();
            } else {
                apply(&mut store, op);
            }
            assert_selection_in_range(&store);
        }
    }

    #[test]
    fn undo_highlights_first_restored_point(
        n in 2usize..30,
        index in any::<usize>(),
    ) {
        let mut store = TrackStore::new();
        store.load(track(n));
        let index = index % n;

        store.delete_one(index).unwrap();
        prop_assert_eq!(store.undo(), Ok(index));
        prop_assert_eq!(store.cursor(), Some(index));
    }
}
