use kanban_core::order::move_item;
use kanban_core::persist::{self, MemorySlot};
use kanban_core::{DndId, Snapshot, Store};
use proptest::prelude::*;

/// One user action, with ids picked by position among existing entities
#[derive(Debug, Clone)]
enum Op {
    AddList,
    RemoveList(usize),
    AddCard(usize),
    RemoveCard(usize),
    /// Toggle done, or add a comment when the flag is set
    Touch(usize, bool),
    MoveCard(usize, usize, usize),
    ReorderList(usize, usize),
    ReorderCard(usize, usize, usize),
    /// Card drag: (card, target, target is a list, drop rather than hover)
    DragCard(usize, usize, bool, bool),
    DragList(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let n = 0usize..8;
    prop_oneof![
        Just(Op::AddList),
        n.clone().prop_map(Op::RemoveList),
        n.clone().prop_map(Op::AddCard),
        n.clone().prop_map(Op::RemoveCard),
        (n.clone(), any::<bool>()).prop_map(|(a, b)| Op::Touch(a, b)),
        (n.clone(), n.clone(), n.clone()).prop_map(|(a, b, c)| Op::MoveCard(a, b, c)),
        (n.clone(), n.clone()).prop_map(|(a, b)| Op::ReorderList(a, b)),
        (n.clone(), n.clone(), n.clone()).prop_map(|(a, b, c)| Op::ReorderCard(a, b, c)),
        (n.clone(), n.clone(), any::<bool>(), any::<bool>())
            .prop_map(|(a, b, c, d)| Op::DragCard(a, b, c, d)),
        (n.clone(), n).prop_map(|(a, b)| Op::DragList(a, b)),
    ]
}

fn nth_list(snap: &Snapshot, i: usize) -> String {
    snap.board
        .list_ids
        .get(i)
        .cloned()
        .unwrap_or_else(|| "list-missing".to_string())
}

fn nth_card(snap: &Snapshot, i: usize) -> String {
    snap.cards
        .keys()
        .nth(i)
        .cloned()
        .unwrap_or_else(|| "card-missing".to_string())
}

fn card_target(snap: &Snapshot, i: usize, over_list: bool) -> DndId {
    if over_list {
        DndId::List(nth_list(snap, i))
    } else {
        DndId::Card(nth_card(snap, i))
    }
}

fn run(store: &mut Store<MemorySlot>, op: &Op) {
    let snap = store.snapshot();
    match *op {
        Op::AddList => {
            store.add_list("list");
        }
        Op::RemoveList(i) => {
            store.remove_list(&nth_list(&snap, i));
        }
        Op::AddCard(i) => {
            store.add_card(&nth_list(&snap, i), "card");
        }
        Op::RemoveCard(i) => {
            store.remove_card(&nth_card(&snap, i));
        }
        Op::Touch(i, comment) => {
            let card_id = nth_card(&snap, i);
            if comment {
                store.add_comment(&card_id, "note");
            } else {
                store.toggle_card_done(&card_id);
            }
        }
        Op::MoveCard(c, l, idx) => {
            store.move_card(&nth_card(&snap, c), &nth_list(&snap, l), idx);
        }
        Op::ReorderList(a, b) => {
            store.reorder_list(a, b);
        }
        Op::ReorderCard(l, a, b) => {
            store.reorder_card(&nth_list(&snap, l), a, b);
        }
        Op::DragCard(c, t, over_list, drop) => {
            let source = DndId::Card(nth_card(&snap, c));
            let target = card_target(&snap, t, over_list);
            if drop {
                store.drag_end(&source, Some(&target));
            } else {
                store.drag_over(&source, Some(&target));
            }
        }
        Op::DragList(a, b) => {
            store.drag_end(
                &DndId::List(nth_list(&snap, a)),
                Some(&DndId::List(nth_list(&snap, b))),
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn every_reachable_snapshot_is_consistent(ops in proptest::collection::vec(op_strategy(), 0..60)) {
        let slot = MemorySlot::new();
        let mut store = Store::open(slot.clone(), "Task Board");
        for op in &ops {
            run(&mut store, op);
            let snap = store.snapshot();
            if let Err(e) = snap.check_integrity() {
                panic!("after {:?}: {}", op, e);
            }
        }

        // whatever was last published is what the slot holds
        if let Some(raw) = slot.contents() {
            let stored = persist::decode(&raw)
                .unwrap_or_else(|e| panic!("stored snapshot unreadable: {e}"));
            let current = store.snapshot();
            prop_assert_eq!(&stored, current.as_ref());
        }
    }

    #[test]
    fn move_item_keeps_other_elements_in_order(len in 1usize..12, from in 0usize..12, to in 0usize..12) {
        let original: Vec<usize> = (0..len).collect();
        let mut items = original.clone();
        let moved = move_item(&mut items, from, to);

        prop_assert_eq!(items.len(), len);
        if from >= len {
            prop_assert!(!moved);
            prop_assert_eq!(&items, &original);
        } else {
            let target = to.min(len - 1);
            prop_assert_eq!(items[target], from);
            let rest: Vec<usize> = items.iter().copied().filter(|&x| x != from).collect();
            let expected: Vec<usize> = original.iter().copied().filter(|&x| x != from).collect();
            prop_assert_eq!(rest, expected);
        }
    }
}
