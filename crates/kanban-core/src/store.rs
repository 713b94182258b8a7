//! Snapshot store for the kanban board
//!
//! Owns the current snapshot and is the only place it changes. Every
//! mutation builds a new snapshot from a copy of the current one, saves it,
//! and only then publishes it. A mutation that references an unknown id
//! changes nothing and saves nothing.

use crate::drag::{self, DndId, DragIntent};
use crate::id::{self, CARD_PREFIX, COMMENT_PREFIX, LIST_PREFIX};
use crate::model::{Card, Comment, List, SNAPSHOT_VERSION};
use crate::order;
use crate::persist::{Persistence, Slot};
use crate::{Error, Result, Snapshot};
use std::sync::Arc;
use tracing::{debug, info};

/// Holds the board and applies mutations to it
pub struct Store<S: Slot> {
    current: Arc<Snapshot>,
    persistence: Persistence<S>,
}

impl<S: Slot> Store<S> {
    /// Open the store over `slot`, falling back to an empty board titled
    /// `default_title` when the slot has no usable snapshot
    pub fn open(slot: S, default_title: &str) -> Self {
        let persistence = Persistence::new(slot);
        let snapshot = persistence.load_or_default(default_title);
        Self {
            current: Arc::new(snapshot),
            persistence,
        }
    }

    /// The current snapshot
    ///
    /// Published snapshots never change, so a caller may hold on to this
    /// while the store moves on.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Run `mutate` on a copy of the current snapshot; if it reports a
    /// change, save the copy and make it current
    fn commit(&mut self, op: &'static str, mutate: impl FnOnce(&mut Snapshot) -> bool) -> bool {
        let mut next = Snapshot::clone(&self.current);
        if !mutate(&mut next) {
            debug!(op, "mutation had no effect");
            return false;
        }
        self.persistence.save(&next);
        self.current = Arc::new(next);
        info!(op, "snapshot published");
        true
    }

    /// Replace the board title
    pub fn set_board_title(&mut self, title: &str) -> bool {
        self.commit("set_board_title", |snap| {
            snap.board.title = title.to_string();
            true
        })
    }

    /// Append a new empty list; returns its id
    pub fn add_list(&mut self, title: &str) -> String {
        let mut created = String::new();
        self.commit("add_list", |snap| {
            let list_id = id::generate_unique_id(LIST_PREFIX, |candidate| {
                snap.id_in_use(candidate)
            });
            snap.lists
                .insert(list_id.clone(), List::new(list_id.clone(), title.to_string()));
            snap.board.list_ids.push(list_id.clone());
            created = list_id;
            true
        });
        created
    }

    /// Remove a list together with every card it holds
    pub fn remove_list(&mut self, list_id: &str) -> bool {
        self.commit("remove_list", |snap| {
            if snap.lists.remove(list_id).is_none() {
                return false;
            }
            snap.board.list_ids.retain(|id| id != list_id);
            snap.cards.retain(|_, card| card.list_id != list_id);
            true
        })
    }

    /// Set a list's title (trimmed)
    pub fn rename_list(&mut self, list_id: &str, title: &str) -> bool {
        self.commit("rename_list", |snap| {
            let Some(list) = snap.lists.get_mut(list_id) else {
                return false;
            };
            list.title = title.trim().to_string();
            true
        })
    }

    /// Reposition a list on the board
    pub fn reorder_list(&mut self, from: usize, to: usize) -> bool {
        self.commit("reorder_list", |snap| {
            order::move_item(&mut snap.board.list_ids, from, to)
        })
    }

    /// Append a new card to a list; returns its id, or `None` if the list
    /// does not exist
    pub fn add_card(&mut self, list_id: &str, title: &str) -> Option<String> {
        let mut created = None;
        self.commit("add_card", |snap| {
            if !snap.lists.contains_key(list_id) {
                return false;
            }
            let card_id = id::generate_unique_id(CARD_PREFIX, |candidate| {
                snap.id_in_use(candidate)
            });
            snap.cards.insert(
                card_id.clone(),
                Card::new(card_id.clone(), title.to_string(), list_id.to_string()),
            );
            if let Some(list) = snap.lists.get_mut(list_id) {
                list.card_ids.push(card_id.clone());
            }
            created = Some(card_id);
            true
        });
        created
    }

    /// Remove a card from its list and from the board
    pub fn remove_card(&mut self, card_id: &str) -> bool {
        self.commit("remove_card", |snap| {
            let Some(card) = snap.cards.remove(card_id) else {
                return false;
            };
            if let Some(list) = snap.lists.get_mut(&card.list_id) {
                list.card_ids.retain(|id| id != card_id);
            }
            true
        })
    }

    /// Replace a card's title
    pub fn rename_card(&mut self, card_id: &str, title: &str) -> bool {
        self.commit("rename_card", |snap| {
            let Some(card) = snap.cards.get_mut(card_id) else {
                return false;
            };
            card.title = title.to_string();
            true
        })
    }

    /// Flip a card's done flag
    pub fn toggle_card_done(&mut self, card_id: &str) -> bool {
        self.commit("toggle_card_done", |snap| {
            let Some(card) = snap.cards.get_mut(card_id) else {
                return false;
            };
            card.done = !card.done;
            true
        })
    }

    /// Move a card into `to_list_id` at `to_index`
    ///
    /// The index is clamped to the target list's length. Works within a
    /// single list as well as across lists.
    pub fn move_card(&mut self, card_id: &str, to_list_id: &str, to_index: usize) -> bool {
        self.commit("move_card", |snap| {
            let Some(from_list_id) = snap.cards.get(card_id).map(|c| c.list_id.clone()) else {
                return false;
            };
            if !snap.lists.contains_key(&from_list_id) || !snap.lists.contains_key(to_list_id) {
                return false;
            }

            let before = snap.lists.get(&from_list_id).map(|l| l.card_ids.clone());

            if let Some(from_list) = snap.lists.get_mut(&from_list_id) {
                from_list.card_ids.retain(|id| id != card_id);
            }
            if let Some(to_list) = snap.lists.get_mut(to_list_id) {
                order::insert_clamped(&mut to_list.card_ids, to_index, card_id.to_string());
            }
            if let Some(card) = snap.cards.get_mut(card_id) {
                card.list_id = to_list_id.to_string();
            }

            from_list_id != to_list_id
                || before != snap.lists.get(to_list_id).map(|l| l.card_ids.clone())
        })
    }

    /// Reposition a card inside its list
    pub fn reorder_card(&mut self, list_id: &str, from: usize, to: usize) -> bool {
        self.commit("reorder_card", |snap| match snap.lists.get_mut(list_id) {
            Some(list) => order::move_item(&mut list.card_ids, from, to),
            None => false,
        })
    }

    /// Append a comment to a card; returns the comment id
    pub fn add_comment(&mut self, card_id: &str, text: &str) -> Option<String> {
        let mut created = None;
        self.commit("add_comment", |snap| {
            let Some(card) = snap.cards.get(card_id) else {
                return false;
            };
            let comment_id = id::generate_unique_id(COMMENT_PREFIX, |candidate| {
                card.comments.iter().any(|c| c.id == candidate)
            });
            if let Some(card) = snap.cards.get_mut(card_id) {
                card.comments
                    .push(Comment::new(comment_id.clone(), text.to_string()));
            }
            created = Some(comment_id);
            true
        });
        created
    }

    /// Delete one comment from a card
    pub fn remove_comment(&mut self, card_id: &str, comment_id: &str) -> bool {
        self.commit("remove_comment", |snap| {
            let Some(card) = snap.cards.get_mut(card_id) else {
                return false;
            };
            let before = card.comments.len();
            card.comments.retain(|c| c.id != comment_id);
            card.comments.len() != before
        })
    }

    /// Swap in a whole snapshot
    ///
    /// Rejects snapshots from another schema version or whose lists and
    /// cards do not reference each other consistently.
    pub fn replace(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedVersion {
                found: i64::from(snapshot.version),
                expected: SNAPSHOT_VERSION,
            });
        }
        snapshot.check_integrity()?;
        self.commit("replace", |snap| {
            *snap = snapshot;
            true
        });
        Ok(())
    }

    /// Execute a resolved drag intent
    pub fn apply(&mut self, intent: DragIntent) -> bool {
        match intent {
            DragIntent::ReorderList { from, to } => self.reorder_list(from, to),
            DragIntent::MoveCard {
                card_id,
                to_list_id,
                to_index,
            } => self.move_card(&card_id, &to_list_id, to_index),
            DragIntent::ReorderCard { list_id, from, to } => {
                self.reorder_card(&list_id, from, to)
            }
        }
    }

    /// Handle a hover event; cards hovering over another list move there
    pub fn drag_over(&mut self, source: &DndId, target: Option<&DndId>) -> bool {
        match drag::resolve_drag_over(&self.current, source, target) {
            Some(intent) => self.apply(intent),
            None => false,
        }
    }

    /// Handle the drop that ends a drag
    pub fn drag_end(&mut self, source: &DndId, target: Option<&DndId>) -> bool {
        match drag::resolve_drag_end(&self.current, source, target) {
            Some(intent) => self.apply(intent),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{self, MemorySlot};

    fn store() -> (Store<MemorySlot>, MemorySlot) {
        let slot = MemorySlot::new();
        (Store::open(slot.clone(), "Test"), slot)
    }

    fn card_ids(store: &Store<MemorySlot>, list_id: &str) -> Vec<String> {
        store.snapshot().lists[list_id].card_ids.clone()
    }

    #[test]
    fn test_open_empty_slot_uses_default_title() {
        let (store, slot) = store();
        assert_eq!(store.snapshot().board.title, "Test");
        assert!(slot.contents().is_none());
    }

    #[test]
    fn test_mutation_saves_before_publish() {
        let (mut store, slot) = store();
        store.set_board_title("Renamed");
        let stored = persist::decode(&slot.contents().unwrap()).unwrap();
        assert_eq!(&stored, store.snapshot().as_ref());
        assert_eq!(stored.board.title, "Renamed");
    }

    struct FailingSlot;

    impl Slot for FailingSlot {
        fn read(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&self, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::other("quota exceeded")))
        }
    }

    #[test]
    fn test_failed_save_still_publishes() {
        let mut store = Store::open(FailingSlot, "Test");
        let list_id = store.add_list("Todo");
        let card_id = store.add_card(&list_id, "Buy milk").unwrap();

        let snap = store.snapshot();
        assert_eq!(snap.lists[&list_id].title, "Todo");
        assert_eq!(snap.lists[&list_id].card_ids, vec![card_id.clone()]);
        assert!(store.toggle_card_done(&card_id));
        assert!(store.snapshot().cards[&card_id].done);
    }

    #[test]
    fn test_noop_does_not_save_or_publish() {
        let (mut store, slot) = store();
        let before = store.snapshot();
        assert!(!store.remove_list("missing"));
        assert!(!store.remove_card("missing"));
        assert!(!store.toggle_card_done("missing"));
        assert!(store.add_card("missing", "x").is_none());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert!(slot.contents().is_none());
    }

    #[test]
    fn test_old_snapshot_is_untouched_by_mutation() {
        let (mut store, _) = store();
        let before = store.snapshot();
        store.add_list("Todo");
        assert!(before.lists.is_empty());
        assert_eq!(store.snapshot().lists.len(), 1);
    }

    #[test]
    fn test_add_list_and_card() {
        let (mut store, _) = store();
        let list_id = store.add_list("Todo");
        let card_id = store.add_card(&list_id, "Buy milk").unwrap();

        let snap = store.snapshot();
        assert_eq!(snap.board.list_ids, vec![list_id.clone()]);
        assert_eq!(snap.lists[&list_id].card_ids, vec![card_id.clone()]);
        let card = &snap.cards[&card_id];
        assert_eq!(card.list_id, list_id);
        assert!(!card.done);
        assert!(card.comments.is_empty());
        assert!(snap.check_integrity().is_ok());
    }

    #[test]
    fn test_rename_list_trims() {
        let (mut store, _) = store();
        let list_id = store.add_list("Todo");
        assert!(store.rename_list(&list_id, "  Doing  "));
        assert_eq!(store.snapshot().lists[&list_id].title, "Doing");
    }

    #[test]
    fn test_toggle_done_twice() {
        let (mut store, _) = store();
        let list_id = store.add_list("Todo");
        let card_id = store.add_card(&list_id, "Task").unwrap();
        store.toggle_card_done(&card_id);
        assert!(store.snapshot().cards[&card_id].done);
        store.toggle_card_done(&card_id);
        assert!(!store.snapshot().cards[&card_id].done);
    }

    #[test]
    fn test_remove_card() {
        let (mut store, _) = store();
        let list_id = store.add_list("Todo");
        let c1 = store.add_card(&list_id, "one").unwrap();
        let c2 = store.add_card(&list_id, "two").unwrap();
        assert!(store.remove_card(&c1));
        assert_eq!(card_ids(&store, &list_id), vec![c2]);
        assert!(!store.snapshot().cards.contains_key(&c1));
    }

    #[test]
    fn test_move_card_clamps_index() {
        let (mut store, _) = store();
        let l1 = store.add_list("A");
        let l2 = store.add_list("B");
        let c1 = store.add_card(&l1, "one").unwrap();
        let c2 = store.add_card(&l2, "two").unwrap();
        assert!(store.move_card(&c1, &l2, 99));
        assert_eq!(card_ids(&store, &l2), vec![c2, c1.clone()]);
        assert!(card_ids(&store, &l1).is_empty());
        assert_eq!(store.snapshot().cards[&c1].list_id, l2);
    }

    #[test]
    fn test_move_card_within_list() {
        let (mut store, _) = store();
        let l1 = store.add_list("A");
        let c1 = store.add_card(&l1, "one").unwrap();
        let c2 = store.add_card(&l1, "two").unwrap();
        assert!(store.move_card(&c1, &l1, 5));
        assert_eq!(card_ids(&store, &l1), vec![c2.clone(), c1.clone()]);
        // already last
        assert!(!store.move_card(&c1, &l1, 5));
    }

    #[test]
    fn test_move_card_to_unknown_list_is_noop() {
        let (mut store, _) = store();
        let l1 = store.add_list("A");
        let c1 = store.add_card(&l1, "one").unwrap();
        assert!(!store.move_card(&c1, "missing", 0));
        assert!(!store.move_card("missing", &l1, 0));
        assert_eq!(card_ids(&store, &l1), vec![c1]);
    }

    #[test]
    fn test_reorder_list() {
        let (mut store, _) = store();
        let a = store.add_list("A");
        let b = store.add_list("B");
        let c = store.add_list("C");
        assert!(store.reorder_list(0, 2));
        assert_eq!(store.snapshot().board.list_ids, vec![b, c, a]);
        assert!(!store.reorder_list(1, 1));
        assert!(!store.reorder_list(7, 0));
    }

    #[test]
    fn test_comments() {
        let (mut store, _) = store();
        let l1 = store.add_list("A");
        let c1 = store.add_card(&l1, "one").unwrap();
        let first = store.add_comment(&c1, "first").unwrap();
        let second = store.add_comment(&c1, "second").unwrap();
        assert_ne!(first, second);
        assert_eq!(store.snapshot().cards[&c1].comments.len(), 2);

        assert!(store.remove_comment(&c1, &first));
        assert!(!store.remove_comment(&c1, &first));
        let snap = store.snapshot();
        assert_eq!(snap.cards[&c1].comments[0].text, "second");
        assert!(store.add_comment("missing", "x").is_none());
    }

    #[test]
    fn test_replace_validates() {
        let (mut store, _) = store();
        let mut bad = Snapshot::default();
        bad.board.list_ids.push("ghost".into());
        assert!(matches!(store.replace(bad), Err(Error::Integrity(_))));

        let mut wrong_version = Snapshot::default();
        wrong_version.version = 2;
        assert!(matches!(
            store.replace(wrong_version),
            Err(Error::UnsupportedVersion { found: 2, .. })
        ));

        assert!(store.replace(Snapshot::empty("Imported")).is_ok());
        assert_eq!(store.snapshot().board.title, "Imported");
    }

    #[test]
    fn test_drag_flow_across_lists() {
        let (mut store, _) = store();
        let l1 = store.add_list("A");
        let l2 = store.add_list("B");
        let c1 = store.add_card(&l1, "one").unwrap();
        let c2 = store.add_card(&l2, "two").unwrap();

        let source = DndId::Card(c1.clone());
        let over = DndId::Card(c2.clone());

        // hover moves the card over, repeated hovers are stable
        assert!(store.drag_over(&source, Some(&over)));
        assert!(!store.drag_over(&source, Some(&over)));
        assert_eq!(card_ids(&store, &l2), vec![c1.clone(), c2.clone()]);

        // drop on the same card is now an in-list no-op
        assert!(!store.drag_end(&source, Some(&DndId::Card(c1.clone()))));
        assert!(store.drag_end(&source, Some(&over)));
        assert_eq!(card_ids(&store, &l2), vec![c2, c1]);
        assert!(store.snapshot().check_integrity().is_ok());
    }
}
