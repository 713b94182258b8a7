//! Drag intent resolution
//!
//! Turns a drag source and an optional drop target into the store mutation
//! the gesture implies. Resolution only reads the snapshot; the store
//! applies the result. Any lookup that fails resolves to no intent.

use crate::{Error, Snapshot};
use std::fmt;
use std::str::FromStr;

const LIST_TAG: &str = "list:";
const CARD_TAG: &str = "card:";

/// A draggable or droppable element as seen by the drag-and-drop layer
///
/// On the wire these are tagged strings, `list:<id>` and `card:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DndId {
    List(String),
    Card(String),
}

impl DndId {
    /// The bare entity id
    pub fn id(&self) -> &str {
        match self {
            DndId::List(id) | DndId::Card(id) => id,
        }
    }
}

impl FromStr for DndId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix(LIST_TAG) {
            Ok(DndId::List(id.to_string()))
        } else if let Some(id) = s.strip_prefix(CARD_TAG) {
            Ok(DndId::Card(id.to_string()))
        } else {
            Err(Error::InvalidDndId(s.to_string()))
        }
    }
}

impl fmt::Display for DndId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DndId::List(id) => write!(f, "{}{}", LIST_TAG, id),
            DndId::Card(id) => write!(f, "{}{}", CARD_TAG, id),
        }
    }
}

/// A concrete mutation implied by a drag gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    /// Reposition a list on the board
    ReorderList { from: usize, to: usize },
    /// Move a card into a list at an index
    MoveCard {
        card_id: String,
        to_list_id: String,
        to_index: usize,
    },
    /// Reposition a card inside its own list
    ReorderCard {
        list_id: String,
        from: usize,
        to: usize,
    },
}

/// Where a card would land if released over `target`
///
/// Over a list: append. Over a card: that card's slot in its list.
fn card_destination(snap: &Snapshot, target: &DndId) -> Option<(String, usize)> {
    match target {
        DndId::List(list_id) => {
            let list = snap.list(list_id)?;
            Some((list.id.clone(), list.card_ids.len()))
        }
        DndId::Card(card_id) => {
            let over = snap.card(card_id)?;
            let list = snap.list(&over.list_id)?;
            Some((list.id.clone(), list.position(card_id).unwrap_or(0)))
        }
    }
}

/// Resolve a hover event during a drag
///
/// Only cards move while hovering, and only across lists. Same-list hover
/// waits for the drop.
pub fn resolve_drag_over(
    snap: &Snapshot,
    source: &DndId,
    target: Option<&DndId>,
) -> Option<DragIntent> {
    let target = target?;
    let DndId::Card(card_id) = source else {
        return None;
    };
    let dragged = snap.card(card_id)?;
    let (to_list_id, to_index) = card_destination(snap, target)?;

    if dragged.list_id == to_list_id {
        return None;
    }

    Some(DragIntent::MoveCard {
        card_id: card_id.clone(),
        to_list_id,
        to_index,
    })
}

/// Resolve the drop that ends a drag
pub fn resolve_drag_end(
    snap: &Snapshot,
    source: &DndId,
    target: Option<&DndId>,
) -> Option<DragIntent> {
    let target = target?;

    match (source, target) {
        (DndId::List(from_id), DndId::List(to_id)) => {
            let list_ids = &snap.board.list_ids;
            let from = list_ids.iter().position(|id| id == from_id)?;
            let to = list_ids.iter().position(|id| id == to_id)?;
            (from != to).then_some(DragIntent::ReorderList { from, to })
        }
        (DndId::List(_), DndId::Card(_)) => None,
        (DndId::Card(card_id), target) => {
            let dragged = snap.card(card_id)?;
            let (to_list_id, to_index) = card_destination(snap, target)?;

            if let DndId::Card(over_id) = target
                && to_list_id == dragged.list_id
            {
                let list = snap.list(&to_list_id)?;
                let from = list.position(card_id)?;
                let to = list.position(over_id)?;
                return (from != to).then_some(DragIntent::ReorderCard {
                    list_id: to_list_id,
                    from,
                    to,
                });
            }

            Some(DragIntent::MoveCard {
                card_id: card_id.clone(),
                to_list_id,
                to_index,
            })
        }
    }
}
