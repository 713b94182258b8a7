//! Board data model
//!
//! A snapshot is the whole board: one board, its lists, their cards.
//! Field names on the wire follow the stored layout (`listIds`, `cardIds`,
//! `listId`, `createdAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Schema tag written into every stored snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Board id used for a fresh snapshot
pub const DEFAULT_BOARD_ID: &str = "1";

/// Board title used when no configuration overrides it
pub const DEFAULT_BOARD_TITLE: &str = "Task Board";

/// A comment on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    /// Stored as Unix milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: String, text: String) -> Self {
        Self {
            id,
            text,
            created_at: now_millis(),
        }
    }
}

/// A unit of work belonging to exactly one list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub list_id: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub done: bool,
}

impl Card {
    pub fn new(id: String, title: String, list_id: String) -> Self {
        Self {
            id,
            title,
            list_id,
            comments: Vec::new(),
            done: false,
        }
    }

    /// Comments ordered newest first, as the comment view shows them
    pub fn comments_newest_first(&self) -> Vec<&Comment> {
        let mut comments: Vec<&Comment> = self.comments.iter().collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments
    }
}

/// An ordered column of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub title: String,
    pub card_ids: Vec<String>,
}

impl List {
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            card_ids: Vec::new(),
        }
    }

    /// Position of a card within this list
    pub fn position(&self, card_id: &str) -> Option<usize> {
        self.card_ids.iter().position(|id| id == card_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub title: String,
    pub list_ids: Vec<String>,
}

/// The complete, versioned board state
///
/// This is the unit of persistence and of mutation: the store never edits a
/// published snapshot, it builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub board: Board,
    pub lists: BTreeMap<String, List>,
    pub cards: BTreeMap<String, Card>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty(DEFAULT_BOARD_TITLE)
    }
}

impl Snapshot {
    /// An empty board with the given title
    pub fn empty(title: &str) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            board: Board {
                id: DEFAULT_BOARD_ID.to_string(),
                title: title.to_string(),
                list_ids: Vec::new(),
            },
            lists: BTreeMap::new(),
            cards: BTreeMap::new(),
        }
    }

    pub fn list(&self, id: &str) -> Option<&List> {
        self.lists.get(id)
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    /// Lists in display order
    pub fn ordered_lists(&self) -> impl Iterator<Item = &List> {
        self.board.list_ids.iter().filter_map(|id| self.lists.get(id))
    }

    /// Cards of a list in display order
    pub fn cards_in<'a>(&'a self, list: &'a List) -> impl Iterator<Item = &'a Card> {
        list.card_ids.iter().filter_map(|id| self.cards.get(id))
    }

    /// True if `id` names any list or card
    pub fn id_in_use(&self, id: &str) -> bool {
        self.lists.contains_key(id) || self.cards.contains_key(id)
    }

    /// Check the cross-reference invariants between board, lists and cards
    ///
    /// Reports the first violation found.
    pub fn check_integrity(&self) -> crate::Result<()> {
        let violation = |msg: String| Err(crate::Error::Integrity(msg));

        let mut seen_lists = HashSet::new();
        for list_id in &self.board.list_ids {
            if !seen_lists.insert(list_id.as_str()) {
                return violation(format!("list {} appears twice on the board", list_id));
            }
            if !self.lists.contains_key(list_id) {
                return violation(format!("board references unknown list {}", list_id));
            }
        }

        let mut membership: HashMap<&str, usize> = HashMap::new();
        for (key, list) in &self.lists {
            if key != &list.id {
                return violation(format!("list stored under {} has id {}", key, list.id));
            }
            if !seen_lists.contains(key.as_str()) {
                return violation(format!("list {} is not on the board", key));
            }
            for card_id in &list.card_ids {
                let Some(card) = self.cards.get(card_id) else {
                    return violation(format!("list {} references unknown card {}", key, card_id));
                };
                if card.list_id != list.id {
                    return violation(format!(
                        "card {} is listed in {} but belongs to {}",
                        card_id, list.id, card.list_id
                    ));
                }
                *membership.entry(card_id.as_str()).or_default() += 1;
            }
        }

        for (key, card) in &self.cards {
            if key != &card.id {
                return violation(format!("card stored under {} has id {}", key, card.id));
            }
            match membership.get(key.as_str()) {
                Some(1) => {}
                Some(n) => {
                    return violation(format!("card {} is listed {} times", key, n));
                }
                None => return violation(format!("card {} is not in any list", key)),
            }
        }

        Ok(())
    }
}

/// Current time truncated to the millisecond precision used on the wire
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
