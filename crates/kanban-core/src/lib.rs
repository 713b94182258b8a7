//! kanban-core: Core library for the kanban board
//!
//! Provides the board data model, the snapshot store that owns and mutates
//! it, the drag resolver that turns drag gestures into store mutations, and
//! single-slot JSON persistence.

pub mod config;
pub mod drag;
pub mod error;
pub mod id;
pub mod model;
pub mod order;
pub mod persist;
pub mod store;

pub use config::Config;
pub use drag::{DndId, DragIntent, resolve_drag_end, resolve_drag_over};
pub use error::Error;
pub use id::generate_id;
pub use model::{Board, Card, Comment, List, Snapshot};
pub use persist::{FileSlot, MemorySlot, Persistence, Slot};
pub use store::Store;

/// Result type for kanban operations
pub type Result<T> = std::result::Result<T, Error>;
