//! # Kanban Core
//!
//! Client-side state for kanban boards, kept in sync with a remote record
//! store through optimistic updates.
//!
//! [`BoardStore`] holds the board, applies card changes locally before
//! persisting them through a [`Storage`] backend, and rolls them back when
//! the backend rejects them.

pub mod config;
pub mod dialog;
pub mod domain;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::{BoardConfig, ColumnConfig};
pub use dialog::{CardDialog, ConfirmationDialog};
pub use domain::{
    board::{Board, CardLocation, Column, ColumnId},
    card::{Card, CardChanges, CardId, NewCard},
};
pub use error::{KanbanError, Result};
pub use storage::Storage;
pub use store::{BoardStore, StoreState};

#[cfg(feature = "file-storage")]
pub use storage::file_storage::FileStorage;

#[cfg(feature = "sqlite-storage")]
pub use storage::sqlite_storage::SqliteStorage;
