//! The board store: the single writer of client-side board state.
//!
//! A [`BoardStore`] owns the board, a loading flag and the last error
//! message. Every mutation goes through one of its operations, which apply
//! the change locally, call [`Storage`], and keep or revert the change
//! depending on the outcome. Operations never return errors; failures show
//! up in [`BoardStore::error_message`] and in the unchanged or reverted board.
//!
//! Only `load_board` guards against overlapping calls. Overlapping
//! update/delete/move calls on the same card are not serialized: a failed
//! move restores both column sequences as they were, so an update that
//! moved the same card meanwhile leaves a second copy until the next load.

pub mod mutation;

use crate::{
    domain::{Board, Card, CardChanges, CardId, ColumnId, NewCard},
    error::KanbanError,
    storage::Storage,
};
use mutation::Revert;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const LOAD_FAILED: &str = "Failed to load board. Please try again.";
pub const TARGET_COLUMN_NOT_FOUND: &str = "Target column not found.";
pub const CREATE_FAILED: &str = "Failed to create card.";
pub const CARD_NOT_FOUND: &str = "Card not found.";
pub const UPDATE_FAILED: &str = "Failed to update card.";
pub const DELETE_FAILED: &str = "Failed to delete card.";
pub const INVALID_MOVE_COLUMN: &str = "Invalid column specified for move.";
pub const CARD_NOT_IN_SOURCE: &str = "Card not found in source column.";
pub const MOVE_FAILED: &str = "Failed to move card. Reverting local changes.";

/// Observable store state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub board: Board,
    pub is_loading: bool,
    /// Empty when the last operation succeeded
    pub error_message: String,
}

pub struct BoardStore<S> {
    storage: S,
    state: Mutex<StoreState>,
    published: watch::Sender<StoreState>,
}

impl<S: Storage> BoardStore<S> {
    pub fn new(storage: S) -> Self {
        let (published, _) = watch::channel(StoreState::default());
        Self {
            storage,
            state: Mutex::new(StoreState::default()),
            published,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Snapshot of the current board
    pub fn board(&self) -> Board {
        self.lock_state().board.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading
    }

    pub fn error_message(&self) -> String {
        self.lock_state().error_message.clone()
    }

    pub fn state(&self) -> StoreState {
        self.lock_state().clone()
    }

    /// Receives a fresh snapshot after every local change
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.published.subscribe()
    }

    /// Finds a card and the id of the column holding it
    pub fn find_card(&self, card_id: &CardId) -> Option<(Card, ColumnId)> {
        let state = self.lock_state();
        let loc = state.board.locate_card(card_id)?;
        let column = &state.board.columns[loc.column_index];
        Some((column.cards[loc.card_index].clone(), column.id.clone()))
    }

    /// Replaces the board with a fresh copy from storage.
    ///
    /// Does nothing while a load is already in flight. On failure the
    /// previous board is kept.
    pub async fn load_board(&self) {
        let started = self.mutate(|state| {
            if state.is_loading {
                return false;
            }
            state.is_loading = true;
            state.error_message.clear();
            true
        });
        if !started {
            debug!("board load already in progress; skipping");
            return;
        }

        let result = self.storage.fetch_board().await;

        self.mutate(|state| {
            match result {
                Ok(board) => {
                    info!(
                        columns = board.columns.len(),
                        cards = board.card_count(),
                        "board loaded"
                    );
                    state.board = board;
                }
                Err(err) => {
                    error!(error = %err, "failed to load board");
                    state.error_message = LOAD_FAILED.to_string();
                }
            }
            state.is_loading = false;
        });
    }

    /// Creates a card at the end of `column_id` once storage confirms it.
    ///
    /// The card returned by storage is appended as-is, so its id and
    /// timestamps come from storage.
    pub async fn create_card(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        column_id: &ColumnId,
    ) {
        let (title, description) = (title.into(), description.into());
        let payload = self.mutate(|state| {
            state.error_message.clear();
            state.board.column(column_id).map(|column| NewCard {
                title,
                description,
                column_id: column_id.clone(),
                position: column.next_position(),
            })
        });
        let Some(payload) = payload else {
            warn!(%column_id, "cannot create card; column not on board");
            self.report(TARGET_COLUMN_NOT_FOUND);
            return;
        };

        match self.storage.create_card(&payload).await {
            Ok(card) => self.mutate(|state| {
                if state.board.locate_card(&card.id).is_some() {
                    debug!(card_id = %card.id, "created card already on board");
                    return;
                }
                match state.board.column_mut(column_id) {
                    Some(column) => {
                        debug!(card_id = %card.id, %column_id, "card created");
                        column.cards.push(card);
                    }
                    None => warn!(
                        card_id = %card.id,
                        %column_id,
                        "column left the board before the card was created"
                    ),
                }
            }),
            Err(err) => {
                error!(error = %err, %column_id, "failed to create card");
                self.report(CREATE_FAILED);
            }
        }
    }

    /// Applies `changes` to a card immediately, then persists the fields
    /// that actually changed. Reverts the card on failure.
    pub async fn update_card(&self, card_id: &CardId, changes: CardChanges) {
        let applied = self.mutate(|state| {
            state.error_message.clear();
            mutation::apply_update(&mut state.board, card_id, &changes)
        });
        let applied = match applied {
            Ok(applied) => applied,
            Err(err) => {
                warn!(error = %err, %card_id, "cannot update card");
                self.report(match err {
                    KanbanError::ColumnNotFound(_) => TARGET_COLUMN_NOT_FOUND,
                    _ => CARD_NOT_FOUND,
                });
                return;
            }
        };

        if applied.request.is_empty() {
            debug!(%card_id, "card unchanged; skipping storage update");
            return;
        }

        if let Err(err) = self.storage.update_card(card_id, &applied.request).await {
            error!(error = %err, %card_id, "failed to update card; reverting");
            self.mutate(|state| {
                applied.undo.revert(&mut state.board);
                state.error_message = UPDATE_FAILED.to_string();
            });
        }
    }

    /// Removes a card immediately, then deletes it in storage. A card that
    /// is not on the board is ignored.
    pub async fn delete_card(&self, card_id: &CardId) {
        let applied = self.mutate(|state| {
            state.error_message.clear();
            mutation::apply_delete(&mut state.board, card_id)
        });
        let Ok(applied) = applied else {
            debug!(%card_id, "card not on board; nothing to delete");
            return;
        };

        if let Err(err) = self.storage.delete_card(&applied.request).await {
            error!(error = %err, %card_id, "failed to delete card; restoring");
            self.mutate(|state| {
                applied.undo.revert(&mut state.board);
                state.error_message = DELETE_FAILED.to_string();
            });
        }
    }

    /// Moves a card to the end of another column immediately, then
    /// persists the move. Both columns are restored on failure.
    pub async fn move_card(&self, card_id: &CardId, from: &ColumnId, to: &ColumnId) {
        let applied = self.mutate(|state| {
            state.error_message.clear();
            mutation::apply_move(&mut state.board, card_id, from, to)
        });
        let applied = match applied {
            Ok(applied) => applied,
            Err(err) => {
                warn!(error = %err, %card_id, %from, %to, "cannot move card");
                self.report(match err {
                    KanbanError::ColumnNotFound(_) => INVALID_MOVE_COLUMN,
                    _ => CARD_NOT_IN_SOURCE,
                });
                return;
            }
        };

        let request = &applied.request;
        if let Err(err) = self
            .storage
            .move_card(card_id, &request.to_column, request.position)
            .await
        {
            error!(error = %err, %card_id, %from, %to, "failed to move card; reverting");
            self.mutate(|state| {
                applied.undo.revert(&mut state.board);
                state.error_message = MOVE_FAILED.to_string();
            });
        }
    }

    fn report(&self, message: &str) {
        self.mutate(|state| state.error_message = message.to_string());
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one local mutation and publishes the resulting state. The lock
    /// is never held across an await.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.lock_state();
        let result = f(&mut state);
        self.published.send_replace(state.clone());
        result
    }
}
