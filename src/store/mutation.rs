//! Optimistic board mutations as snapshot / apply / confirm-or-revert.
//!
//! Each `apply_*` function validates its preconditions, records what it needs
//! to undo the change, mutates the board, and returns the undo token together
//! with the request to send to storage. Nothing is mutated when validation
//! fails. Confirming a mutation is dropping its undo token; reverting is
//! [`Revert::revert`].

use crate::{
    domain::{Board, Card, CardChanges, CardId, ColumnId},
    error::{KanbanError, Result},
};
use tracing::warn;

/// Undoes a previously applied optimistic mutation
pub trait Revert {
    fn revert(self, board: &mut Board);
}

/// An applied mutation: how to undo it, and what to send to storage
#[derive(Debug)]
pub struct Applied<U, R> {
    pub undo: U,
    pub request: R,
}

/// Remote side of a card move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub to_column: ColumnId,
    pub position: i64,
}

/// Restores a card's fields and its original slot
#[derive(Debug)]
pub struct UpdateUndo {
    original: Card,
    card_index: usize,
}

/// Re-inserts a deleted card at its original slot
#[derive(Debug)]
pub struct DeleteUndo {
    card: Card,
    card_index: usize,
}

/// Whole-sequence snapshots of the two columns touched by a move
#[derive(Debug)]
pub struct MoveUndo {
    from_column: ColumnId,
    from_cards: Vec<Card>,
    to_column: ColumnId,
    to_cards: Vec<Card>,
}

/// Applies the title, description and column fields of `changes` that differ
/// from the current card. A caller-supplied `position` is ignored.
///
/// A column change detaches the card from its column and appends it to the
/// target column at the target's next position; that position is part of the
/// returned request. An empty request means nothing changed.
pub fn apply_update(
    board: &mut Board,
    card_id: &CardId,
    changes: &CardChanges,
) -> Result<Applied<UpdateUndo, CardChanges>> {
    let loc = board
        .locate_card(card_id)
        .ok_or_else(|| KanbanError::CardNotFound(card_id.to_string()))?;
    let original = board.columns[loc.column_index].cards[loc.card_index].clone();

    let editable = CardChanges {
        position: None,
        ..changes.clone()
    };
    let mut request = editable.diff_against(&original);
    let target_index = match &request.column_id {
        Some(target) => Some(
            board
                .column_index(target)
                .ok_or_else(|| KanbanError::ColumnNotFound(target.to_string()))?,
        ),
        None => None,
    };

    match target_index {
        Some(target_index) => {
            request.position = Some(board.columns[target_index].next_position());
            let mut card = board.columns[loc.column_index].cards.remove(loc.card_index);
            card.apply_changes(&request);
            board.columns[target_index].cards.push(card);
        }
        None => {
            board.columns[loc.column_index].cards[loc.card_index].apply_changes(&request);
        }
    }

    Ok(Applied {
        undo: UpdateUndo {
            original,
            card_index: loc.card_index,
        },
        request,
    })
}

/// Removes a card from its column
pub fn apply_delete(board: &mut Board, card_id: &CardId) -> Result<Applied<DeleteUndo, CardId>> {
    let loc = board
        .locate_card(card_id)
        .ok_or_else(|| KanbanError::CardNotFound(card_id.to_string()))?;
    let card = board.columns[loc.column_index].cards.remove(loc.card_index);

    Ok(Applied {
        undo: DeleteUndo {
            card,
            card_index: loc.card_index,
        },
        request: card_id.clone(),
    })
}

/// Moves a card from `from` to the end of `to`.
///
/// Both card sequences are snapshotted before anything changes. The card is
/// given the destination's next position so it sorts after every card
/// already there.
pub fn apply_move(
    board: &mut Board,
    card_id: &CardId,
    from: &ColumnId,
    to: &ColumnId,
) -> Result<Applied<MoveUndo, MoveRequest>> {
    let from_index = board
        .column_index(from)
        .ok_or_else(|| KanbanError::ColumnNotFound(from.to_string()))?;
    let to_index = board
        .column_index(to)
        .ok_or_else(|| KanbanError::ColumnNotFound(to.to_string()))?;
    let card_index = board.columns[from_index]
        .card_index(card_id)
        .ok_or_else(|| KanbanError::CardNotInColumn {
            card: card_id.to_string(),
            column: from.to_string(),
        })?;

    let undo = MoveUndo {
        from_column: from.clone(),
        from_cards: board.columns[from_index].cards.clone(),
        to_column: to.clone(),
        to_cards: board.columns[to_index].cards.clone(),
    };

    let mut card = board.columns[from_index].cards.remove(card_index);
    let position = board.columns[to_index].next_position();
    card.column_id = to.clone();
    card.position = position;
    board.columns[to_index].cards.push(card);

    Ok(Applied {
        undo,
        request: MoveRequest {
            to_column: to.clone(),
            position,
        },
    })
}

/// Puts `card` back into its own column at `index`, after dropping any copy
/// of it elsewhere on the board. The index is clamped to the column length.
fn restore_card(board: &mut Board, card: Card, index: usize) {
    if let Some(loc) = board.locate_card(&card.id) {
        board.columns[loc.column_index].cards.remove(loc.card_index);
    }

    match board.column_mut(&card.column_id) {
        Some(column) => {
            let index = index.min(column.cards.len());
            column.cards.insert(index, card);
        }
        None => {
            warn!(
                card_id = %card.id,
                column_id = %card.column_id,
                "cannot restore card; column no longer on board"
            );
        }
    }
}

impl Revert for UpdateUndo {
    fn revert(self, board: &mut Board) {
        restore_card(board, self.original, self.card_index);
    }
}

impl Revert for DeleteUndo {
    fn revert(self, board: &mut Board) {
        restore_card(board, self.card, self.card_index);
    }
}

impl Revert for MoveUndo {
    fn revert(self, board: &mut Board) {
        if let Some(column) = board.column_mut(&self.from_column) {
            column.cards = self.from_cards;
        }
        if let Some(column) = board.column_mut(&self.to_column) {
            column.cards = self.to_cards;
        }
    }
}
