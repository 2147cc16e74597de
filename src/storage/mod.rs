use crate::{
    domain::{sort_columns, Board, Card, CardChanges, CardId, Column, ColumnId, NewCard},
    error::Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::warn;

#[cfg(feature = "file-storage")]
pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Remote record store the board state is synchronized against
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetches every column, without cards, ordered by position ascending
    async fn fetch_columns(&self) -> Result<Vec<Column>>;

    /// Fetches cards ordered by position ascending, optionally only those of one column
    async fn fetch_cards(&self, column_id: Option<&ColumnId>) -> Result<Vec<Card>>;

    /// Fetches every column with its cards, both ordered by position ascending
    async fn fetch_board(&self) -> Result<Board> {
        let columns = self.fetch_columns().await?;
        let cards = self.fetch_cards(None).await?;
        Ok(assemble_board(columns, cards))
    }

    /// Creates a card and returns the stored record with its assigned id and timestamps
    async fn create_card(&self, card: &NewCard) -> Result<Card>;

    /// Applies a partial update to a card
    async fn update_card(&self, id: &CardId, changes: &CardChanges) -> Result<()>;

    /// Deletes a card
    async fn delete_card(&self, id: &CardId) -> Result<()>;

    /// Moves a card to another column at the given position
    async fn move_card(&self, id: &CardId, to_column: &ColumnId, position: i64) -> Result<()>;
}

/// Groups cards under the columns they reference and orders both by
/// position. Cards whose column is not among `columns` are dropped.
pub fn assemble_board(mut columns: Vec<Column>, cards: Vec<Card>) -> Board {
    let mut cards_by_column: HashMap<ColumnId, Vec<Card>> = HashMap::new();
    for card in cards {
        cards_by_column
            .entry(card.column_id.clone())
            .or_default()
            .push(card);
    }

    for column in &mut columns {
        column.cards = cards_by_column.remove(&column.id).unwrap_or_default();
    }
    for (column_id, orphans) in cards_by_column {
        warn!(%column_id, count = orphans.len(), "skipping cards of unknown column");
    }

    sort_columns(&mut columns);
    Board::new(columns)
}
