use crate::{
    domain::card::{Card, CardId},
    error::{KanbanError, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

/// Unique identifier for a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A board column and the cards it owns, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub position: i64,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>, position: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position,
            cards: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// Position for a card appended to this column: `0` when empty,
    /// otherwise one past the highest existing position.
    pub fn next_position(&self) -> i64 {
        self.cards
            .iter()
            .map(|card| card.position)
            .max()
            .map_or(0, |max| max + 1)
    }

    pub fn card_index(&self, card_id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == card_id)
    }
}

/// Where a card currently lives on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLocation {
    pub column_index: usize,
    pub card_index: usize,
}

/// Kanban board state: the ordered column sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Board {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    pub fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|col| &col.id == id)
    }

    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|col| &col.id == id)
    }

    /// Finds a card by scanning every column in order
    pub fn locate_card(&self, card_id: &CardId) -> Option<CardLocation> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(column_index, column)| {
                column.card_index(card_id).map(|card_index| CardLocation {
                    column_index,
                    card_index,
                })
            })
    }

    pub fn card(&self, card_id: &CardId) -> Option<&Card> {
        self.locate_card(card_id)
            .map(|loc| &self.columns[loc.column_index].cards[loc.card_index])
    }

    /// Total number of cards across all columns
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|col| col.cards.len()).sum()
    }

    /// Checks that every card sits in exactly one column and that its
    /// `column_id` names that column.
    pub fn check_ownership(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for column in &self.columns {
            for card in &column.cards {
                if card.column_id != column.id {
                    return Err(KanbanError::OwnershipViolation(format!(
                        "card {} is held by column {} but references column {}",
                        card.id, column.id, card.column_id
                    )));
                }
                if !seen.insert(&card.id) {
                    return Err(KanbanError::OwnershipViolation(format!(
                        "card {} appears more than once",
                        card.id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        Board::new(vec![
            Column::new("col1", "To Do", 0).with_cards(vec![
                Card::new("c1", "One", "col1", 0),
                Card::new("c2", "Two", "col1", 1),
            ]),
            Column::new("col2", "Done", 1)
                .with_cards(vec![Card::new("c3", "Three", "col2", 0)]),
        ])
    }

    #[test]
    fn test_board_creation() {
        let board = Board::default();
        assert!(board.columns.is_empty());
        assert_eq!(board.card_count(), 0);
    }

    #[test]
    fn test_next_position() {
        let empty = Column::new("col1", "To Do", 0);
        assert_eq!(empty.next_position(), 0);

        let column = Column::new("col1", "To Do", 0).with_cards(vec![
            Card::new("a", "A", "col1", 0),
            Card::new("b", "B", "col1", 2),
            Card::new("c", "C", "col1", 5),
        ]);
        assert_eq!(column.next_position(), 6);
    }

    #[test]
    fn test_locate_card() {
        let board = sample_board();

        let loc = board.locate_card(&CardId::from("c3")).unwrap();
        assert_eq!(loc.column_index, 1);
        assert_eq!(loc.card_index, 0);

        assert!(board.locate_card(&CardId::from("missing")).is_none());
        assert_eq!(board.card(&CardId::from("c2")).unwrap().title, "Two");
    }

    #[test]
    fn test_column_lookup() {
        let mut board = sample_board();

        assert_eq!(board.column_index(&ColumnId::from("col2")), Some(1));
        assert!(board.column(&ColumnId::from("nope")).is_none());

        board
            .column_mut(&ColumnId::from("col2"))
            .unwrap()
            .title = "Finished".to_string();
        assert_eq!(board.columns[1].title, "Finished");
    }

    #[test]
    fn test_check_ownership() {
        let mut board = sample_board();
        assert!(board.check_ownership().is_ok());
        assert_eq!(board.card_count(), 3);

        board.columns[1].cards[0].column_id = ColumnId::from("col1");
        assert!(matches!(
            board.check_ownership(),
            Err(KanbanError::OwnershipViolation(_))
        ));
    }

    #[test]
    fn test_check_ownership_detects_duplicates() {
        let mut board = sample_board();
        let mut dup = board.columns[0].cards[0].clone();
        dup.column_id = ColumnId::from("col2");
        board.columns[1].cards.push(dup);

        assert!(board.check_ownership().is_err());
    }

    #[test]
    fn test_column_deserializes_without_cards() {
        let json = r#"{"id":"col1","title":"To Do","position":0}"#;
        let column: Column = serde_json::from_str(json).unwrap();
        assert!(column.cards.is_empty());
    }
}
