use crate::domain::{board::Column, card::Card};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Position,
    Title,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" => Ok(SortField::Position),
            "title" => Ok(SortField::Title),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: position, title, created, updated",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts cards in-place by the given field and order.
///
/// The sort is stable, so cards that compare equal keep their relative order.
///
/// # Examples
/// ```
/// use kanban_core::domain::sorting::{sort_cards, SortField, SortOrder};
/// use kanban_core::domain::card::Card;
///
/// let mut cards = vec![
///     Card::new("b", "B", "col1", 2),
///     Card::new("a", "A", "col1", 0),
/// ];
///
/// sort_cards(&mut cards, SortField::Position, SortOrder::Ascending);
/// assert_eq!(cards[0].id.as_str(), "a");
/// ```
pub fn sort_cards(cards: &mut [Card], field: SortField, order: SortOrder) {
    cards.sort_by(|a, b| {
        let cmp = match field {
            SortField::Position => a.position.cmp(&b.position),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Created => compare_option_dates(a.created_at, b.created_at),
            SortField::Updated => compare_option_dates(a.updated_at, b.updated_at),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Orders columns, and the cards inside each column, by position ascending
pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by_key(|col| col.position);
    for column in columns.iter_mut() {
        sort_cards(&mut column.cards, SortField::Position, SortOrder::Ascending);
    }
}

/// Compare Option<DateTime> with None always sorting to end
fn compare_option_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
