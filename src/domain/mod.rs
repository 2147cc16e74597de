pub mod board;
pub mod card;
pub mod sorting;

pub use board::{Board, CardLocation, Column, ColumnId};
pub use card::{Card, CardChanges, CardId, NewCard};
pub use sorting::{sort_cards, sort_columns, SortField, SortOrder};
