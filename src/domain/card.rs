use crate::domain::board::ColumnId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a card, assigned by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CardId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A kanban card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub column_id: ColumnId,
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Creates a card with no timestamps
    pub fn new(
        id: impl Into<CardId>,
        title: impl Into<String>,
        column_id: impl Into<ColumnId>,
        position: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            column_id: column_id.into(),
            position,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds a stored card from a creation payload
    pub fn from_new(id: CardId, new_card: &NewCard, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new_card.title.clone(),
            description: new_card.description.clone(),
            column_id: new_card.column_id.clone(),
            position: new_card.position,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Merges every present field of `changes` into the card
    pub fn apply_changes(&mut self, changes: &CardChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(column_id) = &changes.column_id {
            self.column_id = column_id.clone();
        }
        if let Some(position) = changes.position {
            self.position = position;
        }
    }
}

/// Payload sent to the persistence layer when creating a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub title: String,
    pub description: String,
    pub column_id: ColumnId,
    pub position: i64,
}

/// Partial card update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl CardChanges {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn column(mut self, column_id: impl Into<ColumnId>) -> Self {
        self.column_id = Some(column_id.into());
        self
    }

    pub fn position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.column_id.is_none()
            && self.position.is_none()
    }

    /// Narrows the changes to the fields whose values differ from `card`
    pub fn diff_against(&self, card: &Card) -> CardChanges {
        CardChanges {
            title: self.title.clone().filter(|t| *t != card.title),
            description: self
                .description
                .clone()
                .filter(|d| *d != card.description),
            column_id: self.column_id.clone().filter(|c| *c != card.column_id),
            position: self.position.filter(|p| *p != card.position),
        }
    }
}
