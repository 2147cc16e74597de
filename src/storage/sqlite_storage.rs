use crate::{
    domain::{Card, CardChanges, CardId, Column, ColumnId, NewCard},
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};
use uuid::Uuid;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS columns (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    position INTEGER NOT NULL,
    created_at TEXT,
    updated_at TEXT
);
CREATE TABLE IF NOT EXISTS cards (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    column_id TEXT NOT NULL REFERENCES columns(id),
    position INTEGER NOT NULL,
    created_at TEXT,
    updated_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_cards_column_position ON cards(column_id, position);
";

/// SQLite-backed record store for columns and cards
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) a database file and ensures the schema exists
    pub fn open(database_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_connection(Connection::open(database_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| KanbanError::StorageError("sqlite connection poisoned".to_string()))
    }

    /// Appends a column after the current last column
    pub fn add_column(&self, title: &str) -> Result<Column> {
        let conn = self.conn()?;
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM columns",
            [],
            |row| row.get(0),
        )?;

        let now = Utc::now();
        let mut column = Column::new(Uuid::new_v4().to_string(), title, position);
        column.created_at = Some(now);
        column.updated_at = Some(now);

        conn.execute(
            "INSERT INTO columns (id, title, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                column.id.as_str(),
                column.title,
                column.position,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )?;

        Ok(column)
    }
}

fn column_exists(conn: &Connection, id: &ColumnId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM columns WHERE id = ?1",
            params![id.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn column_from_row(row: &Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: ColumnId::new(row.get::<_, String>(0)?),
        title: row.get(1)?,
        position: row.get(2)?,
        cards: Vec::new(),
        created_at: parse_timestamp(row.get(3)?),
        updated_at: parse_timestamp(row.get(4)?),
    })
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: CardId::new(row.get::<_, String>(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        column_id: ColumnId::new(row.get::<_, String>(3)?),
        position: row.get(4)?,
        created_at: parse_timestamp(row.get(5)?),
        updated_at: parse_timestamp(row.get(6)?),
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn fetch_columns(&self) -> Result<Vec<Column>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, position, created_at, updated_at
             FROM columns ORDER BY position ASC",
        )?;
        let columns = stmt
            .query_map([], column_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    async fn fetch_cards(&self, column_id: Option<&ColumnId>) -> Result<Vec<Card>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, column_id, position, created_at, updated_at
             FROM cards
             WHERE ?1 IS NULL OR column_id = ?1
             ORDER BY position ASC",
        )?;
        let cards = stmt
            .query_map(params![column_id.map(|c| c.as_str())], card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    async fn create_card(&self, new_card: &NewCard) -> Result<Card> {
        let conn = self.conn()?;
        if !column_exists(&conn, &new_card.column_id)? {
            return Err(KanbanError::ColumnNotFound(new_card.column_id.to_string()));
        }

        let now = Utc::now();
        let card = Card::from_new(CardId::new(Uuid::new_v4().to_string()), new_card, now);
        conn.execute(
            "INSERT INTO cards (id, title, description, column_id, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                card.id.as_str(),
                card.title,
                card.description,
                card.column_id.as_str(),
                card.position,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )?;

        Ok(card)
    }

    async fn update_card(&self, id: &CardId, changes: &CardChanges) -> Result<()> {
        let conn = self.conn()?;
        if let Some(column_id) = &changes.column_id {
            if !column_exists(&conn, column_id)? {
                return Err(KanbanError::ColumnNotFound(column_id.to_string()));
            }
        }

        let updated = conn.execute(
            "UPDATE cards SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                column_id = COALESCE(?4, column_id),
                position = COALESCE(?5, position),
                updated_at = ?6
             WHERE id = ?1",
            params![
                id.as_str(),
                changes.title,
                changes.description,
                changes.column_id.as_ref().map(|c| c.as_str()),
                changes.position,
                Utc::now().to_rfc3339()
            ],
        )?;

        if updated == 0 {
            return Err(KanbanError::CardNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM cards WHERE id = ?1", params![id.as_str()])?;

        if deleted == 0 {
            return Err(KanbanError::CardNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn move_card(&self, id: &CardId, to_column: &ColumnId, position: i64) -> Result<()> {
        let changes = CardChanges::default()
            .column(to_column.clone())
            .position(position);
        self.update_card(id, &changes).await
    }
}
