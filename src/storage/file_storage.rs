use crate::{
    config::BoardConfig,
    domain::{
        sort_cards, Card, CardChanges, CardId, Column, ColumnId, NewCard, SortField, SortOrder,
    },
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// File-based record store: one JSON file per column and per card
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const KANBAN_DIR: &'static str = ".kanban";
    const COLUMNS_DIR: &'static str = "columns";
    const CARDS_DIR: &'static str = "cards";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANBAN_DIR),
        }
    }

    fn columns_dir(&self) -> PathBuf {
        self.root_path.join(Self::COLUMNS_DIR)
    }

    fn cards_dir(&self) -> PathBuf {
        self.root_path.join(Self::CARDS_DIR)
    }

    fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    fn column_file(&self, id: &ColumnId) -> Result<PathBuf> {
        if !is_plain_id(id.as_str()) {
            return Err(KanbanError::ColumnNotFound(id.to_string()));
        }
        Ok(self.columns_dir().join(format!("{}.json", id.as_str())))
    }

    fn card_file(&self, id: &CardId) -> Result<PathBuf> {
        if !is_plain_id(id.as_str()) {
            return Err(KanbanError::CardNotFound(id.to_string()));
        }
        Ok(self.cards_dir().join(format!("{}.json", id.as_str())))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the directory layout, writes a default `config.toml` when
    /// missing, and seeds one column per configured column if none exist.
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.columns_dir()).await?;
        self.ensure_directory_exists(&self.cards_dir()).await?;

        if !self.config_file().exists() {
            let config = BoardConfig::default();
            fs::write(self.config_file(), config.to_toml_string()?).await?;
        }

        let config = self.load_config().await?;
        let existing: Vec<Column> = read_records(&self.columns_dir()).await?;
        if existing.is_empty() {
            for column in &config.columns {
                self.add_column(&column.title).await?;
            }
        }

        Ok(())
    }

    /// Checks if the storage directory and its configuration exist
    pub async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.config_file().exists()
    }

    pub async fn load_config(&self) -> Result<BoardConfig> {
        BoardConfig::load(self.config_file()).await
    }

    /// Appends a column after the current last column
    pub async fn add_column(&self, title: &str) -> Result<Column> {
        self.ensure_directory_exists(&self.columns_dir()).await?;

        let existing: Vec<Column> = read_records(&self.columns_dir()).await?;
        let position = existing
            .iter()
            .map(|col| col.position)
            .max()
            .map_or(0, |max| max + 1);

        let now = Utc::now();
        let mut column = Column::new(Uuid::new_v4().to_string(), title, position);
        column.created_at = Some(now);
        column.updated_at = Some(now);

        self.write_json(&self.column_file(&column.id)?, &column).await?;
        debug!(column_id = %column.id, title, "created column");
        Ok(column)
    }

    async fn load_card(&self, id: &CardId) -> Result<Card> {
        let file_path = self.card_file(id)?;

        if !file_path.exists() {
            return Err(KanbanError::CardNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save_card(&self, card: &Card) -> Result<()> {
        self.ensure_directory_exists(&self.cards_dir()).await?;
        self.write_json(&self.card_file(&card.id)?, card).await
    }

    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json).await?;
        Ok(())
    }
}

/// Ids become file names, so they must not carry path components
fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && !id.contains("..") && !id.contains(|c: char| c == '/' || c == '\\')
}

/// Reads every `*.json` record in `dir`
async fn read_records<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(dir).await?;
    let mut records = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            let contents = fs::read_to_string(&path).await?;
            records.push(serde_json::from_str(&contents)?);
        }
    }

    Ok(records)
}

#[async_trait]
impl Storage for FileStorage {
    async fn fetch_columns(&self) -> Result<Vec<Column>> {
        if !self.is_initialized().await {
            return Err(KanbanError::StorageNotInitialized);
        }

        let mut columns: Vec<Column> = read_records(&self.columns_dir()).await?;
        columns.sort_by_key(|col| col.position);
        Ok(columns)
    }

    async fn fetch_cards(&self, column_id: Option<&ColumnId>) -> Result<Vec<Card>> {
        if !self.is_initialized().await {
            return Err(KanbanError::StorageNotInitialized);
        }

        let mut cards: Vec<Card> = read_records(&self.cards_dir()).await?;
        if let Some(column_id) = column_id {
            cards.retain(|card| &card.column_id == column_id);
        }
        sort_cards(&mut cards, SortField::Position, SortOrder::Ascending);
        Ok(cards)
    }

    async fn create_card(&self, new_card: &NewCard) -> Result<Card> {
        if !self.column_file(&new_card.column_id)?.exists() {
            return Err(KanbanError::ColumnNotFound(new_card.column_id.to_string()));
        }

        let card = Card::from_new(
            CardId::new(Uuid::new_v4().to_string()),
            new_card,
            Utc::now(),
        );
        self.save_card(&card).await?;

        Ok(card)
    }

    async fn update_card(&self, id: &CardId, changes: &CardChanges) -> Result<()> {
        if let Some(column_id) = &changes.column_id {
            if !self.column_file(column_id)?.exists() {
                return Err(KanbanError::ColumnNotFound(column_id.to_string()));
            }
        }

        let mut card = self.load_card(id).await?;
        card.apply_changes(changes);
        card.updated_at = Some(Utc::now());
        self.save_card(&card).await
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        let file_path = self.card_file(id)?;

        if !file_path.exists() {
            return Err(KanbanError::CardNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        Ok(())
    }

    async fn move_card(&self, id: &CardId, to_column: &ColumnId, position: i64) -> Result<()> {
        let changes = CardChanges::default()
            .column(to_column.clone())
            .position(position);
        self.update_card(id, &changes).await
    }
}
