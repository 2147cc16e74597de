use crate::error::{KanbanError, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};
use tokio::fs;

/// Configuration for a seeded board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub title: String,
}

impl ColumnConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Board configuration, read from `config.toml` by the storage backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<ColumnConfig>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Default Board".to_string(),
            columns: vec![
                ColumnConfig::new("To Do"),
                ColumnConfig::new("In Progress"),
                ColumnConfig::new("Done"),
            ],
        }
    }
}

impl BoardConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BoardConfig =
            toml::from_str(contents).map_err(|e| KanbanError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| KanbanError::ConfigError(e.to_string()))
    }

    /// Loads the configuration file at `path`
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KanbanError::ConfigError(
                "board name must not be empty".to_string(),
            ));
        }
        if self.columns.is_empty() {
            return Err(KanbanError::ConfigError(
                "board must define at least one column".to_string(),
            ));
        }

        let mut titles = HashSet::new();
        for column in &self.columns {
            let title = column.title.trim();
            if title.is_empty() {
                return Err(KanbanError::ConfigError(
                    "column title must not be empty".to_string(),
                ));
            }
            if !titles.insert(title.to_lowercase()) {
                return Err(KanbanError::ConfigError(format!(
                    "duplicate column title '{}'",
                    title
                )));
            }
        }

        Ok(())
    }
}
