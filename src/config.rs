// src/config.rs

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::db::error::{Result, StoreError};
use crate::db::export::CsvMode;
use crate::db::record_store::{RecordStore, SearchMode, DEFAULT_CACHE_CAPACITY};
use crate::db::schema::{Schema, SchemaKind};

/// Схема в конфиге: либо имя пресета, либо полное описание
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Preset(SchemaKind),
    Custom(Schema),
}

impl SchemaRef {
    pub fn resolve(&self) -> Schema {
        match self {
            SchemaRef::Preset(kind) => kind.schema(),
            SchemaRef::Custom(schema) => schema.clone(),
        }
    }
}

/// Настройки хранилища, читаются из JSON.
///
/// ```json
/// { "db_path": "customers.db", "schema": "customer", "csv_mode": "quoted" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub schema: SchemaRef,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default)]
    pub csv_mode: CsvMode,
    #[serde(default)]
    pub search_mode: SearchMode,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl StoreConfig {
    /// Настройки по умолчанию для одного из трёх журналов
    pub fn for_preset(kind: SchemaKind) -> Self {
        Self {
            db_path: PathBuf::from(kind.default_db_file()),
            schema: SchemaRef::Preset(kind),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            csv_mode: CsvMode::default(),
            search_mode: SearchMode::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: StoreConfig =
            serde_json::from_str(json).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_json_str(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(StoreError::Config("cache_capacity must be > 0".to_string()));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(StoreError::Config("db_path is empty".to_string()));
        }
        self.schema
            .resolve()
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Открывает хранилище по этим настройкам
    pub fn open_store(&self) -> Result<RecordStore> {
        self.validate()?;
        let store = RecordStore::open(&self.db_path, self.schema.resolve())?
            .with_cache_capacity(self.cache_capacity)
            .with_search_mode(self.search_mode);
        Ok(store)
    }
}
