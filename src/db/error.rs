// src/db/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Все ошибки хранилища записей.
///
/// Хранилище никогда не повторяет операцию само и не глотает ошибки записи:
/// любая ошибка возвращается вызывающему, операция при этом не выполнена.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Файл БД нельзя открыть/создать/записать (права, битый файл и т.д.)
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("table '{table}' has columns [{}], expected [{}]", found.join(", "), expected.join(", "))]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Обязательные поля пустые (после trim) или отсутствуют
    #[error("missing required fields: {}", missing_fields.join(", "))]
    Validation { missing_fields: Vec<String> },

    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("no record with id={0}")]
    NotFound(i64),

    #[error("value {value:?} of field '{field}' is not a number")]
    NumericParse { field: String, value: String },

    #[error("{operation} is not supported for field '{field}'")]
    Unsupported {
        operation: &'static str,
        field: String,
    },

    #[error("cannot write export to {}: {source}", path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl StoreError {
    /// Ошибки, после которых вызывающий может переспросить пользователя и повторить.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            StoreError::StorageUnavailable(_)
                | StoreError::SchemaMismatch { .. }
                | StoreError::InvalidSchema(_)
        )
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
