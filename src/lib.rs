// src/lib.rs
//
// Хранилище журналов (посещаемость, клиенты, посетители) поверх одной таблицы SQLite:
// добавление, список, поиск подстроки, очистка, выгрузка в CSV.

pub mod config;
pub mod db;

pub use config::{SchemaRef, StoreConfig};
pub use db::error::{Result, StoreError};
pub use db::export::{suggest_export_path, CsvMode, ExportTable};
pub use db::monitoring::gather_metrics;
pub use db::record::{FieldValues, Record};
pub use db::record_store::{RecordStore, SearchMode, AMOUNT_FIELD, NAME_FIELD};
pub use db::schema::{FieldDef, FieldKind, Schema, SchemaKind, TIMESTAMP_FORMAT};
