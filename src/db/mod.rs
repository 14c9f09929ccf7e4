// src/db/mod.rs
//
// Здесь:
// 1) подключаем модули хранилища
// 2) регистрируем hooks на соединении (трассировка изменений строк)

pub mod cache;
pub mod error;
pub mod export;
pub mod migrations;
pub mod monitoring;
pub mod record;
pub mod record_store;
pub mod schema;

use log::trace;
use rusqlite::{hooks::Action, Connection};

pub use error::{Result, StoreError};

/// Вешаем update_hook: каждое INSERT/UPDATE/DELETE пишется в лог на уровне trace.
pub fn register_hooks(conn: &Connection) {
    conn.update_hook(Some(|action: Action, db: &str, table: &str, rowid: i64| {
        let action = match action {
            Action::SQLITE_DELETE => "Delete",
            Action::SQLITE_INSERT => "Insert",
            Action::SQLITE_UPDATE => "Update",
            _ => "Unknown",
        };
        trace!("::HOOK:: {action} on table '{table}' in DB '{db}', rowid: {rowid}");
    }));
}
