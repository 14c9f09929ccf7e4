// src/db/migrations.rs

use log::{debug, info};
use rusqlite::{params, Connection};

use crate::db::error::{Result, StoreError};
use crate::db::schema::Schema;

/// Версия формата файла, ставится в `PRAGMA user_version` на свежей БД
pub const LATEST_SCHEMA_VERSION: i32 = 1;

/// Создаёт таблицу, если её нет, и проверяет, что набор колонок ровно тот, что в схеме.
/// Повторный вызов с той же схемой ничего не меняет.
pub fn ensure_table(conn: &Connection, schema: &Schema) -> Result<()> {
    // Узнаём текущую версию (заодно проверяем, что файл вообще является БД)
    let ver: i32 = conn.query_row("PRAGMA user_version;", [], |r| r.get(0))?;

    let existing = table_columns(conn, &schema.table)?;
    if existing.is_empty() {
        conn.execute_batch(&schema.create_table_sql())?;
        info!("created table '{}'", schema.table);
    } else {
        let expected = schema.column_names();
        if existing != expected {
            return Err(StoreError::SchemaMismatch {
                table: schema.table.clone(),
                expected,
                found: existing,
            });
        }
        debug!("table '{}' already exists", schema.table);
    }

    if ver < LATEST_SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {LATEST_SCHEMA_VERSION};"))?;
    }

    Ok(())
}

/// Колонки таблицы в порядке объявления; пустой вектор, если таблицы нет
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}
