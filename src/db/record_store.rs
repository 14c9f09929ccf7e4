// src/db/record_store.rs

use std::path::Path;

use log::{debug, info};
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::cache::CacheHandler;
use crate::db::error::{Result, StoreError};
use crate::db::export::ExportTable;
use crate::db::migrations::ensure_table;
use crate::db::monitoring::measure_db_operation;
use crate::db::record::{check_timestamp, normalize_input, parse_decimal, FieldValues, Record};
use crate::db::register_hooks;
use crate::db::schema::{quote_ident, FieldKind, Schema};

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Поле, по которому ищут и подписывают точки графика
pub const NAME_FIELD: &str = "name";
/// Единственное изменяемое поле предустановленных схем
pub const AMOUNT_FIELD: &str = "amount";

/// Как трактовать `%` и `_` в строке поиска.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// `LIKE '%pattern%'` как есть: `%` и `_` работают как шаблоны
    #[default]
    Like,
    /// Шаблонные символы экранируются, ищется буквальная подстрока
    Literal,
}

/// Хранилище одной таблицы. Владеет соединением целиком;
/// соединение закрывается в `close()` или при drop.
///
/// Все операции синхронные, каждая запись коммитится до возврата из метода.
pub struct RecordStore {
    conn: Connection,
    schema: Schema,
    cache: CacheHandler,
    search_mode: SearchMode,
    select_sql: String,
}

impl RecordStore {
    /// Открывает (или создаёт) файл БД и гарантирует наличие таблицы под схему.
    pub fn open<P: AsRef<Path>>(path: P, schema: Schema) -> Result<Self> {
        let path = path.as_ref();
        schema.validate()?;
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        let store = Self::from_connection(conn, schema, DEFAULT_CACHE_CAPACITY)?;
        info!("opened store '{}' at {}", store.schema.table, path.display());
        Ok(store)
    }

    pub fn open_in_memory(schema: Schema) -> Result<Self> {
        schema.validate()?;
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, schema, DEFAULT_CACHE_CAPACITY)
    }

    pub(crate) fn from_connection(conn: Connection, schema: Schema, cache_capacity: usize) -> Result<Self> {
        ensure_table(&conn, &schema)?;
        register_hooks(&conn);

        let select_sql = format!(
            "SELECT {} FROM {}",
            schema.select_list(),
            quote_ident(&schema.table)
        );
        Ok(Self {
            conn,
            schema,
            cache: CacheHandler::new(cache_capacity),
            search_mode: SearchMode::default(),
            select_sql,
        })
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = CacheHandler::new(capacity);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    /// Проверяет поля и добавляет запись; `id` выдаёт SQLite (AUTOINCREMENT).
    pub fn insert(&self, input: &FieldValues) -> Result<Record> {
        measure_db_operation("insert", || {
            let values = normalize_input(&self.schema, input)?;

            let mut stmt = self.conn.prepare_cached(&self.schema.insert_sql())?;
            stmt.execute(params_from_iter(values.iter()))?;
            let id = self.conn.last_insert_rowid();

            let record = Record {
                id,
                fields: self
                    .schema
                    .fields
                    .iter()
                    .zip(values)
                    .map(|(f, v)| (f.name.clone(), v.unwrap_or_default()))
                    .collect(),
            };
            self.cache.put_record(record.clone());
            info!("Added record {} to '{}': {}", id, self.schema.table, summary(&record));
            Ok(record)
        })
    }

    /// Все записи по возрастанию `id`
    pub fn list_all(&self) -> Result<Vec<Record>> {
        measure_db_operation("list_all", || {
            let sql = format!("{} ORDER BY \"id\" ASC", self.select_sql);
            self.query_records(&sql, [])
        })
    }

    /// Поиск подстроки в поле; пустой шаблон даёт пустой результат без запроса.
    pub fn search(&self, field: &str, pattern: &str) -> Result<Vec<Record>> {
        self.search_with(field, pattern, self.search_mode)
    }

    pub fn search_with(&self, field: &str, pattern: &str, mode: SearchMode) -> Result<Vec<Record>> {
        measure_db_operation("search", || {
            if self.schema.field(field).is_none() {
                return Err(StoreError::UnknownField(field.to_string()));
            }
            let pattern = pattern.trim();
            if pattern.is_empty() {
                return Ok(Vec::new());
            }

            let (like, escape) = match mode {
                SearchMode::Like => (format!("%{pattern}%"), ""),
                SearchMode::Literal => (format!("%{}%", escape_like(pattern)), " ESCAPE '\\'"),
            };
            let sql = format!(
                "{} WHERE {} LIKE ?1{} ORDER BY \"id\" ASC",
                self.select_sql,
                quote_ident(field),
                escape
            );
            let records = self.query_records(&sql, params![like])?;
            info!(
                "Searched '{}' for {:?} in {}: {} matches",
                self.schema.table,
                pattern,
                field,
                records.len()
            );
            Ok(records)
        })
    }

    pub fn get(&self, id: i64) -> Result<Record> {
        measure_db_operation("get", || {
            if let Some(record) = self.cache.get_record(id) {
                debug!("cache hit for id={}", id);
                return Ok(record);
            }
            let record = self.fetch(id)?.ok_or(StoreError::NotFound(id))?;
            self.cache.put_record(record.clone());
            Ok(record)
        })
    }

    /// Текст "View Details": заголовок и по строке `Label: value` на поле
    pub fn details(&self, id: i64) -> Result<String> {
        let record = self.get(id)?;
        let mut out = format!("Details for ID {}:", record.id);
        for (field, (_, value)) in self.schema.fields.iter().zip(&record.fields) {
            out.push('\n');
            out.push_str(&format!("{}: {}", field.label, value));
        }
        Ok(out)
    }

    pub fn count(&self) -> Result<i64> {
        measure_db_operation("count", || {
            let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(&self.schema.table));
            let n: i64 = self.conn.query_row(&sql, [], |r| r.get(0))?;
            Ok(n)
        })
    }

    /// Удаляет все записи. Счётчик `id` не сбрасывается.
    pub fn clear_all(&self) -> Result<usize> {
        measure_db_operation("clear_all", || {
            let sql = format!("DELETE FROM {}", quote_ident(&self.schema.table));
            let deleted = self.conn.execute(&sql, [])?;
            self.cache.clear();
            info!("All records cleared from '{}' ({} rows)", self.schema.table, deleted);
            Ok(deleted)
        })
    }

    /// Сумма числового поля по всем записям; 0 для пустой таблицы.
    pub fn sum(&self, field: &str) -> Result<f64> {
        measure_db_operation("sum", || {
            let total: f64 = self
                .decimal_column(field, "sum")?
                .into_iter()
                .map(|(_, v)| v)
                .sum();
            info!("Total {} over '{}': {}", field, self.schema.table, total);
            Ok(total)
        })
    }

    /// Пары (имя, число) для графика покупок
    pub fn amount_by_name(&self, field: &str) -> Result<Vec<(String, f64)>> {
        measure_db_operation("amount_by_name", || self.decimal_column(field, "amount_by_name"))
    }

    /// Заменяет значение изменяемого поля существующей записи.
    pub fn update_field(&self, id: i64, field: &str, value: &str) -> Result<Record> {
        measure_db_operation("update", || {
            let def = self
                .schema
                .field(field)
                .ok_or_else(|| StoreError::UnknownField(field.to_string()))?;
            if !def.mutable {
                return Err(StoreError::Unsupported {
                    operation: "update",
                    field: field.to_string(),
                });
            }

            let value = value.trim();
            let stored = match def.kind {
                FieldKind::Decimal => {
                    let amount = parse_decimal(field, value)?;
                    // как в диалоге правки: сумма не может быть отрицательной
                    if amount < 0.0 {
                        return Err(StoreError::InvalidField {
                            field: field.to_string(),
                            reason: format!("{value} is negative"),
                        });
                    }
                    format!("{amount:.2}")
                }
                FieldKind::Timestamp => {
                    check_timestamp(field, value)?;
                    value.to_string()
                }
                FieldKind::Text => value.to_string(),
            };
            if stored.is_empty() && def.required {
                return Err(StoreError::Validation {
                    missing_fields: vec![field.to_string()],
                });
            }

            let sql = format!(
                "UPDATE {} SET {} = ?1 WHERE \"id\" = ?2",
                quote_ident(&self.schema.table),
                quote_ident(field)
            );
            let changed = self.conn.execute(&sql, params![stored, id])?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }

            let record = self.fetch(id)?.ok_or(StoreError::NotFound(id))?;
            self.cache.put_record(record.clone());
            info!("Edited {} for id={}. New value: {}", field, id, stored);
            Ok(record)
        })
    }

    /// Правка суммы покупки (есть только у схемы с изменяемым полем `amount`)
    pub fn update_amount(&self, id: i64, new_amount: &str) -> Result<Record> {
        match self.schema.field(AMOUNT_FIELD) {
            Some(def) if def.mutable && def.kind == FieldKind::Decimal => {
                self.update_field(id, AMOUNT_FIELD, new_amount)
            }
            _ => Err(StoreError::Unsupported {
                operation: "update_amount",
                field: AMOUNT_FIELD.to_string(),
            }),
        }
    }

    /// Проекция для выгрузки: заголовок `id` + поля, строки в порядке `list_all`
    pub fn export_table(&self) -> Result<ExportTable> {
        let rows = self.list_all()?.iter().map(Record::to_row).collect();
        Ok(ExportTable {
            header: self.schema.column_names(),
            rows,
        })
    }

    /// Явно закрывает соединение и сообщает об ошибке закрытия
    pub fn close(self) -> Result<()> {
        let RecordStore { conn, schema, .. } = self;
        conn.close().map_err(|(_, e)| StoreError::from(e))?;
        info!("closed store '{}'", schema.table);
        Ok(())
    }

    // ---------------------- Внутренние функции ----------------------

    fn fetch(&self, id: i64) -> Result<Option<Record>> {
        let sql = format!("{} WHERE \"id\" = ?1", self.select_sql);
        let n = self.schema.fields.len();
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let record = stmt
            .query_row(params![id], |row| self.row_to_record(row, n))
            .optional()?;
        Ok(record)
    }

    fn query_records<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Record>> {
        let n = self.schema.fields.len();
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, |row| self.row_to_record(row, n))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn row_to_record(&self, row: &Row<'_>, n: usize) -> rusqlite::Result<Record> {
        let id: i64 = row.get(0)?;
        let mut fields = Vec::with_capacity(n);
        for (i, field) in self.schema.fields.iter().enumerate() {
            let value: Option<String> = row.get(i + 1)?;
            fields.push((field.name.clone(), value.unwrap_or_default()));
        }
        Ok(Record { id, fields })
    }

    /// Значения числового поля с подписью из `name` (или `id`, если поля `name` нет)
    fn decimal_column(&self, field: &str, operation: &'static str) -> Result<Vec<(String, f64)>> {
        let def = self
            .schema
            .field(field)
            .ok_or_else(|| StoreError::UnknownField(field.to_string()))?;
        if def.kind != FieldKind::Decimal {
            return Err(StoreError::Unsupported {
                operation,
                field: field.to_string(),
            });
        }

        let label = if self.schema.field(NAME_FIELD).is_some() {
            quote_ident(NAME_FIELD)
        } else {
            "\"id\"".to_string()
        };
        let sql = format!(
            "SELECT CAST({} AS TEXT), {} FROM {} ORDER BY \"id\" ASC",
            label,
            quote_ident(field),
            quote_ident(&self.schema.table)
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (name, value) = row?;
            // NULL у необязательного поля просто пропускаем
            if let Some(value) = value {
                out.push((name.unwrap_or_default(), parse_decimal(field, &value)?));
            }
        }
        Ok(out)
    }
}

fn summary(record: &Record) -> String {
    record
        .fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::export::CsvMode;
    use crate::db::schema::FieldDef;

    fn attendance(name: &str, ts: &str) -> FieldValues {
        FieldValues::new().with("name", name).with("timestamp", ts)
    }

    fn customer(name: &str, amount: &str) -> FieldValues {
        FieldValues::new()
            .with("name", name)
            .with("contact", "555-0100")
            .with("item", "Coffee")
            .with("amount", amount)
    }

    #[test]
    fn test_insert_assigns_sequential_ids() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::attendance())?;

        let first = store.insert(&attendance("  Alice ", "2024-01-01 09:00:00"))?;
        assert_eq!(first.id, 1);
        assert_eq!(first.get("name"), Some("Alice"));

        let second = store.insert(&attendance("Bob", "2024-01-01 09:05:00"))?;
        assert_eq!(second.id, 2);

        let all = store.list_all()?;
        assert_eq!(all, vec![first, second]);
        Ok(())
    }

    #[test]
    fn test_invalid_insert_writes_nothing() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::visitor())?;
        let input = FieldValues::new()
            .with("name", "Carol")
            .with("mobile", " ")
            .with("timestamp", "2024-02-02 10:00:00");

        let err = store.insert(&input).unwrap_err();
        match err {
            StoreError::Validation { missing_fields } => {
                assert_eq!(missing_fields, vec!["mobile", "reason"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.list_all()?.is_empty());
        assert_eq!(store.count()?, 0);
        Ok(())
    }

    #[test]
    fn test_search_example_scenario() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::attendance())?;
        store.insert(&attendance("Alice", "2024-01-01 09:00:00"))?;
        store.insert(&attendance("Bob", "2024-01-01 09:05:00"))?;

        let found = store.search("name", "ali")?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
        assert_eq!(found[0].get("name"), Some("Alice"));

        assert!(store.search("name", "")?.is_empty());
        assert!(store.search("name", "   ")?.is_empty());

        store.clear_all()?;
        assert!(store.list_all()?.is_empty());

        let carl = store.insert(&attendance("Carl", "2024-01-01 10:00:00"))?;
        assert_eq!(carl.id, 3);
        Ok(())
    }

    #[test]
    fn test_search_is_subset_of_list_in_id_order() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::attendance())?;
        for name in ["Anna", "Hannah", "Bob", "Joanna", "anne"] {
            store.insert(&attendance(name, "2024-03-03 08:00:00"))?;
        }

        let expected: Vec<Record> = store
            .list_all()?
            .into_iter()
            .filter(|r| r.get("name").unwrap_or("").to_lowercase().contains("ann"))
            .collect();
        let found = store.search("name", "ann")?;
        assert_eq!(found, expected);
        assert!(found.windows(2).all(|w| w[0].id < w[1].id));
        Ok(())
    }

    #[test]
    fn test_like_wildcards_versus_literal() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::attendance())?;
        store.insert(&attendance("100% Pure", "2024-01-01 09:00:00"))?;
        store.insert(&attendance("Bob", "2024-01-01 09:00:00"))?;
        store.insert(&attendance("a_b", "2024-01-01 09:00:00"))?;

        // `_` совпадает с любым символом, `%` с любой строкой
        assert_eq!(store.search("name", "_")?.len(), 3);
        assert_eq!(store.search("name", "%")?.len(), 3);

        assert_eq!(store.search_with("name", "%", SearchMode::Literal)?.len(), 1);
        let underscored = store.search_with("name", "_", SearchMode::Literal)?;
        assert_eq!(underscored.len(), 1);
        assert_eq!(underscored[0].get("name"), Some("a_b"));

        let literal = store.with_search_mode(SearchMode::Literal);
        assert_eq!(literal.search("name", "0%")?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_search_unknown_field() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::attendance())?;
        let err = store.search("email", "x").unwrap_err();
        assert!(matches!(err, StoreError::UnknownField(f) if f == "email"));
        Ok(())
    }

    #[test]
    fn test_clear_does_not_reset_ids() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        for i in 0..5 {
            store.insert(&customer(&format!("User {i}"), "1.00"))?;
        }
        assert_eq!(store.clear_all()?, 5);
        assert_eq!(store.count()?, 0);
        assert!(matches!(store.get(5), Err(StoreError::NotFound(5))));

        let next = store.insert(&customer("Fresh", "2.00"))?;
        assert_eq!(next.id, 6);
        Ok(())
    }

    #[test]
    fn test_customer_sum() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        assert_eq!(store.sum("amount")?, 0.0);

        store.insert(&customer("A", "10.00"))?;
        store.insert(&customer("B", "20.50"))?;
        store.insert(&customer("C", "5.25"))?;
        assert_eq!(store.sum("amount")?, 35.75);
        Ok(())
    }

    #[test]
    fn test_sum_fails_on_non_numeric_value() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        store.insert(&customer("A", "10.00"))?;
        store.insert(&customer("B", "a lot"))?;

        let err = store.sum("amount").unwrap_err();
        assert!(matches!(err, StoreError::NumericParse { value, .. } if value == "a lot"));
        Ok(())
    }

    #[test]
    fn test_sum_requires_decimal_field() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        assert!(matches!(store.sum("item"), Err(StoreError::Unsupported { .. })));
        assert!(matches!(store.sum("price"), Err(StoreError::UnknownField(_))));
        Ok(())
    }

    #[test]
    fn test_amount_by_name() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        store.insert(&customer("A", "10"))?;
        store.insert(&customer("B", "2.5"))?;
        assert_eq!(
            store.amount_by_name("amount")?,
            vec![("A".to_string(), 10.0), ("B".to_string(), 2.5)]
        );
        Ok(())
    }

    #[test]
    fn test_update_amount() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        let rec = store.insert(&customer("A", "10.00"))?;
        // прогреваем кэш, чтобы проверить, что правка его обновляет
        store.get(rec.id)?;

        let updated = store.update_amount(rec.id, " 12.5 ")?;
        assert_eq!(updated.get("amount"), Some("12.50"));
        assert_eq!(store.get(rec.id)?.get("amount"), Some("12.50"));
        assert_eq!(store.sum("amount")?, 12.5);

        assert!(matches!(store.update_amount(99, "1"), Err(StoreError::NotFound(99))));
        assert!(matches!(
            store.update_amount(rec.id, "twelve"),
            Err(StoreError::NumericParse { .. })
        ));
        assert_eq!(store.get(rec.id)?.get("amount"), Some("12.50"));
        Ok(())
    }

    #[test]
    fn test_update_amount_rejects_negative() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        let rec = store.insert(&customer("A", "10.00"))?;

        let err = store.update_amount(rec.id, "-5").unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field, .. } if field == "amount"));
        assert_eq!(store.get(rec.id)?.get("amount"), Some("10.00"));

        assert_eq!(store.update_amount(rec.id, "0")?.get("amount"), Some("0.00"));
        Ok(())
    }

    #[test]
    fn test_update_is_optional_capability() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::attendance())?;
        let rec = store.insert(&attendance("Alice", "2024-01-01 09:00:00"))?;

        assert!(matches!(
            store.update_amount(rec.id, "1"),
            Err(StoreError::Unsupported { operation: "update_amount", .. })
        ));
        assert!(matches!(
            store.update_field(rec.id, "name", "Alicia"),
            Err(StoreError::Unsupported { operation: "update", .. })
        ));
        assert_eq!(store.get(rec.id)?.get("name"), Some("Alice"));
        Ok(())
    }

    #[test]
    fn test_details() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::visitor())?;
        let input = FieldValues::new()
            .with("name", "Dana")
            .with("mobile", "0700")
            .with("timestamp", "2024-05-05 12:30:00")
            .with("reason", "Delivery");
        let rec = store.insert(&input)?;

        assert_eq!(
            store.details(rec.id)?,
            "Details for ID 1:\nName: Dana\nMobile: 0700\nTimestamp: 2024-05-05 12:30:00\nReason: Delivery"
        );
        assert!(matches!(store.details(42), Err(StoreError::NotFound(42))));
        Ok(())
    }

    #[test]
    fn test_export_table_matches_list() -> Result<()> {
        let store = RecordStore::open_in_memory(Schema::customer())?;
        store.insert(&customer("A", "10.00"))?;
        store.insert(&customer("B, Jr.", "20.50"))?;

        let table = store.export_table()?;
        assert_eq!(table.header.len(), store.schema().fields.len() + 1);
        assert_eq!(table.header, vec!["id", "name", "contact", "item", "amount"]);

        let listed: Vec<Vec<String>> = store.list_all()?.iter().map(Record::to_row).collect();
        assert_eq!(table.rows, listed);

        assert_eq!(
            table.to_csv(CsvMode::Raw),
            "id,name,contact,item,amount\n1,A,555-0100,Coffee,10.00\n2,B, Jr.,555-0100,Coffee,20.50\n"
        );
        Ok(())
    }

    #[test]
    fn test_optional_fields_read_back_empty() -> Result<()> {
        let schema = Schema::new(
            "badges",
            vec![
                FieldDef::new("name", "Name", FieldKind::Text),
                FieldDef::new("note", "Note", FieldKind::Text).optional(),
            ],
        )?;
        let store = RecordStore::open_in_memory(schema)?;
        store.insert(&FieldValues::new().with("name", "Eve"))?;

        let all = store.list_all()?;
        assert_eq!(all[0].get("note"), Some(""));
        assert_eq!(store.export_table()?.rows[0], vec!["1", "Eve", ""]);
        Ok(())
    }

    #[test]
    fn test_reopen_file_keeps_records_and_counter() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.db");

        let store = RecordStore::open(&path, Schema::attendance())?;
        store.insert(&attendance("Alice", "2024-01-01 09:00:00"))?;
        store.insert(&attendance("Bob", "2024-01-01 09:05:00"))?;
        store.clear_all()?;
        store.insert(&attendance("Carl", "2024-01-01 10:00:00"))?;
        store.close()?;

        let store = RecordStore::open(&path, Schema::attendance())?;
        let all = store.list_all()?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 3);
        assert_eq!(store.insert(&attendance("Dan", "2024-01-01 11:00:00"))?.id, 4);
        Ok(())
    }

    #[test]
    fn test_open_with_other_schema_fails() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        RecordStore::open(&path, Schema::attendance())?.close()?;

        let mut other = Schema::visitor();
        other.table = "attendance".to_string();
        let err = RecordStore::open(&path, other).err().unwrap();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
        Ok(())
    }

    #[test]
    fn test_open_unavailable_storage() {
        let dir = tempfile::tempdir().unwrap();

        let missing_dir = dir.path().join("missing").join("x.db");
        let err = RecordStore::open(&missing_dir, Schema::attendance()).err().unwrap();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));

        let corrupt = dir.path().join("corrupt.db");
        std::fs::write(&corrupt, vec![b'x'; 4096]).unwrap();
        let err = RecordStore::open(&corrupt, Schema::attendance()).err().unwrap();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
