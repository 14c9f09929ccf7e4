// src/db/record.rs

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::db::error::{Result, StoreError};
use crate::db::schema::{FieldKind, Schema, ID_COLUMN, TIMESTAMP_FORMAT};

/// Одна строка таблицы: `id`, выданный хранилищем, и значения полей в порядке схемы.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub fields: Vec<(String, String)>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Строка для табличного вывода: `id` и затем значения как текст
    pub fn to_row(&self) -> Vec<String> {
        std::iter::once(self.id.to_string())
            .chain(self.fields.iter().map(|(_, v)| v.clone()))
            .collect()
    }
}

// Ключи в JSON идут в порядке схемы, а не по алфавиту
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_COLUMN, &self.id)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Входные значения для `insert`: имя поля -> текст.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(HashMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Разбирает `field=value`, как это приходит из командной строки
    pub fn parse_assignment(&mut self, assignment: &str) -> Result<()> {
        let (field, value) = assignment.split_once('=').ok_or_else(|| StoreError::InvalidField {
            field: assignment.to_string(),
            reason: "expected FIELD=VALUE".to_string(),
        })?;
        self.set(field.trim(), value);
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Проверяет входные значения по схеме и возвращает их в порядке колонок.
///
/// Значения обрезаются по краям. Отсутствующее необязательное поле даёт `None` (NULL в БД).
/// При любой ошибке ничего не пишется: вызывающий получает ошибку до INSERT.
pub fn normalize_input(schema: &Schema, input: &FieldValues) -> Result<Vec<Option<String>>> {
    let mut unknown: Vec<&String> = input.0.keys().filter(|k| schema.field(k).is_none()).collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(StoreError::UnknownField(unknown[0].clone()));
    }

    let mut missing = Vec::new();
    let mut values = Vec::with_capacity(schema.fields.len());

    for field in &schema.fields {
        let value = input
            .get(&field.name)
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if value.is_none() && field.required {
            missing.push(field.name.clone());
        }
        values.push(value);
    }

    // пустые обязательные поля важнее формата: сначала сообщаем о них
    if !missing.is_empty() {
        return Err(StoreError::Validation {
            missing_fields: missing,
        });
    }

    for (field, value) in schema.fields.iter().zip(&values) {
        if let (FieldKind::Timestamp, Some(v)) = (field.kind, value) {
            check_timestamp(&field.name, v)?;
        }
    }
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

pub fn check_timestamp(field: &str, value: &str) -> Result<()> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|_| ())
        .map_err(|e| StoreError::InvalidField {
            field: field.to_string(),
            reason: format!("expected YYYY-MM-DD HH:MM:SS ({e})"),
        })
}

/// Разбор текстового числа для арифметики (sum, графики, правка суммы)
pub fn parse_decimal(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StoreError::NumericParse {
            field: field.to_string(),
            value: value.to_string(),
        })
}
