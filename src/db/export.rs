// src/db/export.rs

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::db::error::{Result, StoreError};

/// Как склеивать значения в строку CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvMode {
    /// Голый `join(",")` без кавычек, совместимо со старыми выгрузками.
    /// Значение с запятой или переводом строки ломает файл.
    #[default]
    Raw,
    /// Значения с `,` `"` CR/LF берутся в кавычки, `"` удваивается
    Quoted,
}

/// Табличная проекция: заголовок (`id` + поля) и строки в порядке `list_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn to_csv(&self, mode: CsvMode) -> String {
        let mut out = String::new();
        push_line(&mut out, &self.header, mode);
        for row in &self.rows {
            push_line(&mut out, row, mode);
        }
        out
    }

    pub fn write_csv(&self, path: &Path, mode: CsvMode) -> Result<()> {
        fs::write(path, self.to_csv(mode)).map_err(|source| StoreError::ExportWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Exported {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

fn push_line(out: &mut String, values: &[String], mode: CsvMode) {
    let line = match mode {
        CsvMode::Raw => values.join(","),
        CsvMode::Quoted => values
            .iter()
            .map(|v| csv_escape(v))
            .collect::<Vec<_>>()
            .join(","),
    };
    out.push_str(&line);
    out.push('\n');
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Имя файла по умолчанию: добавляем `.csv`, если расширения нет.
/// Это только подсказка, путь от пользователя не проверяется.
pub fn suggest_export_path(stem: &str) -> PathBuf {
    let stem = stem.trim();
    let stem = if stem.is_empty() { "export" } else { stem };
    if stem.to_lowercase().ends_with(".csv") {
        PathBuf::from(stem)
    } else {
        PathBuf::from(format!("{stem}.csv"))
    }
}
