// src/db/schema.rs

use serde::{Deserialize, Serialize};

use crate::db::error::{Result, StoreError};

/// Формат временных меток (как у DateTime picker в исходных формах)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Колонка первичного ключа, есть в каждой таблице
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    /// Текст в формате `YYYY-MM-DD HH:MM:SS`
    Timestamp,
    /// Число, хранящееся как текст
    Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub required: bool,
    /// Разрешено ли менять значение после вставки (только customer.amount)
    #[serde(default)]
    pub mutable: bool,
}

fn default_true() -> bool {
    true
}

impl FieldDef {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: true,
            mutable: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }
}

/// Предустановленные схемы трёх исходных журналов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Attendance,
    Customer,
    Visitor,
}

impl SchemaKind {
    pub fn schema(self) -> Schema {
        match self {
            SchemaKind::Attendance => Schema::attendance(),
            SchemaKind::Customer => Schema::customer(),
            SchemaKind::Visitor => Schema::visitor(),
        }
    }

    pub fn default_db_file(self) -> &'static str {
        match self {
            SchemaKind::Attendance => "attendance.db",
            SchemaKind::Customer => "customers.db",
            SchemaKind::Visitor => "visitors.db",
        }
    }
}

/// Фиксированный упорядоченный набор полей одной таблицы.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub table: String,
    pub fields: Vec<FieldDef>,
}

impl Schema {
    /// Собирает схему и сразу проверяет имена (они подставляются в SQL).
    pub fn new(table: &str, fields: Vec<FieldDef>) -> Result<Self> {
        let schema = Self {
            table: table.to_string(),
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub fn attendance() -> Self {
        Self {
            table: "attendance".to_string(),
            fields: vec![
                FieldDef::new("name", "Name", FieldKind::Text),
                FieldDef::new("timestamp", "Timestamp", FieldKind::Timestamp),
            ],
        }
    }

    pub fn customer() -> Self {
        Self {
            table: "customers".to_string(),
            fields: vec![
                FieldDef::new("name", "Name", FieldKind::Text),
                FieldDef::new("contact", "Contact", FieldKind::Text),
                FieldDef::new("item", "Item", FieldKind::Text),
                FieldDef::new("amount", "Amount", FieldKind::Decimal).mutable(),
            ],
        }
    }

    pub fn visitor() -> Self {
        Self {
            table: "visitors".to_string(),
            fields: vec![
                FieldDef::new("name", "Name", FieldKind::Text),
                FieldDef::new("mobile", "Mobile", FieldKind::Text),
                FieldDef::new("timestamp", "Timestamp", FieldKind::Timestamp),
                FieldDef::new("reason", "Reason", FieldKind::Text),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.table) {
            return Err(StoreError::InvalidSchema(format!(
                "table name '{}' is not a plain identifier",
                self.table
            )));
        }
        if self.fields.is_empty() {
            return Err(StoreError::InvalidSchema(format!(
                "table '{}' declares no fields",
                self.table
            )));
        }
        for (i, field) in self.fields.iter().enumerate() {
            if !is_identifier(&field.name) {
                return Err(StoreError::InvalidSchema(format!(
                    "field name '{}' is not a plain identifier",
                    field.name
                )));
            }
            if field.name.eq_ignore_ascii_case(ID_COLUMN) {
                return Err(StoreError::InvalidSchema(
                    "field name 'id' is reserved".to_string(),
                ));
            }
            // SQLite не различает регистр в именах колонок
            if self.fields[..i]
                .iter()
                .any(|f| f.name.eq_ignore_ascii_case(&field.name))
            {
                return Err(StoreError::InvalidSchema(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Ожидаемый набор колонок таблицы: `id` + поля
    pub fn column_names(&self) -> Vec<String> {
        std::iter::once(ID_COLUMN.to_string())
            .chain(self.fields.iter().map(|f| f.name.clone()))
            .collect()
    }

    /// `"id", "name", ...` для SELECT
    pub fn select_list(&self) -> String {
        self.column_names()
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn create_table_sql(&self) -> String {
        let mut columns = vec![format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT",
            quote_ident(ID_COLUMN)
        )];
        for field in &self.fields {
            let null = if field.required { " NOT NULL" } else { "" };
            columns.push(format!("{} TEXT{}", quote_ident(&field.name), null));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            quote_ident(&self.table),
            columns.join(",\n    ")
        )
    }

    pub fn insert_sql(&self) -> String {
        let names = self
            .fields
            .iter()
            .map(|f| quote_ident(&f.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.fields.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({names}) VALUES ({placeholders})",
            quote_ident(&self.table)
        )
    }
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Имена уже проверены `is_identifier`, кавычки защищают от ключевых слов
pub fn quote_ident(name: &str) -> String {
    format!("\"{name}\"")
}
