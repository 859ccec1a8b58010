//! SQL text assembly for caller-defined tables.
//!
//! Table names, column lists, column definitions, data keys and WHERE clauses
//! arrive from the request and are spliced into statements verbatim. They all
//! travel as [`RawSql`] so every place that does this is visible in one type.
//! Only row values are bound as parameters.

use serde::Deserialize;
use std::fmt;

/// Caller-supplied SQL text inserted into a statement without escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RawSql(String);

impl RawSql {
    pub fn trusted(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RawSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawSql {
    fn from(s: &str) -> Self {
        Self::trusted(s)
    }
}

impl From<String> for RawSql {
    fn from(s: String) -> Self {
        Self::trusted(s)
    }
}

/// Empty or absent fragments are treated the same way.
pub fn non_empty(fragment: Option<&RawSql>) -> Option<&RawSql> {
    fragment.filter(|f| !f.is_empty())
}

pub const LIST_TABLES: &str = "SELECT name FROM sqlite_master WHERE type='table'";

pub fn table_info(table: &RawSql) -> String {
    format!("PRAGMA table_info({table})")
}

pub fn create_table(table: &RawSql, columns: &RawSql) -> String {
    format!("CREATE TABLE IF NOT EXISTS {table} ({columns})")
}

pub fn drop_table(table: &RawSql) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

pub fn insert<'a, I>(table: &RawSql, keys: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: Vec<&str> = keys.into_iter().collect();
    let placeholders = vec!["?"; keys.len()].join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        keys.join(", ")
    )
}

pub fn select(table: &RawSql, columns: &RawSql, filter: Option<&RawSql>) -> String {
    let mut sql = format!("SELECT {columns} FROM {table}");
    push_where(&mut sql, filter);
    sql
}

pub fn update<'a, I>(table: &RawSql, keys: I, filter: Option<&RawSql>) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let assignments: Vec<String> = keys.into_iter().map(|k| format!("{k} = ?")).collect();
    let mut sql = format!("UPDATE {table} SET {}", assignments.join(", "));
    push_where(&mut sql, filter);
    sql
}

pub fn delete(table: &RawSql, filter: &RawSql) -> String {
    format!("DELETE FROM {table} WHERE {filter}")
}

fn push_where(sql: &mut String, filter: Option<&RawSql>) {
    if let Some(filter) = non_empty(filter) {
        sql.push_str(" WHERE ");
        sql.push_str(filter.as_str());
    }
}
