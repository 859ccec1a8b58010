use serde_json::{Map, Value};
use sqlx::{Connection, Row, SqliteConnection};
use tracing::debug;

use crate::db::sqlite::connect;
use crate::db::values::{bind_all, row_to_json};
use crate::error::GatewayError;
use crate::service::registry::DatabaseRegistry;
use crate::service::sql::{self, RawSql, non_empty};

/// Schema and row operations against a named database file. Every call
/// opens its own connection and closes it before returning.
#[derive(Debug, Clone)]
pub struct SchemaGateway {
    registry: DatabaseRegistry,
}

fn require<'a, T: ?Sized>(value: Option<&'a T>, msg: &str) -> Result<&'a T, GatewayError>
where
    T: IsBlank,
{
    value
        .filter(|v| !v.is_blank())
        .ok_or_else(|| GatewayError::bad_request(msg))
}

/// Absent and empty inputs are rejected alike.
pub trait IsBlank {
    fn is_blank(&self) -> bool;
}

impl IsBlank for str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl IsBlank for RawSql {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl IsBlank for Map<String, Value> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl SchemaGateway {
    pub fn new(registry: DatabaseRegistry) -> Self {
        Self { registry }
    }

    async fn open(&self, db_name: &str) -> Result<SqliteConnection, GatewayError> {
        // Opening creates a missing file, as a plain SQLite connect would.
        connect(&self.registry.resolve(db_name), true).await
    }

    pub async fn list_tables(&self, db_name: Option<&str>) -> Result<Vec<String>, GatewayError> {
        let db_name = require(db_name, "Missing database name")?;
        let mut conn = self.open(db_name).await?;
        let names: Vec<String> = sqlx::query_scalar(sql::LIST_TABLES)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;
        Ok(names)
    }

    pub async fn list_columns(
        &self,
        db_name: Option<&str>,
        table: &RawSql,
    ) -> Result<Vec<String>, GatewayError> {
        let db_name = require(db_name, "Missing database name")?;
        let stmt = sql::table_info(table);
        let mut conn = self.open(db_name).await?;
        let rows = sqlx::query(&stmt).fetch_all(&mut conn).await?;
        conn.close().await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(GatewayError::from))
            .collect()
    }

    pub async fn create_table(
        &self,
        db_name: Option<&str>,
        table: Option<&RawSql>,
        columns: Option<&RawSql>,
    ) -> Result<(), GatewayError> {
        const MSG: &str = "Missing database name, table name or columns";
        let db_name = require(db_name, MSG)?;
        let table = require(table, MSG)?;
        let columns = require(columns, MSG)?;

        let stmt = sql::create_table(table, columns);
        debug!(db_name, sql = %stmt, "create table");
        let mut conn = self.open(db_name).await?;
        sqlx::query(&stmt).execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    /// `DROP TABLE IF EXISTS`: succeeds whether or not the table existed.
    pub async fn delete_table(&self, db_name: Option<&str>, table: &RawSql) -> Result<(), GatewayError> {
        let db_name = require(db_name, "Missing database name")?;
        let stmt = sql::drop_table(table);
        debug!(db_name, sql = %stmt, "drop table");
        let mut conn = self.open(db_name).await?;
        sqlx::query(&stmt).execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    /// Returns the rowid assigned to the new row.
    pub async fn insert_row(
        &self,
        db_name: Option<&str>,
        table: &RawSql,
        data: Option<&Map<String, Value>>,
    ) -> Result<i64, GatewayError> {
        const MSG: &str = "Missing database name or data";
        let db_name = require(db_name, MSG)?;
        let data = require(data, MSG)?;

        let stmt = sql::insert(table, data.keys().map(String::as_str));
        debug!(db_name, sql = %stmt, "insert row");
        let mut conn = self.open(db_name).await?;
        let done = bind_all(sqlx::query(&stmt), data)
            .execute(&mut conn)
            .await?;
        conn.close().await?;
        Ok(done.last_insert_rowid())
    }

    /// Rows come back as value arrays in column order.
    pub async fn get_rows(
        &self,
        db_name: Option<&str>,
        table: &RawSql,
        columns: Option<&RawSql>,
        filter: Option<&RawSql>,
    ) -> Result<Vec<Vec<Value>>, GatewayError> {
        let db_name = require(db_name, "Missing database name")?;
        let all = RawSql::trusted("*");
        let columns = non_empty(columns).unwrap_or(&all);

        let stmt = sql::select(table, columns, filter);
        debug!(db_name, sql = %stmt, "select rows");
        let mut conn = self.open(db_name).await?;
        let rows = sqlx::query(&stmt).fetch_all(&mut conn).await?;
        conn.close().await?;

        rows.iter()
            .map(|row| row_to_json(row).map_err(GatewayError::from))
            .collect()
    }

    /// Without a filter every row is updated. Returns the affected row count.
    pub async fn update_rows(
        &self,
        db_name: Option<&str>,
        table: &RawSql,
        data: Option<&Map<String, Value>>,
        filter: Option<&RawSql>,
    ) -> Result<u64, GatewayError> {
        const MSG: &str = "Missing database name or updates";
        let db_name = require(db_name, MSG)?;
        let data = require(data, MSG)?;

        let stmt = sql::update(table, data.keys().map(String::as_str), filter);
        debug!(db_name, sql = %stmt, "update rows");
        let mut conn = self.open(db_name).await?;
        let done = bind_all(sqlx::query(&stmt), data)
            .execute(&mut conn)
            .await?;
        conn.close().await?;
        Ok(done.rows_affected())
    }

    pub async fn delete_rows(
        &self,
        db_name: Option<&str>,
        table: &RawSql,
        filter: Option<&RawSql>,
    ) -> Result<u64, GatewayError> {
        const MSG: &str = "Missing database name or query";
        let db_name = require(db_name, MSG)?;
        let filter = require(filter, MSG)?;

        let stmt = sql::delete(table, filter);
        debug!(db_name, sql = %stmt, "delete rows");
        let mut conn = self.open(db_name).await?;
        let done = sqlx::query(&stmt).execute(&mut conn).await?;
        conn.close().await?;
        Ok(done.rows_affected())
    }
}
