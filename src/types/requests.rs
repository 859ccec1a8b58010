use serde::Deserialize;
use serde_json::{Map, Value};

use crate::service::sql::RawSql;

/// Body of `/user/login` and `/user/register`. Absent fields stay `None`.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `db_name` as a JSON body field or query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct DbNameParams {
    pub db_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTableRequest {
    pub db_name: Option<String>,
    pub table_name: Option<RawSql>,
    /// Column definitions, e.g. `id INTEGER PRIMARY KEY, v TEXT`.
    pub columns: Option<RawSql>,
}

/// Body of `POST /data/{table}` and `PUT /data/{table}`.
#[derive(Debug, Default, Deserialize)]
pub struct RowWriteRequest {
    pub db_name: Option<String>,
    pub data: Option<Map<String, Value>>,
}

/// Query string of `GET` and `DELETE /data/{table}`.
#[derive(Debug, Default, Deserialize)]
pub struct RowQueryParams {
    pub db_name: Option<String>,
    /// WHERE clause without the keyword.
    pub query: Option<RawSql>,
    pub columns: Option<RawSql>,
}

/// Query string of `PUT /data/{table}`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub query: Option<RawSql>,
}
