//! Conversion between JSON request values and SQLite cells for tables whose
//! shape is only known at runtime.

use base64::Engine;
use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Bind every value of `data` in key order.
pub fn bind_all<'q>(query: SqliteQuery<'q>, data: &Map<String, Value>) -> SqliteQuery<'q> {
    data.values().fold(query, bind_json)
}

/// Bind one JSON value as a positional parameter.
/// Arrays and objects are stored as their JSON text.
pub fn bind_json<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// Decode a row into its values, in column order.
pub fn row_to_json(row: &SqliteRow) -> Result<Vec<Value>, sqlx::Error> {
    (0..row.len()).map(|idx| cell_to_json(row, idx)).collect()
}

fn cell_to_json(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    // Storage class of the value itself, not the declared column type.
    let storage_class = raw.type_info().name().to_ascii_uppercase();

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(idx)?),
        "REAL" | "NUMERIC" => {
            let f = row.try_get_unchecked::<f64, _>(idx)?;
            serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
            Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        _ => Value::String(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::{Connection, SqliteConnection};

    #[tokio::test]
    async fn values_round_trip_through_sqlite() {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (i INTEGER, r REAL, s TEXT, b BLOB, n TEXT, j TEXT, flag INTEGER)")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (b) VALUES (x'0102')")
            .execute(&mut conn)
            .await
            .unwrap();

        let data = json!({"i": 7, "r": 1.5, "s": "a", "n": null, "j": {"k": [1]}, "flag": true});
        let data = data.as_object().unwrap();
        let query = sqlx::query("INSERT INTO t (i, r, s, n, j, flag) VALUES (?, ?, ?, ?, ?, ?)");
        bind_all(query, data).execute(&mut conn).await.unwrap();

        let rows = sqlx::query("SELECT i, r, s, b, n, j, flag FROM t ORDER BY rowid")
            .fetch_all(&mut conn)
            .await
            .unwrap();
        let decoded: Vec<Vec<Value>> = rows.iter().map(|r| row_to_json(r).unwrap()).collect();

        assert_eq!(decoded[0], vec![Value::Null, Value::Null, Value::Null, json!("AQI="), Value::Null, Value::Null, Value::Null]);
        assert_eq!(decoded[1], vec![json!(7), json!(1.5), json!("a"), Value::Null, Value::Null, json!(r#"{"k":[1]}"#), json!(1)]);
    }
}
