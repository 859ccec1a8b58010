use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub msg: String,
    pub last_id: i64,
}

/// Update/delete outcome. Zero affected rows is still a success.
#[derive(Debug, Serialize)]
pub struct RowsAffectedResponse {
    pub msg: String,
    pub rows_affected: u64,
}
