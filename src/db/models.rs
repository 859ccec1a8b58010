use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `users` table. Passwords are stored as given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}
