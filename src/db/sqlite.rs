use crate::db::models::User;
use crate::db::schema::USERS_INIT;
use crate::error::GatewayError;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use std::path::{Path, PathBuf};
use subtle::ConstantTimeEq;
use tracing::{debug, info};

/// Open a single connection to a SQLite file. No pooling: callers close it
/// when their operation is done.
pub async fn connect(path: &Path, create_if_missing: bool) -> Result<SqliteConnection, GatewayError> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing);
    let conn = SqliteConnection::connect_with(&opts).await?;
    Ok(conn)
}

/// Username/password store backed by `users.db`.
#[derive(Debug, Clone)]
pub struct UsersStorage {
    path: PathBuf,
}

impl UsersStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn open(&self) -> Result<SqliteConnection, GatewayError> {
        connect(&self.path, true).await
    }

    /// Create the file and table if absent and seed one account into an
    /// empty table. Safe to call on every startup.
    pub async fn initialize(&self, seed_username: &str, seed_password: &str) -> Result<(), GatewayError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut conn = self.open().await?;
        sqlx::query(USERS_INIT.trim()).execute(&mut conn).await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut conn)
            .await?;
        if count == 0 {
            sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
                .bind(seed_username)
                .bind(seed_password)
                .execute(&mut conn)
                .await?;
            info!(username = %seed_username, "seeded default user account");
        }
        conn.close().await?;
        Ok(())
    }

    /// Exact-match credential check. `None` when the username is unknown or
    /// the password differs.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Option<User>, GatewayError> {
        let mut conn = self.open().await?;
        let user: Option<User> =
            sqlx::query_as("SELECT id, username, password FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&mut conn)
                .await?;
        conn.close().await?;

        Ok(user.filter(|u| bool::from(u.password.as_bytes().ct_eq(password.as_bytes()))))
    }

    pub async fn insert(&self, username: &str, password: &str) -> Result<User, GatewayError> {
        let mut conn = self.open().await?;
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password)
            .execute(&mut conn)
            .await;
        conn.close().await?;

        match result {
            Ok(done) => {
                debug!(username, id = done.last_insert_rowid(), "user inserted");
                Ok(User {
                    id: done.last_insert_rowid(),
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                GatewayError::Conflict(format!("User {username} already exists")),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, username: &str) -> Result<(), GatewayError> {
        let mut conn = self.open().await?;
        let done = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        if done.rows_affected() == 0 {
            return Err(GatewayError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, UsersStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = UsersStorage::new(dir.path().join("nested").join("users.db"));
        storage.initialize("user", "password").await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn initialize_seeds_once() {
        let (_dir, storage) = storage().await;
        storage.initialize("other", "secret").await.unwrap();

        assert!(storage.verify("user", "password").await.unwrap().is_some());
        assert!(storage.verify("other", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let (_dir, storage) = storage().await;
        assert!(storage.verify("user", "nope").await.unwrap().is_none());
        assert!(storage.verify("ghost", "password").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_conflict() {
        let (_dir, storage) = storage().await;
        let alice = storage.insert("alice", "pw").await.unwrap();
        assert_eq!(alice.id, 2);

        let err = storage.insert("alice", "other").await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_then_verify_fails() {
        let (_dir, storage) = storage().await;
        storage.insert("bob", "pw").await.unwrap();
        storage.delete("bob").await.unwrap();

        assert!(storage.verify("bob", "pw").await.unwrap().is_none());
        let err = storage.delete("bob").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }
}
