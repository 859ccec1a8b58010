use std::path::PathBuf;

use sqlx::Connection;
use tracing::info;

use crate::config::DB_EXTENSION;
use crate::db::sqlite::connect;
use crate::error::GatewayError;
use crate::service::archive;

/// A file received through `/database/upload`, already read into memory.
#[derive(Debug, Default)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Raw fields of an upload request before validation.
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,
    pub db_name: Option<String>,
    pub force: bool,
}

/// Maps database names to `{data_dir}/{name}.db` files.
#[derive(Debug, Clone)]
pub struct DatabaseRegistry {
    data_dir: PathBuf,
}

impl DatabaseRegistry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Deterministic name -> path mapping. The file may not exist.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.{DB_EXTENSION}"))
    }

    fn archive_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.zip"))
    }

    pub async fn create(&self, name: &str) -> Result<PathBuf, GatewayError> {
        if name.is_empty() {
            return Err(GatewayError::bad_request("Missing database name"));
        }
        let path = self.resolve(name);
        if tokio::fs::try_exists(&path).await? {
            return Err(GatewayError::Conflict("Database already exists".to_string()));
        }

        let conn = connect(&path, true).await?;
        conn.close().await?;
        info!(db_name = %name, path = %path.display(), "database created");
        Ok(path)
    }

    pub async fn upload(&self, req: UploadRequest) -> Result<PathBuf, GatewayError> {
        let file = req
            .file
            .ok_or_else(|| GatewayError::bad_request("No file part"))?;
        if file.filename.is_empty() {
            return Err(GatewayError::bad_request("No selected file"));
        }
        if !allowed_file(&file.filename) {
            return Err(GatewayError::bad_request("File type not allowed"));
        }
        let db_name = req
            .db_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| GatewayError::bad_request("Missing database name"))?;

        let path = self.resolve(&db_name);
        if !req.force && tokio::fs::try_exists(&path).await? {
            return Err(GatewayError::Conflict(
                "Database already exists. Use force option to overwrite.".to_string(),
            ));
        }

        tokio::fs::write(&path, &file.bytes).await?;
        info!(
            db_name = %db_name,
            size = file.bytes.len(),
            overwrite = req.force,
            "database uploaded"
        );
        Ok(path)
    }

    /// Zip the database file; the archive is also left at `{name}.zip`.
    pub async fn download(&self, name: &str) -> Result<Vec<u8>, GatewayError> {
        if name.is_empty() {
            return Err(GatewayError::bad_request("Missing database name"));
        }
        let path = self.resolve(name);
        if !tokio::fs::try_exists(&path).await? {
            return Err(GatewayError::NotFound(format!("Database {name} not found")));
        }
        archive::zip_to_file(path, self.archive_path(name)).await
    }
}

/// Only `.db` files are accepted, extension compared case-insensitively.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(DB_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, filename: &str, bytes: &[u8], force: bool) -> UploadRequest {
        UploadRequest {
            file: Some(UploadedFile {
                filename: filename.to_string(),
                bytes: bytes.to_vec(),
            }),
            db_name: Some(name.to_string()),
            force,
        }
    }

    #[test]
    fn extension_check() {
        assert!(allowed_file("a.db"));
        assert!(allowed_file("archive.tar.DB"));
        assert!(!allowed_file("a.txt"));
        assert!(!allowed_file("db"));
        assert!(!allowed_file("a.db.txt"));
    }

    #[test]
    fn resolve_is_deterministic() {
        let registry = DatabaseRegistry::new("/srv/data");
        assert_eq!(registry.resolve("x"), PathBuf::from("/srv/data/x.db"));
        assert_ne!(registry.resolve("x"), registry.resolve("y"));
    }

    #[tokio::test]
    async fn create_twice_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DatabaseRegistry::new(dir.path());

        let path = registry.create("x").await.unwrap();
        assert!(path.exists());
        let err = registry.create("x").await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));

        let err = registry.create("").await.unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(_)));
    }

    #[tokio::test]
    async fn upload_validation_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DatabaseRegistry::new(dir.path());

        let err = registry.upload(UploadRequest::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(m) if m == "No file part"));

        let err = registry.upload(upload("x", "", b"", false)).await.unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(m) if m == "No selected file"));

        let err = registry.upload(upload("x", "x.txt", b"", false)).await.unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(m) if m == "File type not allowed"));

        let err = registry.upload(upload("", "x.db", b"", false)).await.unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(m) if m == "Missing database name"));
    }

    #[tokio::test]
    async fn upload_requires_force_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DatabaseRegistry::new(dir.path());

        registry.upload(upload("x", "x.db", b"first", false)).await.unwrap();
        let err = registry
            .upload(upload("x", "x.db", b"second", false))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));

        let path = registry.upload(upload("x", "x.db", b"second", true)).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn download_missing_database_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DatabaseRegistry::new(dir.path());
        let err = registry.download("ghost").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }
}
