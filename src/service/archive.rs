use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::GatewayError;

/// Wrap exactly one file into a zip archive. The entry is named after the
/// file's base name.
pub fn zip_single_file(path: &Path) -> Result<Vec<u8>, GatewayError> {
    let entry_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GatewayError::bad_request("Invalid database file name"))?
        .to_string();
    let contents = fs::read(path)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry_name, options)?;
    writer.write_all(&contents)?;
    Ok(writer.finish()?.into_inner())
}

/// Build the archive on the blocking pool and keep a copy at `archive_path`.
pub async fn zip_to_file(source: PathBuf, archive_path: PathBuf) -> Result<Vec<u8>, GatewayError> {
    tokio::task::spawn_blocking(move || {
        let bytes = zip_single_file(&source)?;
        fs::write(&archive_path, &bytes)?;
        Ok(bytes)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn archive_holds_one_entry_with_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sales.db");
        fs::write(&db_path, b"SQLite format 3\0payload").unwrap();

        let bytes = zip_single_file(&db_path).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "sales.db");
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"SQLite format 3\0payload");
    }

    #[tokio::test]
    async fn zip_to_file_persists_archive() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("x.db");
        let zip_path = dir.path().join("x.zip");
        fs::write(&db_path, b"abc").unwrap();

        let bytes = zip_to_file(db_path, zip_path.clone()).await.unwrap();
        assert_eq!(fs::read(zip_path).unwrap(), bytes);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = zip_single_file(&dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, GatewayError::Io(_)));
    }
}
