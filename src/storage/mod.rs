//! Per-owner blob storage on the local filesystem.
//!
//! Layout: one directory per owner (named by the owner's email) under the
//! media root, files stored under their corrected display name.

use std::io;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(FileStorage { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn owner_dir(&self, owner_email: &str) -> PathBuf {
        self.root.join(owner_email)
    }

    // Stored names are single path components; anything else would
    // escape the owner's directory.
    fn blob_path(&self, owner_email: &str, name: &str) -> Result<PathBuf, AppError> {
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(AppError::StorageError("Invalid stored name".to_string()));
        }
        Ok(self.owner_dir(owner_email).join(name))
    }

    /// Writes the bytes under the owner's directory. The owner directory
    /// is created lazily; `create_dir_all` tolerates a concurrent creator.
    /// Bytes go to a `.part` sibling first and are renamed into place so
    /// concurrent readers never observe a partial file.
    pub async fn save(
        &self,
        owner_email: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), AppError> {
        let final_path = self.blob_path(owner_email, name)?;
        let dir = self.owner_dir(owner_email);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(storage_error)?;

        let tmp_path = dir.join(format!("{}.part", name));
        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(storage_error)?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    /// Reads a stored file back. A missing blob is reported as NotFound so
    /// a record/blob inconsistency is surfaced rather than hidden.
    pub async fn load(&self, owner_email: &str, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.blob_path(owner_email, name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(AppError::NotFound("Not found".to_string()))
            }
            Err(err) => Err(storage_error(err)),
        }
    }
}

fn storage_error(err: io::Error) -> AppError {
    log::error!("Storage error: {:?}", err);
    AppError::StorageError("Storage error".to_string())
}
