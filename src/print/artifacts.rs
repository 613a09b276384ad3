//! Where printed slips are kept.

use crate::{drive::DriveClient, errors::Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

const PDF_MIME: &str = "application/pdf";

/// Persists generated PDFs.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores `bytes` under `name` and returns a human-readable location.
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String>;
}

/// Writes PDFs into a local directory, creating it when missing.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    directory: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(name);
        tokio::fs::write(&path, bytes).await?;
        info!("Saved work order print to {}", path.display());
        Ok(path.display().to_string())
    }
}

/// Uploads PDFs into a Drive folder.
#[derive(Debug, Clone)]
pub struct DriveArtifactStore {
    client: DriveClient,
    folder_id: String,
}

impl DriveArtifactStore {
    #[must_use]
    pub const fn new(client: DriveClient, folder_id: String) -> Self {
        Self { client, folder_id }
    }
}

#[async_trait]
impl ArtifactStore for DriveArtifactStore {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let file = self
            .client
            .upload(&self.folder_id, name, PDF_MIME, bytes)
            .await?;
        info!("Uploaded work order print {} as Drive file {}", name, file.id);
        Ok(format!("Drive file {} ({})", file.name, file.id))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_local_store_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path().join("OS"));

        let location = store.store("OS_1_Ana.pdf", b"%PDF-1.5").await.unwrap();

        let written = std::fs::read(dir.path().join("OS").join("OS_1_Ana.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.5");
        assert!(location.ends_with("OS_1_Ana.pdf"));
    }
}
