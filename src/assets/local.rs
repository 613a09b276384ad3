use super::{IMAGE_EXTENSIONS, ImageSource};
use crate::errors::Result;
use async_trait::async_trait;
use std::{io::ErrorKind, path::PathBuf};

/// Designs stored as files in a local directory, named `<design>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalImageSource {
    directory: PathBuf,
}

impl LocalImageSource {
    /// Source reading from `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl ImageSource for LocalImageSource {
    fn describe(&self) -> String {
        format!("local directory {}", self.directory.display())
    }

    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        // Names come from user input; never leave the directory
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Ok(None);
        }

        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Stem must match exactly; the extension is compared case-insensitively,
        // the same way the design catalogue lists files
        let mut candidates: Vec<(usize, PathBuf)> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some((stem, ext)) = file_name.to_str().and_then(|f| f.rsplit_once('.')) else {
                continue;
            };
            if stem != name {
                continue;
            }
            if let Some(rank) = IMAGE_EXTENSIONS
                .iter()
                .position(|known| known.eq_ignore_ascii_case(ext))
            {
                candidates.push((rank, entry.path()));
            }
        }
        candidates.sort();

        match candidates.into_iter().next() {
            Some((_, path)) => Ok(Some(tokio::fs::read(&path).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::assets::{ImageResolver, tests::png_bytes};
    use image::{ImageFormat, RgbImage};

    #[tokio::test]
    async fn test_extension_order_prefers_jpg() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("flores.png"), png_bytes(2, 2, [0, 0, 0, 255])).unwrap();
        RgbImage::new(3, 3)
            .save_with_format(dir.path().join("flores.jpg"), ImageFormat::Jpeg)
            .unwrap();

        let resolver = ImageResolver::new().with_source(LocalImageSource::new(dir.path()));
        let found = resolver.resolve("flores").await.unwrap().unwrap();
        assert_eq!((found.width, found.height), (3, 3));
    }

    #[tokio::test]
    async fn test_falls_back_to_later_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_rosa.png"), png_bytes(4, 1, [9, 9, 9, 255])).unwrap();

        let source = LocalImageSource::new(dir.path());
        assert!(source.fetch("b_rosa").await.unwrap().is_some());
        assert!(source.fetch("rosa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalImageSource::new(dir.path().join("inner"));
        assert!(source.fetch("../secret").await.unwrap().is_none());
        assert!(source.fetch("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_catalogued_uppercase_extension_resolves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_rosa.PNG"), png_bytes(5, 2, [1, 2, 3, 255])).unwrap();
        std::fs::write(dir.path().join("b_rosa_v2.png"), png_bytes(1, 1, [0, 0, 0, 255])).unwrap();

        let listed = crate::core::designs::list_local_designs(dir.path()).await.unwrap();
        assert!(listed.iter().any(|d| d.name == "b_rosa"));

        let resolver = ImageResolver::new().with_source(LocalImageSource::new(dir.path()));
        let found = resolver.resolve("b_rosa").await.unwrap().unwrap();
        assert_eq!((found.width, found.height), (5, 2));
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalImageSource::new(dir.path().join("absent"));
        assert!(source.fetch("flores").await.unwrap().is_none());
    }
}
