//! Catalogue of design images.

use crate::{assets::IMAGE_EXTENSIONS, drive::DriveClient, errors::Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name prefix reserved for embroidered designs
pub const EMBROIDERED_PREFIX: &str = "b_";

/// A design available for work orders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DesignAsset {
    /// Logical name, the file stem
    pub name: String,
    /// Embroidered rather than printed
    pub embroidered: bool,
}

impl DesignAsset {
    /// Builds the asset for a logical name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            embroidered: name.to_lowercase().starts_with(EMBROIDERED_PREFIX),
        }
    }
}

/// Splits `file_name` into its stem when the extension is a known image type.
fn design_stem(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    (!stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext.as_str())).then_some(stem)
}

fn catalogue<'a>(file_names: impl Iterator<Item = &'a str>) -> Vec<DesignAsset> {
    let mut designs: Vec<DesignAsset> = file_names
        .filter_map(design_stem)
        .map(DesignAsset::new)
        .collect();
    designs.sort();
    designs.dedup();
    designs
}

/// Designs in a local directory, sorted by name.
pub async fn list_local_designs(directory: &Path) -> Result<Vec<DesignAsset>> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    debug!("Found {} file(s) in {}", names.len(), directory.display());
    Ok(catalogue(names.iter().map(String::as_str)))
}

/// Designs in a Drive folder, sorted by name.
pub async fn list_drive_designs(client: &DriveClient, folder_id: &str) -> Result<Vec<DesignAsset>> {
    let files = client.list_images(folder_id).await?;
    Ok(catalogue(files.iter().map(|f| f.name.as_str())))
}

/// Where the design catalogue is read from.
#[derive(Debug, Clone)]
pub enum DesignCatalog {
    /// A local directory
    Local(PathBuf),
    /// A Drive folder
    Drive {
        /// Authenticated client
        client: DriveClient,
        /// Folder holding the images
        folder_id: String,
    },
}

impl DesignCatalog {
    /// Lists the designs of this location, sorted by name.
    pub async fn list(&self) -> Result<Vec<DesignAsset>> {
        match self {
            Self::Local(directory) => list_local_designs(directory).await,
            Self::Drive { client, folder_id } => list_drive_designs(client, folder_id).await,
        }
    }
}
