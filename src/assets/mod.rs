//! Design image lookup.
//!
//! A logical design name (the file stem, e.g. `b_flores`) is resolved by asking an
//! ordered chain of [`ImageSource`]s; the first source that has the image wins.
//! Every hit is decoded and flattened onto a white background before it reaches the
//! print layout, since the PDF output carries no alpha channel.

mod drive;
mod local;

pub use drive::DriveImageSource;
pub use local::LocalImageSource;

use crate::errors::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Extensions tried, in order, when looking for a design file
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "png", "jpeg", "gif", "bmp", "webp"];

/// Somewhere design images can be fetched from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short label used in logs.
    fn describe(&self) -> String;

    /// Raw bytes of the image called `name`, or `None` when this source lacks it.
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

/// A decoded, opaque RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Logical name the image was resolved from
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGB samples, 3 bytes per pixel
    pub rgb: Vec<u8>,
}

impl ResolvedImage {
    /// Decodes any supported format and composites transparency onto white.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgb = Vec::with_capacity(rgba.as_raw().len() / 4 * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend([r, g, b].map(|c| over_white(c, a)));
        }

        Ok(Self {
            name: name.to_string(),
            width,
            height,
            rgb,
        })
    }
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u16::from(channel), u16::from(alpha));
    let blended = (c * a + 255 * (255 - a) + 127) / 255;
    u8::try_from(blended).unwrap_or(u8::MAX)
}

/// Ordered chain of image sources.
#[derive(Default)]
pub struct ImageResolver {
    sources: Vec<Box<dyn ImageSource>>,
}

impl ImageResolver {
    /// A resolver with no sources; it never finds anything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source to the end of the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl ImageSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Undecoded bytes of `name` from the first source that has it.
    pub async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        for source in &self.sources {
            if let Some(bytes) = source.fetch(name).await? {
                debug!("Design '{}' found in {}", name, source.describe());
                return Ok(Some(bytes));
            }
        }
        warn!("Design image '{}' not found in any source", name);
        Ok(None)
    }

    /// Resolves `name` against each source in order.
    ///
    /// # Errors
    /// Not finding the image is `Ok(None)`. Transport and decode failures are errors.
    pub async fn resolve(&self, name: &str) -> Result<Option<ResolvedImage>> {
        match self.fetch(name).await? {
            Some(bytes) => ResolvedImage::decode(name, &bytes).map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.describe()))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::{collections::HashMap, io::Cursor};

    /// Encodes a solid-colour PNG.
    pub(crate) fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    struct MemorySource {
        label: &'static str,
        files: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl ImageSource for MemorySource {
        fn describe(&self) -> String {
            self.label.to_string()
        }

        async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.files.get(name).cloned())
        }
    }

    fn memory(label: &'static str, entries: &[(&str, u32)]) -> MemorySource {
        MemorySource {
            label,
            files: entries
                .iter()
                .map(|(name, size)| ((*name).to_string(), png_bytes(*size, *size, [0, 0, 0, 255])))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_finds_nothing() {
        assert!(ImageResolver::new().resolve("flores").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_source_in_order_wins() {
        let resolver = ImageResolver::new()
            .with_source(memory("first", &[("caveira", 1)]))
            .with_source(memory("second", &[("flores", 2)]))
            .with_source(memory("third", &[("flores", 3)]));

        let found = resolver.resolve("flores").await.unwrap().unwrap();
        assert_eq!((found.width, found.height), (2, 2));
        assert_eq!(found.rgb.len(), 2 * 2 * 3);

        assert!(resolver.resolve("leão").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_an_error() {
        let mut files = HashMap::new();
        files.insert("broken".to_string(), b"not an image".to_vec());
        let resolver = ImageResolver::new().with_source(MemorySource {
            label: "memory",
            files,
        });
        assert!(resolver.resolve("broken").await.is_err());
    }

    #[test]
    fn test_alpha_is_flattened_onto_white() {
        let transparent = ResolvedImage::decode("t", &png_bytes(1, 1, [10, 20, 30, 0])).unwrap();
        assert_eq!(transparent.rgb, vec![255, 255, 255]);

        let half = ResolvedImage::decode("h", &png_bytes(1, 1, [255, 0, 0, 128])).unwrap();
        assert_eq!(half.rgb, vec![255, 127, 127]);

        let opaque = ResolvedImage::decode("o", &png_bytes(1, 1, [1, 2, 3, 255])).unwrap();
        assert_eq!(opaque.rgb, vec![1, 2, 3]);
    }
}
