//! Work order slips as PDF.
//!
//! [`render`] lays out one to three orders on a single page and returns the PDF
//! bytes together with any layout warnings. [`artifacts`] persists the result.

pub mod artifacts;
pub mod layout;
pub mod metrics;
pub mod pdf;

pub use artifacts::{ArtifactStore, DriveArtifactStore, LocalArtifactStore};

use crate::{assets::ResolvedImage, core::work_order::WorkOrder, errors::Result};
use std::fmt;
use tracing::warn;

/// One order to print and its design image, if one was found.
#[derive(Debug, Clone, Copy)]
pub struct Slip<'a> {
    /// The order printed on the slip
    pub order: &'a WorkOrder,
    /// Design image for the frame
    pub image: Option<&'a ResolvedImage>,
}

/// A non-fatal problem found while laying out a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// The design image could not be found; its frame is left empty
    MissingImage {
        /// Order code
        code: u32,
        /// Design name that was looked up
        design: String,
    },
    /// The note did not fit above the next cut line
    NoteTruncated {
        /// Order code
        code: u32,
        /// Number of wrapped lines left out
        dropped_lines: usize,
    },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingImage { code, design } => {
                write!(f, "OS {code}: image for design '{design}' not found")
            }
            Self::NoteTruncated {
                code,
                dropped_lines,
            } => write!(
                f,
                "OS {code}: note too long, {dropped_lines} line(s) left out of the slip"
            ),
        }
    }
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    /// PDF document bytes
    pub bytes: Vec<u8>,
    /// Problems that did not stop rendering
    pub warnings: Vec<LayoutWarning>,
}

/// Renders 1 to 3 slips on one page.
pub fn render(slips: &[Slip<'_>]) -> Result<RenderedPdf> {
    let (page, warnings) = layout::compose(slips)?;
    for warning in &warnings {
        warn!("{}", warning);
    }
    let bytes = pdf::write(&page, slips)?;
    Ok(RenderedPdf { bytes, warnings })
}

/// File name for a print of `orders`: `OS_{first code}_{clients}.pdf`.
///
/// Clients are listed once each in first-seen order. Path separators in names are
/// replaced with `_`.
#[must_use]
pub fn artifact_name(orders: &[WorkOrder]) -> String {
    let base = orders.first().map_or(0, |o| o.code);
    let mut clients: Vec<&str> = Vec::new();
    for order in orders {
        if !clients.contains(&order.client.as_str()) {
            clients.push(&order.client);
        }
    }
    let name = format!("OS_{base}_{}.pdf", clients.join("_"));
    name.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_order;

    #[test]
    fn test_artifact_name_lists_distinct_clients() {
        let orders = [
            sample_order(12, "Ana"),
            sample_order(13, "Bia"),
            sample_order(14, "Ana"),
        ];
        assert_eq!(artifact_name(&orders), "OS_12_Ana_Bia.pdf");
        assert_eq!(artifact_name(&orders[..1]), "OS_12_Ana.pdf");
    }

    #[test]
    fn test_artifact_name_strips_path_separators() {
        let orders = [sample_order(5, "Loja A/B"), sample_order(6, "..\\x")];
        assert_eq!(artifact_name(&orders), "OS_5_Loja A_B_.._x.pdf");
    }

    #[test]
    fn test_render_reports_missing_image() {
        let order = sample_order(1, "Ana");
        let rendered = render(&[Slip {
            order: &order,
            image: None,
        }])
        .unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(
            rendered.warnings[0].to_string(),
            "OS 1: image for design 'flores' not found"
        );
    }
}
