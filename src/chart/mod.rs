//! Report rendering
//!
//! One page per asset: price comparison on top, divergence below.

pub mod layout;
mod page;
mod pdf;

pub use page::{AssetPage, PageSink};
pub use pdf::PdfReport;

use thiserror::Error;

/// Rendering and output errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Output file could not be created or written
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    /// PDF backend failure
    #[error("PDF error: {0}")]
    Pdf(String),
    /// Nothing to plot
    #[error("Page {0:?} has no rows")]
    EmptyPage(String),
}
