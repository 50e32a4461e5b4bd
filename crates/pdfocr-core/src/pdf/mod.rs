//! PDF rasterization.

mod poppler;
mod probe;

pub use poppler::PopplerRasterizer;
pub use probe::{PdfProbe, probe};

use std::path::Path;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Converts a document on disk into one image per page.
///
/// Implementations block; the pipeline calls them from the blocking pool.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `path` at `dpi`, in document order.
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;
}
