//! Error types for the pdfocr-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the pdfocr library.
#[derive(Error, Debug)]
pub enum PdfocrError {
    /// The input directory could not be listed.
    #[error("failed to list directory {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Processing a single file failed.
    #[error("failed to process {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<PdfocrError>,
    },

    /// OCR of a single page failed (0-indexed page).
    #[error("page {page}: {source}")]
    Page {
        page: usize,
        #[source]
        source: OcrError,
    },

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A spawned task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

impl PdfocrError {
    /// Wrap an error with the path of the file it belongs to.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        PdfocrError::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

impl From<tokio::task::JoinError> for PdfocrError {
    fn from(err: tokio::task::JoinError) -> Self {
        PdfocrError::Task(err.to_string())
    }
}

/// Errors related to PDF rasterization.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The renderer failed to produce page images.
    #[error("failed to render pages: {0}")]
    Render(String),

    /// A rendered page image could not be decoded.
    #[error("failed to decode page image: {0}")]
    Decode(#[from] image::ImageError),

    /// I/O error while reading the file or the rendered pages.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the pdfocr library.
pub type Result<T> = std::result::Result<T, PdfocrError>;
