//! Core library for batch PDF OCR.
//!
//! This crate provides:
//! - PDF rasterization (poppler `pdftoppm`, probed with lopdf)
//! - OCR backends (pure-onnx-ocr, optionally Tesseract)
//! - A concurrent pipeline that fans out pages within a file and files
//!   within a directory

pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{OcrError, PdfError, PdfocrError, Result};
pub use models::config::{FailurePolicy, OcrEngineKind, PdfocrConfig};
pub use models::document::{DirectoryOutcome, FileFailure, FileResult};
pub use ocr::{TextBox, TextRecognizer, create_recognizer};
pub use pdf::{PopplerRasterizer, Rasterizer};
pub use pipeline::{ConcurrencyLimit, DirectoryEvent, Pipeline, PipelineBuilder, list_entries};

#[cfg(feature = "onnx")]
pub use ocr::PureOcrEngine;
#[cfg(feature = "tesseract")]
pub use ocr::TesseractEngine;
