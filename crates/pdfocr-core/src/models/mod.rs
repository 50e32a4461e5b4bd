//! Data models: configuration and run results.

pub mod config;
pub mod document;

pub use config::{
    ConcurrencyConfig, FailurePolicy, InputConfig, OcrConfig, OcrEngineKind, PdfConfig,
    PdfocrConfig,
};
pub use document::{DirectoryOutcome, FileFailure, FileResult};
