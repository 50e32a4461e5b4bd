//! Configuration structures for the OCR pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PdfocrError;

/// Main configuration for the pdfocr pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfocrConfig {
    /// Input configuration.
    pub input: InputConfig,

    /// PDF rasterization configuration.
    pub pdf: PdfConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Fan-out limits and failure policy.
    pub concurrency: ConcurrencyConfig,
}

/// Where the run reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory whose entries are processed.
    pub directory: PathBuf,

    /// Endpoint for downstream text consumers. Not called by the pipeline.
    pub api_url: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./data"),
            api_url: "nlpapi.some".to_string(),
        }
    }
}

/// PDF rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Render only the first `page_limit` pages of each file (0 = all).
    pub page_limit: u32,

    /// Path or name of the `pdftoppm` executable.
    pub pdftoppm_path: PathBuf,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 200,
            page_limit: 0,
            pdftoppm_path: PathBuf::from("pdftoppm"),
        }
    }
}

/// Which OCR backend recognizes page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// pure-onnx-ocr (PaddleOCR models, pure Rust).
    #[default]
    Onnx,
    /// Tesseract via leptess.
    Tesseract,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Backend used for recognition.
    pub engine: OcrEngineKind,

    /// Directory containing `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` tokens emitted by the recognizer.
    pub keep_unk: bool,

    /// Tesseract languages, joined with `+`.
    pub languages: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Onnx,
            model_dir: PathBuf::from("models"),
            keep_unk: false,
            languages: vec!["eng".to_string()],
        }
    }
}

/// What happens when one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run on the first failure.
    #[default]
    FailFast,
    /// Record the failure and keep processing the other files.
    Isolate,
}

/// Fan-out limits. A limit of 0 means unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Maximum files processed at once.
    pub max_files: usize,

    /// Maximum pages recognized at once, shared across all files.
    pub max_pages: usize,

    /// Failure handling across files.
    pub on_failure: FailurePolicy,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_files: 4,
            max_pages: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            on_failure: FailurePolicy::FailFast,
        }
    }
}

impl PdfocrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PdfocrError> {
        if self.pdf.render_dpi == 0 {
            return Err(PdfocrError::Config(
                "pdf.render_dpi must be greater than 0".to_string(),
            ));
        }
        if self.ocr.engine == OcrEngineKind::Tesseract && self.ocr.languages.is_empty() {
            return Err(PdfocrError::Config("ocr.languages must not be empty".to_string()));
        }
        Ok(())
    }
}
