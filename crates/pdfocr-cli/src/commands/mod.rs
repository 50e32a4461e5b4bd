//! Subcommands and the options they share.

pub mod config;
pub mod file;
pub mod run;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::debug;

use pdfocr_core::models::config::{OcrEngineKind, PdfocrConfig};
use pdfocr_core::FileResult;

/// How extracted text is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, pages separated by form feeds
    Text,
    /// JSON with one entry per page
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EngineArg {
    /// pure-onnx-ocr (PaddleOCR models)
    Onnx,
    /// Tesseract
    Tesseract,
}

impl From<EngineArg> for OcrEngineKind {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Onnx => OcrEngineKind::Onnx,
            EngineArg::Tesseract => OcrEngineKind::Tesseract,
        }
    }
}

/// Pipeline options shared by `run` and `file`.
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    /// Rendering resolution in DPI
    #[arg(long)]
    dpi: Option<u32>,

    /// Maximum pages recognized at once (0 = unbounded)
    #[arg(long)]
    page_jobs: Option<usize>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// OCR engine
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,
}

impl PipelineArgs {
    /// Override configuration values given on the command line.
    pub fn apply(&self, config: &mut PdfocrConfig) {
        if let Some(dpi) = self.dpi {
            config.pdf.render_dpi = dpi;
        }
        if let Some(page_jobs) = self.page_jobs {
            config.concurrency.max_pages = page_jobs;
        }
        if let Some(ref model_dir) = self.model_dir {
            config.ocr.model_dir = model_dir.clone();
        }
        if let Some(engine) = self.engine {
            config.ocr.engine = engine.into();
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdfocr")
        .join("config.json")
}

/// Configuration file in effect: `--config` if given, else the default path.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PdfocrConfig> {
    let path = config_file(config_path);
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(PdfocrConfig::from_file(&path)?)
    } else if config_path.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    } else {
        Ok(PdfocrConfig::default())
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    result: &'a FileResult,
}

/// Render one file's text in `format`.
pub fn format_result(result: &FileResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(result.joined_text()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonOutput {
            generated_at: Utc::now(),
            result,
        })?),
    }
}

/// Output path for `source` inside `output_dir`.
pub fn output_path(output_dir: &Path, source: &Path, format: OutputFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

/// Write one file's text into `output_dir`.
pub fn write_result(
    output_dir: &Path,
    result: &FileResult,
    format: OutputFormat,
) -> anyhow::Result<PathBuf> {
    let path = output_path(output_dir, &result.path, format);
    fs::write(&path, format_result(result, format)?)?;
    debug!("Wrote output to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> FileResult {
        FileResult {
            path: PathBuf::from("data/report.pdf"),
            pages: vec!["first".to_string(), String::new()],
            processing_time_ms: 12,
        }
    }

    #[test]
    fn test_output_path_uses_stem() {
        let path = output_path(Path::new("out"), Path::new("data/report.pdf"), OutputFormat::Json);
        assert_eq!(path, PathBuf::from("out/report.json"));
    }

    #[test]
    fn test_text_format_separates_pages() {
        assert_eq!(format_result(&sample(), OutputFormat::Text).unwrap(), "first\u{c}");
    }

    #[test]
    fn test_json_format_lists_pages() {
        let json = format_result(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pages"], serde_json::json!(["first", ""]));
        assert_eq!(value["path"], "data/report.pdf");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_pipeline_args_override_config() {
        let args = PipelineArgs {
            dpi: Some(300),
            page_jobs: Some(0),
            model_dir: Some(PathBuf::from("/opt/models")),
            engine: Some(EngineArg::Tesseract),
        };
        let mut config = PdfocrConfig::default();
        args.apply(&mut config);

        assert_eq!(config.pdf.render_dpi, 300);
        assert_eq!(config.concurrency.max_pages, 0);
        assert_eq!(config.ocr.model_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.ocr.engine, OcrEngineKind::Tesseract);
    }
}
