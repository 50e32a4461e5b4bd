//! Concurrent OCR pipeline: directory -> files -> pages -> text.
//!
//! - [`Pipeline::recognize_page`] runs one OCR call on the blocking pool.
//! - [`Pipeline::process_file`] rasterizes a file, fans out one page task per
//!   image and returns the texts in page order.
//! - [`Pipeline::process_directory`] fans out one file task per directory
//!   entry and collects results in completion order.
//!
//! Page and file fan-out are each gated by a [`ConcurrencyLimit`]. The page
//! limit is shared by every file of a run.

mod directory;
mod file;
mod limit;
mod page;

pub use directory::{DirectoryEvent, list_entries};
pub use limit::ConcurrencyLimit;

use std::sync::Arc;

use crate::error::Result;
use crate::models::config::{FailurePolicy, PdfocrConfig};
use crate::ocr::{TextRecognizer, create_recognizer};
use crate::pdf::{PopplerRasterizer, Rasterizer};

/// Resolution pages are rendered at unless configured otherwise.
pub const DEFAULT_DPI: u32 = 200;

/// Batch OCR pipeline. Cloning is cheap and shares limits and backends.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
    dpi: u32,
    file_limit: ConcurrencyLimit,
    page_limit: ConcurrencyLimit,
    on_failure: FailurePolicy,
}

impl Pipeline {
    /// Start building a pipeline around the given backends.
    pub fn builder(
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> PipelineBuilder {
        PipelineBuilder::new(rasterizer, recognizer)
    }

    /// Build a pipeline with poppler rendering and the configured OCR engine.
    pub fn from_config(config: &PdfocrConfig) -> Result<Self> {
        config.validate()?;
        let rasterizer = Arc::new(PopplerRasterizer::from_config(&config.pdf));
        let recognizer = create_recognizer(&config.ocr)?;
        Ok(Self::builder(rasterizer, recognizer)
            .with_config(config)
            .build())
    }

    /// Rendering resolution in DPI.
    pub fn dpi(&self) -> u32 {
        self.inner.dpi
    }

    /// Limit on files processed at once.
    pub fn file_limit(&self) -> &ConcurrencyLimit {
        &self.inner.file_limit
    }

    /// Limit on pages recognized at once.
    pub fn page_limit(&self) -> &ConcurrencyLimit {
        &self.inner.page_limit
    }

    /// Failure handling across files.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.inner.on_failure
    }
}

/// Builder for [`Pipeline`].
pub struct PipelineBuilder {
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
    dpi: u32,
    max_files: usize,
    max_pages: usize,
    on_failure: FailurePolicy,
}

impl PipelineBuilder {
    /// Create a builder with the default limits of
    /// [`ConcurrencyConfig`](crate::models::ConcurrencyConfig).
    pub fn new(rasterizer: Arc<dyn Rasterizer>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        let defaults = crate::models::config::ConcurrencyConfig::default();
        Self {
            rasterizer,
            recognizer,
            dpi: DEFAULT_DPI,
            max_files: defaults.max_files,
            max_pages: defaults.max_pages,
            on_failure: defaults.on_failure,
        }
    }

    /// Take DPI, limits and failure policy from `config`.
    pub fn with_config(self, config: &PdfocrConfig) -> Self {
        self.with_dpi(config.pdf.render_dpi)
            .with_max_files(config.concurrency.max_files)
            .with_max_pages(config.concurrency.max_pages)
            .with_failure_policy(config.concurrency.on_failure)
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the file fan-out limit (0 = unbounded).
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Set the page fan-out limit (0 = unbounded).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, on_failure: FailurePolicy) -> Self {
        self.on_failure = on_failure;
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Pipeline {
        Pipeline {
            inner: Arc::new(PipelineInner {
                rasterizer: self.rasterizer,
                recognizer: self.recognizer,
                dpi: self.dpi,
                file_limit: ConcurrencyLimit::new(self.max_files),
                page_limit: ConcurrencyLimit::new(self.max_pages),
                on_failure: self.on_failure,
            }),
        }
    }
}
