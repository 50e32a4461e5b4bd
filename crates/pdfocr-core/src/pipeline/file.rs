//! File processor.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::debug;

use super::Pipeline;
use crate::error::{PdfocrError, Result};
use crate::models::document::FileResult;

impl Pipeline {
    /// Rasterize one file and recognize all of its pages concurrently.
    ///
    /// Pages come back in rasterization order whatever order they finish
    /// in. The first failing page aborts the remaining page tasks and no
    /// partial result is returned. Errors carry the file path.
    pub async fn process_file(&self, path: impl Into<PathBuf>) -> Result<FileResult> {
        let path = path.into();
        let start = Instant::now();

        let pages = self
            .recognize_file(&path)
            .await
            .map_err(|e| e.in_file(&path))?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "{}: {} pages in {}ms",
            path.display(),
            pages.len(),
            processing_time_ms
        );

        Ok(FileResult {
            path,
            pages,
            processing_time_ms,
        })
    }

    async fn recognize_file(&self, path: &Path) -> Result<Vec<String>> {
        let rasterizer = Arc::clone(&self.inner.rasterizer);
        let dpi = self.inner.dpi;
        let owned_path = path.to_path_buf();
        let images =
            tokio::task::spawn_blocking(move || rasterizer.rasterize(&owned_path, dpi)).await??;

        let page_count = images.len();
        debug!("{}: rasterized {} pages at {} DPI", path.display(), page_count, dpi);

        let mut tasks = JoinSet::new();
        for (index, image) in images.into_iter().enumerate() {
            let pipeline = self.clone();
            tasks.spawn(async move { (index, pipeline.recognize_page(index, image).await) });
        }

        let mut pages: Vec<Option<String>> = vec![None; page_count];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined?;
            match result {
                Ok(text) => pages[index] = Some(text),
                Err(e) => {
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        pages
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| PdfocrError::Task("page task finished without a result".to_string()))
    }
}
