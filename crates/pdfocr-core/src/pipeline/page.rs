//! Page OCR task.

use std::sync::Arc;

use image::DynamicImage;
use tracing::trace;

use super::Pipeline;
use crate::error::{PdfocrError, Result};

impl Pipeline {
    /// Recognize one page image on the blocking pool.
    ///
    /// `index` is the 0-based page number, used to tag failures. The page
    /// slot is held until the OCR call returns, even if this future is
    /// dropped first.
    pub async fn recognize_page(&self, index: usize, image: DynamicImage) -> Result<String> {
        let permit = self.inner.page_limit.acquire().await;
        let recognizer = Arc::clone(&self.inner.recognizer);

        let text = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            recognizer.recognize(&image)
        })
        .await?
        .map_err(|source| PdfocrError::Page {
            page: index,
            source,
        })?;

        trace!("Page {} recognized: {} chars", index, text.len());
        Ok(text)
    }
}
