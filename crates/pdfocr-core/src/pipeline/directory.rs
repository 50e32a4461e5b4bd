//! Directory driver.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::Pipeline;
use crate::error::{PdfocrError, Result};
use crate::models::config::FailurePolicy;
use crate::models::document::{DirectoryOutcome, FileFailure};

/// List every entry of `dir`, non-recursively and without filtering.
pub async fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let listing_error = |source: std::io::Error| PdfocrError::Listing {
        path: dir.to_path_buf(),
        source,
    };

    let mut reader = tokio::fs::read_dir(dir).await.map_err(listing_error)?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(listing_error)? {
        entries.push(entry.path());
    }
    Ok(entries)
}

/// Progress reported by [`Pipeline::process_directory_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryEvent<'a> {
    /// The directory was listed; `total` files will be processed.
    Listed { dir: &'a Path, total: usize },
    /// A file finished, successfully or not.
    Completed { path: &'a Path },
}

impl Pipeline {
    /// Process every entry of `dir` concurrently.
    ///
    /// Results are collected in completion order, not listing order.
    pub async fn process_directory(&self, dir: impl AsRef<Path>) -> Result<DirectoryOutcome> {
        self.process_directory_with(dir, |_| {}).await
    }

    /// Like [`process_directory`](Self::process_directory), reporting a
    /// [`DirectoryEvent`] once the directory is listed and as each file
    /// finishes.
    pub async fn process_directory_with<F>(
        &self,
        dir: impl AsRef<Path>,
        mut on_event: F,
    ) -> Result<DirectoryOutcome>
    where
        F: FnMut(DirectoryEvent<'_>),
    {
        let dir = dir.as_ref();
        let entries = list_entries(dir).await?;
        info!("Found {} entries in {}", entries.len(), dir.display());
        on_event(DirectoryEvent::Listed {
            dir,
            total: entries.len(),
        });
        self.process_files(entries, |path| on_event(DirectoryEvent::Completed { path })).await
    }

    /// Process `paths` concurrently, one task per path.
    ///
    /// Under [`FailurePolicy::FailFast`] the first failure aborts the
    /// remaining file tasks and is returned. Under
    /// [`FailurePolicy::Isolate`] failures are recorded in the outcome.
    pub async fn process_files<F>(
        &self,
        paths: Vec<PathBuf>,
        mut on_complete: F,
    ) -> Result<DirectoryOutcome>
    where
        F: FnMut(&Path),
    {
        let mut tasks = JoinSet::new();
        for path in paths {
            let pipeline = self.clone();
            tasks.spawn(async move {
                let _permit = pipeline.inner.file_limit.acquire().await;
                let result = pipeline.process_file(path.clone()).await;
                (path, result)
            });
        }

        let mut outcome = DirectoryOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            let (path, result) = joined?;
            match result {
                Ok(file) => {
                    debug!("Completed {} ({} pages)", path.display(), file.page_count());
                    on_complete(&path);
                    outcome.results.push(file);
                }
                Err(e) => match self.inner.on_failure {
                    FailurePolicy::FailFast => {
                        tasks.abort_all();
                        return Err(e);
                    }
                    FailurePolicy::Isolate => {
                        warn!("{}", e);
                        on_complete(&path);
                        outcome.failures.push(FileFailure {
                            error: failure_message(e),
                            path,
                        });
                    }
                },
            }
        }

        info!(
            "Processed {} files: {} succeeded, {} failed",
            outcome.total(),
            outcome.results.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }
}

/// The cause of a file failure, without the file path the failure is stored under.
fn failure_message(err: PdfocrError) -> String {
    match err {
        PdfocrError::File { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
