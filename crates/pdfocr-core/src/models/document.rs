//! Results produced by a run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// OCR output for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    /// Path of the processed file.
    pub path: PathBuf,

    /// Page texts in rasterization order (index 0 is the first page).
    pub pages: Vec<String>,

    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl FileResult {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total characters across all pages.
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.chars().count()).sum()
    }

    /// All pages joined with a form feed, the conventional page break.
    pub fn joined_text(&self) -> String {
        self.pages.join("\u{c}")
    }
}

/// A file that failed when failures are isolated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Path of the failing file.
    pub path: PathBuf,

    /// What went wrong, without the file path.
    pub error: String,
}

/// Everything a directory run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryOutcome {
    /// Successful files in completion order.
    pub results: Vec<FileResult>,

    /// Failed files, empty unless failures are isolated.
    pub failures: Vec<FileFailure>,
}

impl DirectoryOutcome {
    /// Number of files that were attempted.
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_text_keeps_empty_pages() {
        let result = FileResult {
            path: PathBuf::from("a.pdf"),
            pages: vec!["one".to_string(), String::new(), "three".to_string()],
            processing_time_ms: 0,
        };
        assert_eq!(result.joined_text(), "one\u{c}\u{c}three");
        assert_eq!(result.page_count(), 3);
        assert_eq!(result.char_count(), 8);
    }
}
