//! Tesseract OCR via leptess.

use std::io::Cursor;

use image::DynamicImage;
use tracing::trace;

use crate::error::OcrError;

use super::TextRecognizer;

/// Recognizer backed by a system Tesseract install.
///
/// A Tesseract handle is not shareable across threads, so every call opens
/// its own.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    languages: String,
}

impl TesseractEngine {
    /// Create an engine for the given languages (`eng` when empty).
    pub fn new(languages: &[String]) -> Self {
        let languages = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };
        Self { languages }
    }

    /// Language string handed to Tesseract.
    pub fn languages(&self) -> &str {
        &self.languages
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let mut png_data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(format!("failed to encode page: {}", e)))?;

        let mut lt = leptess::LepTess::new(None, &self.languages)
            .map_err(|e| OcrError::ModelLoad(format!("failed to initialize Tesseract: {}", e)))?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| OcrError::InvalidImage(format!("failed to set image for OCR: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        trace!("Tesseract returned {} chars", text.len());
        Ok(text)
    }
}
