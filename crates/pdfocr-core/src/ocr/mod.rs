//! OCR backends.

#[cfg(feature = "onnx")]
mod pure_engine;
#[cfg(feature = "tesseract")]
mod tesseract;

#[cfg(feature = "onnx")]
pub use pure_engine::PureOcrEngine;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{OcrError, PdfocrError};
use crate::models::config::{OcrConfig, OcrEngineKind};

/// Rows closer than this many pixels are read as one line.
const ROW_HEIGHT_PX: f32 = 20.0;

/// Extracts text from a single page image.
///
/// Implementations block; the pipeline calls them from the blocking pool.
/// An empty string is a valid result for a page without text.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes by reading order (top-to-bottom, left-to-right).
pub fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = (ay / ROW_HEIGHT_PX) as i32;
        let row_b = (by / ROW_HEIGHT_PX) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Join box texts with newlines.
pub fn join_lines(boxes: &[TextBox]) -> String {
    boxes
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the recognizer selected in `config`.
pub fn create_recognizer(config: &OcrConfig) -> crate::Result<Arc<dyn TextRecognizer>> {
    match config.engine {
        OcrEngineKind::Onnx => onnx_recognizer(config),
        OcrEngineKind::Tesseract => tesseract_recognizer(config),
    }
}

#[cfg(feature = "onnx")]
fn onnx_recognizer(config: &OcrConfig) -> crate::Result<Arc<dyn TextRecognizer>> {
    Ok(Arc::new(PureOcrEngine::from_dir(&config.model_dir, config.clone())?))
}

#[cfg(not(feature = "onnx"))]
fn onnx_recognizer(_config: &OcrConfig) -> crate::Result<Arc<dyn TextRecognizer>> {
    Err(PdfocrError::Config(
        "the onnx OCR engine was not compiled in (enable the `onnx` feature)".to_string(),
    ))
}

#[cfg(feature = "tesseract")]
fn tesseract_recognizer(config: &OcrConfig) -> crate::Result<Arc<dyn TextRecognizer>> {
    Ok(Arc::new(TesseractEngine::new(&config.languages)))
}

#[cfg(not(feature = "tesseract"))]
fn tesseract_recognizer(_config: &OcrConfig) -> crate::Result<Arc<dyn TextRecognizer>> {
    Err(PdfocrError::Config(
        "the tesseract OCR engine was not compiled in (enable the `tesseract` feature)"
            .to_string(),
    ))
}
