//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{TextBox, TextRecognizer, join_lines, sort_by_reading_order};

const DET_MODEL: &str = "det.onnx";
const REC_MODEL: &str = "latin_rec.onnx";
const DICTIONARY: &str = "latin_dict.txt";

thread_local! {
    // One engine per blocking worker, keyed by model directory.
    static ENGINE: RefCell<Option<(PathBuf, pure_onnx_ocr::engine::OcrEngine)>> =
        const { RefCell::new(None) };
}

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// The underlying engine is loaded lazily on each thread that recognizes a
/// page, so pages can be recognized in parallel without sharing it.
#[derive(Debug, Clone)]
pub struct PureOcrEngine {
    model_dir: PathBuf,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path, config: OcrConfig) -> Result<Self, OcrError> {
        for name in [DET_MODEL, REC_MODEL, DICTIONARY] {
            let path = model_dir.join(name);
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing {} (expected {})",
                    name,
                    path.display()
                )));
            }
        }

        info!("Using pure-onnx-ocr models from {}", model_dir.display());

        Ok(Self {
            model_dir: model_dir.to_path_buf(),
            config,
        })
    }

    fn load(&self) -> Result<pure_onnx_ocr::engine::OcrEngine, OcrError> {
        let start = Instant::now();
        let det_path = self.model_dir.join(DET_MODEL);
        let rec_path = self.model_dir.join(REC_MODEL);
        let dict_path = self.model_dir.join(DICTIONARY);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        debug!(
            "Loaded pure-onnx-ocr engine on {:?} in {}ms",
            std::thread::current().id(),
            start.elapsed().as_millis()
        );
        Ok(engine)
    }

    fn run(
        &self,
        engine: &pure_onnx_ocr::engine::OcrEngine,
        image: &DynamicImage,
    ) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut text_boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        sort_by_reading_order(&mut text_boxes);

        debug!(
            "OCR {}x{}: {} text boxes in {}ms",
            width,
            height,
            text_boxes.len(),
            start.elapsed().as_millis()
        );

        Ok(join_lines(&text_boxes))
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        ENGINE.with(|cell| {
            let mut slot = cell.borrow_mut();
            if let Some((dir, engine)) = slot.as_ref() {
                if *dir == self.model_dir {
                    return self.run(engine, image);
                }
            }

            let engine = self.load()?;
            let text = self.run(&engine, image);
            *slot = Some((self.model_dir.clone(), engine));
            text
        })
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
