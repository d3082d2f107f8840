//! Celebrity score model via ONNX Runtime.
//!
//! A single forward pass over a 96x96 RGB face crop yields one scalar
//! score; what that score means is entirely the label table's business.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

// --- Preprocessing contract (must match the model's training pipeline) ---
const CLASSIFIER_INPUT_SIZE: u32 = 96;
const CLASSIFIER_CHANNELS: usize = 3;
const PIXEL_SCALE: f32 = 255.0;

const DEFAULT_INTRA_THREADS: usize = 4;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("classifier model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("empty face patch")]
    EmptyPatch,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Construction-time options for the inference session. Fixed for the
/// session's lifetime.
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    /// Intra-op thread count for a single forward pass.
    pub intra_threads: usize,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }
}

/// Scores a face crop.
///
/// Seam for the pipeline so tests can substitute deterministic scorers.
pub trait Scorer {
    fn score(&mut self, patch: &RgbaImage) -> Result<f32, ClassifierError>;
}

/// ONNX-backed celebrity classifier.
pub struct FaceClassifier {
    session: Session,
}

impl FaceClassifier {
    /// Load the classifier model from the given path. Failure here is
    /// fatal for the component: without the model no inference can run.
    pub fn load(model_path: &str, options: &ClassifierOptions) -> Result<Self, ClassifierError> {
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::ModelNotFound(model_path.to_string()));
        }

        let builder = Session::builder()?.with_intra_threads(options.intra_threads)?;

        #[cfg(feature = "cuda")]
        let builder = builder.with_execution_providers([
            ort::execution_providers::CUDAExecutionProvider::default().build(),
        ])?;

        let session = builder.commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| i.name()).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            intra_threads = options.intra_threads,
            "loaded classifier model"
        );

        Ok(Self { session })
    }

    /// Classify a color face patch of arbitrary size, returning the raw
    /// model score. Deterministic for identical patches.
    pub fn classify(&mut self, patch: &RgbaImage) -> Result<f32, ClassifierError> {
        if patch.width() == 0 || patch.height() == 0 {
            return Err(ClassifierError::EmptyPatch);
        }

        let input = Self::preprocess(patch);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::InferenceFailed(format!("score extraction: {e}")))?;

        match data {
            &[score] => Ok(score),
            other => Err(ClassifierError::InferenceFailed(format!(
                "expected a single score, got {} values",
                other.len()
            ))),
        }
    }

    /// Resize to 96x96 (nearest neighbor, aspect ratio ignored), drop
    /// alpha, scale each channel into [0, 1]. NHWC, RGB order, no mean
    /// subtraction.
    fn preprocess(patch: &RgbaImage) -> Array4<f32> {
        let size = CLASSIFIER_INPUT_SIZE;
        let resized = if patch.dimensions() == (size, size) {
            patch.clone()
        } else {
            imageops::resize(patch, size, size, FilterType::Nearest)
        };

        let mut tensor = Array4::<f32>::zeros((
            1,
            size as usize,
            size as usize,
            CLASSIFIER_CHANNELS,
        ));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let [r, g, b, _a] = pixel.0;
            tensor[[0, y as usize, x as usize, 0]] = r as f32 / PIXEL_SCALE;
            tensor[[0, y as usize, x as usize, 1]] = g as f32 / PIXEL_SCALE;
            tensor[[0, y as usize, x as usize, 2]] = b as f32 / PIXEL_SCALE;
        }

        tensor
    }
}

impl Scorer for FaceClassifier {
    fn score(&mut self, patch: &RgbaImage) -> Result<f32, ClassifierError> {
        self.classify(patch)
    }
}
