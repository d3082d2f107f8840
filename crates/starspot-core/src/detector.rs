//! Classical face detector via the rustface (SeetaFace) cascade.
//!
//! Multi-scale sliding-window detection over a grayscale frame. The
//! parameter file is an opaque pre-trained artifact loaded once at startup;
//! if that load fails the detector degrades to a permanent no-op rather
//! than failing the whole pipeline.

use crate::types::FaceBox;
use image::GrayImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

// --- Detection tuning ---
/// Minimum detectable face size as a fraction of frame height.
const MIN_FACE_RATIO: f32 = 0.1;
/// Per-level growth of the image pyramid. rustface takes the shrink
/// factor, so the reciprocal is passed.
const SCALE_STEP: f32 = 1.1;
/// Low cascade score threshold: favors recall, tolerates false positives.
const SCORE_THRESH: f64 = 2.0;
const SLIDE_WINDOW_STEP: u32 = 4;
/// Hard floor imposed by the cascade's 20px training window.
const MIN_DETECTABLE_FACE: u32 = 20;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("cascade model file not found: {0}")]
    ModelNotFound(String),
    #[error("failed to read cascade model: {0}")]
    ModelLoad(String),
}

/// Finds face bounding boxes in a grayscale frame.
///
/// Seam for the pipeline so tests can drive it with synthetic detections.
pub trait FaceFinder {
    fn find(&mut self, gray: &GrayImage) -> Vec<FaceBox>;
}

/// Cascade-based face detector. An unavailable detector (failed model
/// load) returns no faces for every frame.
pub struct FaceDetector {
    inner: Option<Box<dyn rustface::Detector>>,
}

impl FaceDetector {
    /// Load the cascade parameter file from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let file = File::open(model_path).map_err(|e| DetectorError::ModelLoad(e.to_string()))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| DetectorError::ModelLoad(e.to_string()))?;

        let mut detector = rustface::create_detector_with_model(model);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(1.0 / SCALE_STEP);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        tracing::info!(path = model_path, "loaded cascade model");

        Ok(Self {
            inner: Some(detector),
        })
    }

    /// The degraded detector: every `detect` call returns no faces.
    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    /// Detect faces in a grayscale frame.
    ///
    /// The minimum face size is recomputed per call as 10% of the frame
    /// height, so small spurious candidates are rejected relative to the
    /// frame resolution rather than by a fixed pixel count. An empty
    /// result is not an error.
    pub fn detect(&mut self, gray: &GrayImage) -> Vec<FaceBox> {
        let Some(detector) = self.inner.as_mut() else {
            return Vec::new();
        };

        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        detector.set_min_face_size(min_face_size_for(height));

        let image = rustface::ImageData::new(gray.as_raw(), width, height);
        let faces = detector.detect(&image);

        tracing::debug!(width, height, faces = faces.len(), "cascade pass");

        faces
            .iter()
            .map(|info| {
                let bbox = info.bbox();
                FaceBox {
                    x: bbox.x(),
                    y: bbox.y(),
                    width: bbox.width(),
                    height: bbox.height(),
                    score: info.score() as f32,
                }
            })
            .collect()
    }
}

impl FaceFinder for FaceDetector {
    fn find(&mut self, gray: &GrayImage) -> Vec<FaceBox> {
        self.detect(gray)
    }
}

/// Minimum face size for a frame of the given height, floored at the
/// cascade's smallest detectable window.
fn min_face_size_for(frame_height: u32) -> u32 {
    let dynamic = (frame_height as f32 * MIN_FACE_RATIO) as u32;
    dynamic.max(MIN_DETECTABLE_FACE)
}
