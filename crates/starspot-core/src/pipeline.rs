//! Per-frame orchestration: rotate, detect, classify, annotate, rotate back.
//!
//! One synchronous pass per frame; the only state carried across frames is
//! the two loaded models and the label table.

use crate::annotate;
use crate::classifier::{ClassifierOptions, FaceClassifier, Scorer};
use crate::detector::{FaceDetector, FaceFinder};
use crate::labels::LabelTable;
use crate::status::{StatusEvent, StatusReporter};
use crate::types::FaceReport;
use image::imageops;
use image::RgbaImage;
use thiserror::Error;

/// Label text offset from the box's top-left corner.
const LABEL_OFFSET_X: i32 = 10;
const LABEL_OFFSET_Y: i32 = 20;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("classifier: {0}")]
    Classifier(#[from] crate::classifier::ClassifierError),
}

/// The frame-processing pipeline. Owns the detector, the classifier and
/// the label table; thread-confined, processes one frame at a time.
pub struct Pipeline<D = FaceDetector, C = FaceClassifier> {
    detector: D,
    classifier: C,
    labels: LabelTable,
}

impl Pipeline {
    /// Load both models and assemble the pipeline.
    ///
    /// A classifier load failure is fatal. A cascade load failure is not:
    /// the pipeline comes up with detection permanently disabled, and the
    /// reporter is told why.
    pub fn load(
        cascade_path: &str,
        model_path: &str,
        options: &ClassifierOptions,
        reporter: &dyn StatusReporter,
    ) -> Result<Self, PipelineError> {
        let classifier = FaceClassifier::load(model_path, options)?;
        reporter.report(&StatusEvent::ClassifierLoaded {
            path: model_path.to_string(),
        });

        let detector = match FaceDetector::load(cascade_path) {
            Ok(detector) => {
                reporter.report(&StatusEvent::DetectorLoaded {
                    path: cascade_path.to_string(),
                });
                detector
            }
            Err(e) => {
                reporter.report(&StatusEvent::DetectorUnavailable {
                    path: cascade_path.to_string(),
                    reason: e.to_string(),
                });
                FaceDetector::unavailable()
            }
        };

        Ok(Self::with_parts(detector, classifier, LabelTable::celebrities()))
    }
}

impl<D: FaceFinder, C: Scorer> Pipeline<D, C> {
    /// Assemble a pipeline from already-constructed parts.
    pub fn with_parts(detector: D, classifier: C, labels: LabelTable) -> Self {
        Self {
            detector,
            classifier,
            labels,
        }
    }

    /// Process one color frame and return it annotated.
    pub fn process(&mut self, frame: RgbaImage) -> RgbaImage {
        self.process_with_report(frame).0
    }

    /// Process one color frame, returning the annotated frame plus one
    /// report per face that survived the pipeline.
    ///
    /// A face that fails to classify is logged and skipped; it gets no
    /// overlay and no report, and the rest of the frame is unaffected.
    pub fn process_with_report(&mut self, frame: RgbaImage) -> (RgbaImage, Vec<FaceReport>) {
        // Sensor-orientation correction, undone on the way out.
        let mut canvas = imageops::rotate90(&frame);
        let gray = imageops::grayscale(&canvas);

        let faces = self.detector.find(&gray);
        let (frame_w, frame_h) = canvas.dimensions();

        let mut reports = Vec::with_capacity(faces.len());
        for face in &faces {
            let Some(bbox) = face.clamped(frame_w, frame_h) else {
                tracing::warn!(?face, "skipping degenerate face box");
                continue;
            };

            let patch = imageops::crop_imm(
                &canvas,
                bbox.x as u32,
                bbox.y as u32,
                bbox.width,
                bbox.height,
            )
            .to_image();

            let score = match self.classifier.score(&patch) {
                Ok(score) => score,
                Err(e) => {
                    tracing::warn!(error = %e, ?bbox, "classification failed; skipping face");
                    continue;
                }
            };

            let label = self.labels.label_for(score).unwrap_or("");
            tracing::debug!(?bbox, score, label, "face classified");

            annotate::draw_face_box(&mut canvas, &bbox);
            annotate::draw_label(
                &mut canvas,
                bbox.x + LABEL_OFFSET_X,
                bbox.y + LABEL_OFFSET_Y,
                label,
            );

            reports.push(FaceReport {
                bbox,
                score,
                label: label.to_string(),
            });
        }

        // Exact inverse of the rotation above: the round trip is the
        // identity for any frame dimensions.
        (imageops::rotate270(&canvas), reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierError;
    use crate::types::FaceBox;
    use image::{GrayImage, Rgba};

    /// Finder that returns a fixed box list, but only when the frame it
    /// sees has the expected (rotated) dimensions.
    struct StubFinder {
        expect_dims: (u32, u32),
        boxes: Vec<FaceBox>,
    }

    impl FaceFinder for StubFinder {
        fn find(&mut self, gray: &GrayImage) -> Vec<FaceBox> {
            assert_eq!(
                gray.dimensions(),
                self.expect_dims,
                "detector must see the rotated frame"
            );
            self.boxes.clone()
        }
    }

    struct StubScorer(Result<f32, ()>);

    impl Scorer for StubScorer {
        fn score(&mut self, patch: &RgbaImage) -> Result<f32, ClassifierError> {
            assert!(patch.width() > 0 && patch.height() > 0);
            self.0.map_err(|_| ClassifierError::EmptyPatch)
        }
    }

    fn test_frame(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
        })
    }

    fn face(x: i32, y: i32, w: u32, h: u32) -> FaceBox {
        FaceBox {
            x,
            y,
            width: w,
            height: h,
            score: 4.0,
        }
    }

    #[test]
    fn test_no_faces_is_identity() {
        let frame = test_frame(40, 60);
        let mut pipeline = Pipeline::with_parts(
            StubFinder {
                expect_dims: (60, 40),
                boxes: vec![],
            },
            StubScorer(Ok(0.0)),
            LabelTable::celebrities(),
        );
        let (out, reports) = pipeline.process_with_report(frame.clone());
        assert!(reports.is_empty());
        assert_eq!(out, frame, "rotate forward + back must be the identity");
    }

    #[test]
    fn test_unavailable_detector_is_identity() {
        let frame = test_frame(33, 47);
        let mut pipeline = Pipeline::with_parts(
            FaceDetector::unavailable(),
            StubScorer(Ok(0.0)),
            LabelTable::celebrities(),
        );
        let out = pipeline.process(frame.clone());
        assert_eq!(out, frame);
    }

    #[test]
    fn test_single_face_annotated() {
        let frame = test_frame(40, 60);
        let mut pipeline = Pipeline::with_parts(
            StubFinder {
                expect_dims: (60, 40),
                boxes: vec![face(10, 5, 20, 12)],
            },
            StubScorer(Ok(11.2)),
            LabelTable::celebrities(),
        );
        let (out, reports) = pipeline.process_with_report(frame.clone());

        assert_eq!(out.dimensions(), frame.dimensions());
        assert_ne!(out, frame);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].bbox, face(10, 5, 20, 12));
        assert_eq!(reports[0].label, "Messi");

        // The box corner drawn at (10, 5) in the rotated frame lands at
        // (5, 49) after the inverse rotation of a 40x60 frame.
        assert_eq!(*out.get_pixel(5, 49), annotate::BOX_COLOR);
    }

    #[test]
    fn test_classifier_failure_skips_face() {
        let frame = test_frame(40, 60);
        let mut pipeline = Pipeline::with_parts(
            StubFinder {
                expect_dims: (60, 40),
                boxes: vec![face(10, 5, 20, 12)],
            },
            StubScorer(Err(())),
            LabelTable::celebrities(),
        );
        let (out, reports) = pipeline.process_with_report(frame.clone());
        assert!(reports.is_empty());
        assert_eq!(out, frame, "failed face must leave no overlay behind");
    }

    #[test]
    fn test_unmapped_score_draws_box_with_empty_label() {
        let frame = test_frame(40, 60);
        let mut pipeline = Pipeline::with_parts(
            StubFinder {
                expect_dims: (60, 40),
                boxes: vec![face(10, 5, 20, 12)],
            },
            StubScorer(Ok(-3.0)),
            LabelTable::celebrities(),
        );
        let (out, reports) = pipeline.process_with_report(frame.clone());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].label, "");
        assert_ne!(out, frame, "box is still drawn for an unmapped score");
    }

    #[test]
    fn test_degenerate_boxes_skipped() {
        let frame = test_frame(40, 60);
        let mut pipeline = Pipeline::with_parts(
            StubFinder {
                expect_dims: (60, 40),
                // Fully outside, and zero-width
                boxes: vec![face(500, 500, 10, 10), face(5, 5, 0, 10)],
            },
            StubScorer(Ok(3.0)),
            LabelTable::celebrities(),
        );
        let (out, reports) = pipeline.process_with_report(frame.clone());
        assert!(reports.is_empty());
        assert_eq!(out, frame);
    }

    #[test]
    fn test_out_of_bounds_box_clamped_before_crop() {
        let frame = test_frame(40, 60);
        // Box hangs off the rotated frame's right edge (60 wide)
        let mut pipeline = Pipeline::with_parts(
            StubFinder {
                expect_dims: (60, 40),
                boxes: vec![face(50, 8, 30, 20)],
            },
            StubScorer(Ok(24.0)),
            LabelTable::celebrities(),
        );
        let (_, reports) = pipeline.process_with_report(frame);
        assert_eq!(reports.len(), 1);
        let bbox = &reports[0].bbox;
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (50, 8, 10, 20));
        assert_eq!(reports[0].label, "Dhoni");
    }

    #[test]
    fn test_multiple_faces_reported_in_detector_order() {
        let frame = test_frame(60, 80);
        let mut pipeline = Pipeline::with_parts(
            StubFinder {
                expect_dims: (80, 60),
                boxes: vec![face(2, 2, 10, 10), face(30, 30, 14, 14)],
            },
            StubScorer(Ok(0.3)),
            LabelTable::celebrities(),
        );
        let (_, reports) = pipeline.process_with_report(frame);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].bbox.x, 2);
        assert_eq!(reports[1].bbox.x, 30);
        assert!(reports.iter().all(|r| r.label == "Courtney Cox"));
    }

    #[test]
    fn test_report_serializes() {
        let report = FaceReport {
            bbox: face(1, 2, 3, 4),
            score: 11.0,
            label: "Messi".to_string(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"label\":\"Messi\""));
        assert!(json.contains("\"width\":3"));
    }
}
