//! starspot-core — per-frame celebrity face spotting.
//!
//! A classical cascade finds faces in each frame, a single-output model
//! scores every crop, and a fixed table maps the score to a name drawn
//! back onto the frame.

pub mod annotate;
pub mod classifier;
pub mod detector;
pub mod labels;
pub mod pipeline;
pub mod status;
pub mod types;

pub use classifier::{ClassifierOptions, FaceClassifier, Scorer};
pub use detector::{FaceDetector, FaceFinder};
pub use labels::LabelTable;
pub use pipeline::Pipeline;
pub use status::{StatusEvent, StatusReporter, TracingReporter};
pub use types::{FaceBox, FaceReport};
