use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Directory containing the model files.
    pub model_dir: PathBuf,
    /// Cascade parameter file name inside the model directory.
    pub cascade_file: String,
    /// Classifier model file name inside the model directory.
    pub classifier_file: String,
    /// Intra-op thread count for the inference session.
    pub intra_threads: usize,
}

impl Config {
    /// Load configuration from `STARSPOT_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            model_dir: std::env::var("STARSPOT_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models")),
            cascade_file: std::env::var("STARSPOT_CASCADE_FILE")
                .unwrap_or_else(|_| "seeta_fd_frontal_v1.0.bin".to_string()),
            classifier_file: std::env::var("STARSPOT_CLASSIFIER_FILE")
                .unwrap_or_else(|_| "celebrity.onnx".to_string()),
            intra_threads: env_usize("STARSPOT_INTRA_THREADS", 4),
        }
    }

    /// Path to the cascade parameter file.
    pub fn cascade_path(&self) -> String {
        self.model_dir
            .join(&self.cascade_file)
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the classifier model.
    pub fn classifier_path(&self) -> String {
        self.model_dir
            .join(&self.classifier_file)
            .to_string_lossy()
            .into_owned()
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
