//! Model-load status reporting.
//!
//! The pipeline announces how its two models came up through a callback the
//! caller supplies, so a host application can surface the outcome however
//! it likes (UI notification, log line, health endpoint).

/// Outcome of loading one of the pipeline's models.
#[derive(Debug, Clone)]
pub enum StatusEvent {
    /// The classifier model loaded; the pipeline is usable.
    ClassifierLoaded { path: String },
    /// The cascade detector loaded; faces will be detected.
    DetectorLoaded { path: String },
    /// The cascade detector failed to load. The pipeline still runs, but
    /// detection returns no faces for every frame.
    DetectorUnavailable { path: String, reason: String },
}

/// Callback for [`StatusEvent`]s raised during pipeline construction.
pub trait StatusReporter {
    fn report(&self, event: &StatusEvent);
}

/// Default reporter that forwards events to `tracing`.
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, event: &StatusEvent) {
        match event {
            StatusEvent::ClassifierLoaded { path } => {
                tracing::info!(path = %path, "classifier model loaded");
            }
            StatusEvent::DetectorLoaded { path } => {
                tracing::info!(path = %path, "cascade detector loaded");
            }
            StatusEvent::DetectorUnavailable { path, reason } => {
                tracing::warn!(path = %path, reason = %reason, "cascade detector unavailable; detection disabled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<StatusEvent>>);

    impl StatusReporter for Capture {
        fn report(&self, event: &StatusEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_custom_reporter_receives_events() {
        let capture = Capture(Mutex::new(Vec::new()));
        capture.report(&StatusEvent::DetectorUnavailable {
            path: "missing.bin".into(),
            reason: "no such file".into(),
        });
        let events = capture.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StatusEvent::DetectorUnavailable { .. }));
    }

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingReporter.report(&StatusEvent::ClassifierLoaded {
            path: "celebrity.onnx".into(),
        });
    }
}
