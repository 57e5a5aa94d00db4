use thiserror::Error;

/// Errors raised by a video frame source.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("capture device unavailable: {0}")]
    Unavailable(String),
    #[error("capture io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame at line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl CaptureError {
    /// Fatal errors end the session; the rest only cost the current frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::Unavailable(_))
    }
}

/// Errors raised by a face landmark estimator.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("landmark model failed to load: {0}")]
    ModelLoad(String),
    #[error("landmark inference failed: {0}")]
    Inference(String),
}

impl EstimateError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelLoad(_))
    }
}

/// Fatal session errors. Reported once; recovery is a manual restart.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("camera error: {0}")]
    Camera(#[from] CaptureError),
    #[error("landmark model error: {0}")]
    Model(#[from] EstimateError),
}
