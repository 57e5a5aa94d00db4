//! Input capabilities consumed by a wink session: a live video frame source
//! and a face landmark estimator. Both are external collaborators; the
//! session only drives them.

use crate::error::{CaptureError, EstimateError};

/// Result of asking a source for its current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture<T> {
    Frame(T),
    /// No decoded frame yet; the cycle is skipped.
    NotReady,
    /// The stream is over; the session ends normally.
    Ended,
}

#[allow(async_fn_in_trait)]
pub trait FrameSource {
    type Frame;

    /// Acquires the device. Errors here are fatal.
    async fn start(&mut self) -> Result<(), CaptureError>;

    /// Yields the current frame, suspending until one is available.
    async fn next_frame(&mut self) -> Result<Capture<Self::Frame>, CaptureError>;

    /// Releases the device. Called exactly once by the session.
    fn stop(&mut self);
}

#[allow(async_fn_in_trait)]
pub trait LandmarkEstimator {
    type Frame;
    type Face;

    /// Loads the model. Errors here are fatal.
    async fn load(&mut self) -> Result<(), EstimateError>;

    fn is_ready(&self) -> bool;

    /// Returns zero or more faces found in `frame`.
    async fn estimate(&mut self, frame: &Self::Frame) -> Result<Vec<Self::Face>, EstimateError>;
}
