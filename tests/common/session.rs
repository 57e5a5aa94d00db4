use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wink_scroll::capture::{Capture, FrameSource, LandmarkEstimator};
use wink_scroll::config::ScrollConfig;
use wink_scroll::detect::{DetectionConfig, EyePair, FrameProcessor, SixPointScheme};
use wink_scroll::dispatch::{
    scroll_channel, ActionDispatcher, ScrollBehavior, ScrollPublisher, Scroller,
};
use wink_scroll::error::{CaptureError, EstimateError};
use wink_scroll::session::{SessionOptions, WinkSession};

/// A frame whose estimation either yields these faces or fails transiently.
pub type ScriptedFrame = Result<Vec<EyePair>, String>;

pub enum Step {
    Frame(ScriptedFrame),
    NotReady,
    CaptureFailure(CaptureError),
}

pub struct ScriptedSource {
    steps: VecDeque<Step>,
    start_error: Option<CaptureError>,
    /// Suspend forever after the script runs out instead of ending.
    hang_when_empty: bool,
    stops: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            start_error: None,
            hang_when_empty: false,
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn frames(frames: impl IntoIterator<Item = EyePair>) -> Self {
        Self::new(frames.into_iter().map(|pair| Step::Frame(Ok(vec![pair]))))
    }

    pub fn failing_start(mut self, error: CaptureError) -> Self {
        self.start_error = Some(error);
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang_when_empty = true;
        self
    }

    pub fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }
}

impl FrameSource for ScriptedSource {
    type Frame = ScriptedFrame;

    async fn start(&mut self) -> Result<(), CaptureError> {
        if let Some(err) = self.start_error.take() {
            return Err(err);
        }
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Capture<ScriptedFrame>, CaptureError> {
        match self.steps.pop_front() {
            Some(Step::Frame(frame)) => Ok(Capture::Frame(frame)),
            Some(Step::NotReady) => Ok(Capture::NotReady),
            Some(Step::CaptureFailure(err)) => Err(err),
            None if self.hang_when_empty => std::future::pending().await,
            None => Ok(Capture::Ended),
        }
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct ScriptedEstimator {
    load_error: Option<EstimateError>,
    loaded: bool,
    /// Readiness checks answered "not ready" after loading.
    warmup_checks: Cell<usize>,
    estimates: usize,
}

impl ScriptedEstimator {
    pub fn failing_load(message: &str) -> Self {
        Self {
            load_error: Some(EstimateError::ModelLoad(message.to_string())),
            ..Self::default()
        }
    }

    pub fn warming_up(checks: usize) -> Self {
        Self {
            warmup_checks: Cell::new(checks),
            ..Self::default()
        }
    }

    pub fn estimates(&self) -> usize {
        self.estimates
    }
}

impl LandmarkEstimator for ScriptedEstimator {
    type Frame = ScriptedFrame;
    type Face = EyePair;

    async fn load(&mut self) -> Result<(), EstimateError> {
        if let Some(err) = self.load_error.take() {
            return Err(err);
        }
        self.loaded = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        if !self.loaded {
            return false;
        }
        let remaining = self.warmup_checks.get();
        if remaining > 0 {
            self.warmup_checks.set(remaining - 1);
            return false;
        }
        true
    }

    async fn estimate(&mut self, frame: &ScriptedFrame) -> Result<Vec<EyePair>, EstimateError> {
        self.estimates += 1;
        frame.clone().map_err(EstimateError::Inference)
    }
}

/// Records each request and echoes it back as the settled offset.
pub struct RecordingScroller {
    publisher: ScrollPublisher,
    pub requests: Vec<(f64, ScrollBehavior)>,
}

impl RecordingScroller {
    pub fn targets(&self) -> Vec<f64> {
        self.requests.iter().map(|(top, _)| *top).collect()
    }
}

impl Scroller for RecordingScroller {
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.requests.push((top, behavior));
        self.publisher.publish(top);
    }
}

pub type TestSession =
    WinkSession<ScriptedSource, ScriptedEstimator, SixPointScheme, RecordingScroller>;

pub struct SessionBuilder {
    source: ScriptedSource,
    estimator: ScriptedEstimator,
    detection: DetectionConfig,
    initial_offset: f64,
    max_fps: Option<u32>,
}

impl SessionBuilder {
    pub fn new(source: ScriptedSource) -> Self {
        Self {
            source,
            estimator: ScriptedEstimator::default(),
            detection: DetectionConfig {
                ear_threshold: 0.22,
                consecutive_frames: 3,
            },
            initial_offset: 0.0,
            max_fps: None,
        }
    }

    pub fn estimator(mut self, estimator: ScriptedEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn consecutive_frames(mut self, frames: u32) -> Self {
        self.detection.consecutive_frames = frames;
        self
    }

    pub fn initial_offset(mut self, offset: f64) -> Self {
        self.initial_offset = offset;
        self
    }

    pub fn max_fps(mut self, fps: u32) -> Self {
        self.max_fps = Some(fps);
        self
    }

    pub fn build(self) -> TestSession {
        let (publisher, tracker) = scroll_channel(self.initial_offset);
        let scroller = RecordingScroller {
            publisher,
            requests: Vec::new(),
        };
        let scroll = ScrollConfig {
            step_px: 120.0,
            behavior: ScrollBehavior::Smooth,
        };
        WinkSession::new(
            self.source,
            self.estimator,
            FrameProcessor::new(SixPointScheme, self.detection),
            ActionDispatcher::new(scroller, tracker, &scroll),
            SessionOptions {
                max_fps: self.max_fps,
            },
        )
    }
}
