//! Headless driver: replays recorded landmark frames through a full session.
//!
//! A recording is JSON Lines, one frame per line:
//!
//! ```text
//! {"faces": [{"mesh": [[x, y, z], ...]}]}
//! {"faces": [{"leftUpper": [...], "leftLower": [...], "rightUpper": [...], "rightLower": [...]}]}
//! {"faces": []}
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use wink_detect_wasm::{FaceKeypoints, FrameProcessor, LandmarkModel};

use crate::capture::{Capture, FrameSource, LandmarkEstimator};
use crate::config::Config;
use crate::constants::INITIAL_SCROLL_OFFSET;
use crate::dispatch::{
    scroll_channel, ActionDispatcher, ScrollBehavior, ScrollPublisher, Scroller,
};
use crate::error::{CaptureError, EstimateError};
use crate::session::{SessionOptions, WinkSession};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedFrame {
    #[serde(default)]
    pub timestamp_ms: Option<f64>,
    #[serde(default)]
    pub faces: Vec<FaceKeypoints>,
}

/// Frame source backed by a recording on disk.
#[derive(Debug)]
pub struct ReplaySource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
    stopped: bool,
}

impl ReplaySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: None,
            line_no: 0,
            stopped: false,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl FrameSource for ReplaySource {
    type Frame = RecordedFrame;

    async fn start(&mut self) -> Result<(), CaptureError> {
        let file = File::open(&self.path).await.map_err(|e| {
            let target = self.path.display().to_string();
            match e.kind() {
                ErrorKind::PermissionDenied => CaptureError::PermissionDenied(target),
                _ => CaptureError::Unavailable(format!("{target}: {e}")),
            }
        })?;
        self.lines = Some(BufReader::new(file).lines());
        tracing::info!(path = %self.path.display(), "Replaying recorded frames");
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Capture<RecordedFrame>, CaptureError> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(if self.stopped {
                Capture::Ended
            } else {
                Capture::NotReady
            });
        };

        loop {
            let Some(line) = lines.next_line().await? else {
                return Ok(Capture::Ended);
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(&line)
                .map(Capture::Frame)
                .map_err(|source| CaptureError::Malformed {
                    line: self.line_no,
                    source,
                });
        }
    }

    fn stop(&mut self) {
        self.lines = None;
        self.stopped = true;
        tracing::info!(lines_read = self.line_no, "Replay source stopped");
    }
}

/// Estimator that hands back the faces stored in each recorded frame.
#[derive(Debug, Default)]
pub struct RecordedLandmarks {
    loaded: bool,
}

impl LandmarkEstimator for RecordedLandmarks {
    type Frame = RecordedFrame;
    type Face = FaceKeypoints;

    async fn load(&mut self) -> Result<(), EstimateError> {
        self.loaded = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.loaded
    }

    async fn estimate(
        &mut self,
        frame: &RecordedFrame,
    ) -> Result<Vec<FaceKeypoints>, EstimateError> {
        Ok(frame.faces.clone())
    }
}

/// Scroller with no page behind it: logs each request and reports the target
/// back as the new offset, standing in for the page's scroll listener.
#[derive(Debug)]
pub struct LoggingScroller {
    publisher: ScrollPublisher,
    requests: u64,
}

impl LoggingScroller {
    pub fn new(publisher: ScrollPublisher) -> Self {
        Self {
            publisher,
            requests: 0,
        }
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl Scroller for LoggingScroller {
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.requests += 1;
        tracing::debug!(top, behavior = behavior.as_str(), "Scroll requested");
        self.publisher.publish(top);
    }
}

pub type ReplaySession =
    WinkSession<ReplaySource, RecordedLandmarks, LandmarkModel, LoggingScroller>;

/// Wires a replay session from configuration.
pub fn replay_session(config: &Config) -> ReplaySession {
    let (publisher, tracker) = scroll_channel(INITIAL_SCROLL_OFFSET);
    WinkSession::new(
        ReplaySource::new(&config.replay_path),
        RecordedLandmarks::default(),
        FrameProcessor::new(config.landmark_model, config.detection),
        ActionDispatcher::new(LoggingScroller::new(publisher), tracker, &config.scroll),
        SessionOptions::from_max_fps(config.max_fps),
    )
}
