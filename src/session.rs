//! The per-frame scheduling loop.
//!
//! One cycle: wait for the pacing tick, acquire a frame, estimate landmarks,
//! run the frame processor synchronously, dispatch confirmed winks in order.
//! The next cycle starts only after the current one finishes, so frames are
//! never processed concurrently or out of order.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::time::{Interval, MissedTickBehavior};
use wink_detect_wasm::{FrameProcessor, LandmarkScheme, Side};

use crate::capture::{Capture, FrameSource, LandmarkEstimator};
use crate::dispatch::{ActionDispatcher, Scroller};
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Model or camera not ready yet; drives the loading indicator.
    #[default]
    Loading,
    Running,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    /// Side of the most recent confirmed wink, for the emoji swap.
    pub latest_wink: Option<Side>,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub winks_confirmed: u64,
    pub last_target: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Upper bound on cycles per second; `None` runs as fast as frames arrive.
    pub max_fps: Option<u32>,
}

impl SessionOptions {
    pub fn from_max_fps(max_fps: u32) -> Self {
        Self {
            max_fps: (max_fps > 0).then_some(max_fps),
        }
    }

    fn frame_interval(&self) -> Option<Duration> {
        self.max_fps
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)))
    }
}

enum Cycle {
    Continue,
    Ended,
}

pub struct WinkSession<Src, Est, Sch, Scr>
where
    Src: FrameSource,
    Sch: LandmarkScheme,
    Est: LandmarkEstimator<Frame = Src::Frame, Face = Sch::Face>,
    Scr: Scroller,
{
    source: Src,
    estimator: Est,
    processor: FrameProcessor<Sch>,
    dispatcher: ActionDispatcher<Scr>,
    options: SessionOptions,
    snapshot: SessionSnapshot,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    torn_down: bool,
}

impl<Src, Est, Sch, Scr> WinkSession<Src, Est, Sch, Scr>
where
    Src: FrameSource,
    Sch: LandmarkScheme,
    Est: LandmarkEstimator<Frame = Src::Frame, Face = Sch::Face>,
    Scr: Scroller,
{
    pub fn new(
        source: Src,
        estimator: Est,
        processor: FrameProcessor<Sch>,
        dispatcher: ActionDispatcher<Scr>,
        options: SessionOptions,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            source,
            estimator,
            processor,
            dispatcher,
            options,
            snapshot: SessionSnapshot::default(),
            snapshot_tx,
            torn_down: false,
        }
    }

    /// Live view of status and counters, for UI and tests.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn processor(&self) -> &FrameProcessor<Sch> {
        &self.processor
    }

    pub fn dispatcher(&self) -> &ActionDispatcher<Scr> {
        &self.dispatcher
    }

    /// Runs until the source ends, a shutdown signal arrives, or a fatal
    /// error occurs. Teardown happens exactly once on every path.
    pub async fn run(
        &mut self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<SessionSnapshot, SessionError> {
        if self.torn_down {
            tracing::warn!("Session already torn down; not re-arming");
            return Ok(self.snapshot.clone());
        }

        self.set_status(SessionStatus::Loading);
        if let Err(e) = self.startup().await {
            return Err(self.fail(e));
        }
        self.set_status(SessionStatus::Running);
        tracing::info!(
            scheme = self.processor.scheme().name(),
            threshold = self.processor.config().ear_threshold,
            consecutive_frames = self.processor.config().consecutive_frames,
            max_fps = ?self.options.max_fps,
            "Wink detection loop started"
        );

        let mut ticker = self.options.frame_interval().map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        let mut shutdown_open = true;
        loop {
            let outcome = tokio::select! {
                biased;
                signal = shutdown.recv(), if shutdown_open => match signal {
                    Err(RecvError::Closed) => {
                        // 所有发送端已释放，之后只能靠帧源结束
                        shutdown_open = false;
                        Some(Ok(Cycle::Continue))
                    }
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        tracing::info!("Shutdown requested, stopping detection loop");
                        None
                    }
                },
                cycle = self.cycle(ticker.as_mut()) => Some(cycle),
            };

            match outcome {
                None => break,
                Some(Ok(Cycle::Continue)) => {}
                Some(Ok(Cycle::Ended)) => {
                    tracing::info!("Frame source ended");
                    break;
                }
                Some(Err(e)) => return Err(self.fail(e)),
            }
        }

        self.teardown();
        Ok(self.snapshot.clone())
    }

    async fn startup(&mut self) -> Result<(), SessionError> {
        self.estimator.load().await?;
        tracing::info!("Landmark model loaded");
        self.source.start().await?;
        tracing::info!("Frame source started");
        Ok(())
    }

    async fn cycle(&mut self, ticker: Option<&mut Interval>) -> Result<Cycle, SessionError> {
        if let Some(ticker) = ticker {
            ticker.tick().await;
        }

        let frame = match self.source.next_frame().await {
            Ok(Capture::Frame(frame)) => frame,
            Ok(Capture::NotReady) => {
                tracing::trace!("Frame not ready, skipping");
                self.skip();
                return Ok(Cycle::Continue);
            }
            Ok(Capture::Ended) => return Ok(Cycle::Ended),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Frame capture failed, skipping");
                self.skip();
                return Ok(Cycle::Continue);
            }
        };

        if !self.estimator.is_ready() {
            tracing::debug!("Landmark model not ready, skipping frame");
            self.snapshot.status = SessionStatus::Loading;
            self.skip();
            return Ok(Cycle::Continue);
        }

        let faces = match self.estimator.estimate(&frame).await {
            Ok(faces) => faces,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Landmark estimation failed, skipping");
                self.skip();
                return Ok(Cycle::Continue);
            }
        };

        let confirmed = self.processor.process_frame(&faces);
        tracing::trace!(report = ?self.processor.last_report(), "Frame processed");

        for wink in confirmed {
            let target = self.dispatcher.dispatch(wink);
            self.snapshot.latest_wink = Some(wink.side);
            self.snapshot.last_target = Some(target);
            self.snapshot.winks_confirmed += 1;
        }

        self.snapshot.status = SessionStatus::Running;
        self.snapshot.frames_processed += 1;
        self.publish();
        Ok(Cycle::Continue)
    }

    fn skip(&mut self) {
        self.snapshot.frames_skipped += 1;
        self.publish();
    }

    fn set_status(&mut self, status: SessionStatus) {
        self.snapshot.status = status;
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot.clone());
    }

    fn fail(&mut self, error: SessionError) -> SessionError {
        tracing::error!(error = %error, "Wink session failed");
        self.set_status(SessionStatus::Failed);
        self.teardown();
        error
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.source.stop();
        if self.snapshot.status != SessionStatus::Failed {
            self.set_status(SessionStatus::Stopped);
        }
        tracing::info!(
            frames_processed = self.snapshot.frames_processed,
            frames_skipped = self.snapshot.frames_skipped,
            winks_confirmed = self.snapshot.winks_confirmed,
            "Wink session torn down"
        );
    }
}

impl<Src, Est, Sch, Scr> Drop for WinkSession<Src, Est, Sch, Scr>
where
    Src: FrameSource,
    Sch: LandmarkScheme,
    Est: LandmarkEstimator<Frame = Src::Frame, Face = Sch::Face>,
    Scr: Scroller,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
