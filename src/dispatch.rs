//! Turns confirmed winks into scroll requests.
//!
//! The live scroll position is unreliable while a smooth scroll is animating,
//! so targets are computed from a last-known offset that a scroll listener
//! publishes out of band through a `watch` channel.

use tokio::sync::watch;
use wink_detect_wasm::ConfirmedWink;

use crate::config::ScrollConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

impl ScrollBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Instant => "instant",
        }
    }
}

/// Output capability: move the page to an absolute offset.
pub trait Scroller {
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
}

/// Creates the listener/reader pair for the last known scroll offset.
pub fn scroll_channel(initial: f64) -> (ScrollPublisher, ScrollTracker) {
    let (tx, rx) = watch::channel(initial);
    (ScrollPublisher { tx }, ScrollTracker { rx })
}

/// Held by the scroll-event subscription.
#[derive(Debug)]
pub struct ScrollPublisher {
    tx: watch::Sender<f64>,
}

impl ScrollPublisher {
    pub fn publish(&self, offset: f64) {
        self.tx.send_replace(offset);
    }
}

#[derive(Debug, Clone)]
pub struct ScrollTracker {
    rx: watch::Receiver<f64>,
}

impl ScrollTracker {
    pub fn last_known(&self) -> f64 {
        *self.rx.borrow()
    }
}

pub struct ActionDispatcher<W: Scroller> {
    scroller: W,
    tracker: ScrollTracker,
    step_px: f64,
    behavior: ScrollBehavior,
}

impl<W: Scroller> ActionDispatcher<W> {
    pub fn new(scroller: W, tracker: ScrollTracker, config: &ScrollConfig) -> Self {
        Self {
            scroller,
            tracker,
            step_px: config.step_px,
            behavior: config.behavior,
        }
    }

    /// Left scrolls up, right scrolls down, by one step from the last known
    /// offset. Returns the requested target.
    pub fn dispatch(&mut self, wink: ConfirmedWink) -> f64 {
        let from = self.tracker.last_known();
        let target = from + wink.direction().sign() * self.step_px;

        tracing::info!(
            side = wink.side.as_str(),
            from,
            target,
            behavior = self.behavior.as_str(),
            "Wink confirmed, scrolling"
        );
        self.scroller.scroll_to(target, self.behavior);
        target
    }

    pub fn scroller(&self) -> &W {
        &self.scroller
    }

    pub fn step_px(&self) -> f64 {
        self.step_px
    }
}
