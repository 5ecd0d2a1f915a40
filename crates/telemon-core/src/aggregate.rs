//! The aggregator: single owner of the history and trend buffers.
//!
//! One task owns all mutable aggregation state -- serialization by
//! construction, not by locking. It consumes snapshots from the
//! acquisition loop, maintains both buffers, renders the broadcast frame,
//! and answers echo requests. The finished frame goes to the hub with a
//! non-blocking send: observers only ever need the latest frame, so there
//! is nothing to queue.

use std::time::Duration;

use chrono::Utc;
use telemon_types::{BroadcastFrame, Snapshot};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::buffer::SampleBuffer;
use crate::render::Renderer;

/// Settings for the aggregator task.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// History buffer capacity.
    pub history_capacity: usize,
    /// Trend buffer capacity.
    pub trend_capacity: usize,
    /// Interval between trend samples.
    pub trend_interval: Duration,
}

/// Aggregation state and the transitions driven by the event loop.
///
/// Kept separate from the async loop so the state machine is directly
/// unit-testable.
pub struct Aggregator<R> {
    history: SampleBuffer,
    trend: SampleBuffer,
    renderer: R,
    latest: Option<Snapshot>,
    /// Echo requesters that arrived before the first snapshot ever did.
    parked_echo: Vec<oneshot::Sender<Snapshot>>,
}

impl<R: Renderer> Aggregator<R> {
    /// Create an aggregator with empty buffers.
    pub fn new(config: &AggregatorConfig, renderer: R) -> Self {
        Self {
            history: SampleBuffer::new(config.history_capacity),
            trend: SampleBuffer::new(config.trend_capacity),
            renderer,
            latest: None,
            parked_echo: Vec::new(),
        }
    }

    /// Consume one snapshot and, if rendering succeeds, produce the next
    /// broadcast frame.
    ///
    /// The very first snapshot also seeds the trend buffer so a trend
    /// view is never empty while waiting for the first trend tick. A
    /// render failure is logged and yields `None`: the cycle is skipped
    /// and the previously broadcast frame stays current.
    pub fn on_snapshot(&mut self, snapshot: Snapshot) -> Option<BroadcastFrame> {
        self.history.push(snapshot.clone());
        if self.latest.is_none() {
            self.trend.push(snapshot.clone());
            for reply in self.parked_echo.drain(..) {
                // The requester may have timed out already; that is fine.
                let _ = reply.send(snapshot.clone());
            }
        }
        self.latest = Some(snapshot);

        let plot = match self.renderer.render(self.history.entries()) {
            Ok(rendered) => rendered,
            Err(error) => {
                warn!(%error, "history render failed; keeping previous frame");
                return None;
            }
        };
        let trends = match self.renderer.render(self.trend.entries()) {
            Ok(rendered) => rendered,
            Err(error) => {
                warn!(%error, "trend render failed; keeping previous frame");
                return None;
            }
        };

        let latest = self.latest.as_ref()?;
        Some(BroadcastFrame::new(plot, trends, Utc::now(), latest))
    }

    /// Append the most recently received snapshot to the trend buffer.
    ///
    /// No fresh read happens here; before the first snapshot this is a
    /// no-op.
    pub fn on_trend_tick(&mut self) {
        if let Some(snapshot) = &self.latest {
            self.trend.push(snapshot.clone());
        }
    }

    /// Answer an echo request with the latest-known snapshot, or park the
    /// requester until the first snapshot arrives.
    pub fn on_echo_request(&mut self, reply: oneshot::Sender<Snapshot>) {
        match &self.latest {
            Some(snapshot) => {
                let _ = reply.send(snapshot.clone());
            }
            None => self.parked_echo.push(reply),
        }
    }

    /// The retained history window, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Snapshot] {
        self.history.entries()
    }

    /// The retained trend window, oldest first.
    #[must_use]
    pub fn trend(&self) -> &[Snapshot] {
        self.trend.entries()
    }
}

/// Run the aggregator event loop until the acquisition side closes.
pub async fn run_aggregator<R>(
    config: AggregatorConfig,
    renderer: R,
    mut data_rx: mpsc::Receiver<Snapshot>,
    mut echo_rx: mpsc::Receiver<oneshot::Sender<Snapshot>>,
    frames_tx: mpsc::Sender<BroadcastFrame>,
) where
    R: Renderer,
{
    let mut aggregator = Aggregator::new(&config, renderer);
    let mut trend_tick = tokio::time::interval(config.trend_interval);
    trend_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Consume the interval's immediate first tick; the trend is seeded by
    // the first snapshot instead.
    trend_tick.tick().await;

    let mut echo_open = true;
    loop {
        tokio::select! {
            received = data_rx.recv() => match received {
                Some(snapshot) => {
                    if let Some(frame) = aggregator.on_snapshot(snapshot) {
                        match frames_tx.try_send(frame) {
                            Ok(()) => {}
                            // Hub still busy with the previous frame.
                            Err(TrySendError::Full(_)) => {}
                            Err(TrySendError::Closed(_)) => {
                                info!("hub gone; stopping aggregator");
                                break;
                            }
                        }
                    }
                }
                None => {
                    info!("acquisition channel closed; stopping aggregator");
                    break;
                }
            },
            _ = trend_tick.tick() => aggregator.on_trend_tick(),
            received = echo_rx.recv(), if echo_open => match received {
                Some(reply) => aggregator.on_echo_request(reply),
                None => echo_open = false,
            },
        }
    }
}
