//! The periodic acquisition loop.
//!
//! Ticks at the configured poll interval, pulls one snapshot from the
//! source, and hands it to the aggregator with a non-blocking send. A
//! full channel means the aggregator is still busy with the previous
//! snapshot; the new one is dropped rather than delaying the timer. A
//! failed read is logged and the next tick retries naturally -- the tick
//! itself is the retry mechanism.

use std::time::Duration;

use telemon_types::Snapshot;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::sensors::SnapshotSource;

/// Settings for the acquisition loop.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Interval between polls.
    pub poll_interval: Duration,
    /// Log every Nth successful poll at debug level (0 disables).
    pub log_every: u64,
}

/// Run the acquisition loop until the aggregator goes away.
///
/// The source -- and with it the bus handle -- is dropped when this
/// returns, on every exit path.
pub async fn run_acquisition<S>(mut source: S, tx: mpsc::Sender<Snapshot>, config: AcquisitionConfig)
where
    S: SnapshotSource,
{
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut polls: u64 = 0;
    loop {
        ticker.tick().await;
        match source.poll() {
            Ok(snapshot) => {
                polls = polls.wrapping_add(1);
                if config.log_every > 0 && polls % config.log_every == 0 {
                    debug!(
                        polls,
                        readings = snapshot.readings.len(),
                        timestamp = %snapshot.timestamp,
                        "acquisition checkpoint"
                    );
                }
                match tx.try_send(snapshot) {
                    Ok(()) => {}
                    // Aggregator still busy; drop this snapshot.
                    Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => {
                        info!("aggregator gone; stopping acquisition");
                        break;
                    }
                }
            }
            Err(error) => {
                warn!(%error, "sensor poll failed; skipping tick");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use telemon_types::{MeasurementKind, Snapshot};
    use tokio::sync::mpsc;

    use super::{run_acquisition, AcquisitionConfig};
    use crate::sensors::{BusError, SnapshotSource, SourceError};

    /// Yields numbered snapshots; every poll bumps a shared counter, and
    /// polls listed in `fail_on` return a bus error instead.
    struct ScriptedSource {
        polls: Arc<AtomicU64>,
        fail_on: Vec<u64>,
    }

    impl SnapshotSource for ScriptedSource {
        fn poll(&mut self) -> Result<Snapshot, SourceError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&n) {
                return Err(SourceError::Read {
                    name: String::from("probe"),
                    source: BusError(String::from("nack")),
                });
            }
            let mut snap = Snapshot::new(Utc::now());
            snap.record("probe", MeasurementKind::Temperature, n as f64);
            Ok(snap)
        }
    }

    fn config() -> AcquisitionConfig {
        AcquisitionConfig {
            poll_interval: Duration::from_secs(2),
            log_every: 10,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_snapshots_each_tick() {
        let polls = Arc::new(AtomicU64::new(0));
        let source = ScriptedSource {
            polls: Arc::clone(&polls),
            fail_on: Vec::new(),
        };
        let (tx, mut rx) = mpsc::channel(8);
        let task = tokio::spawn(run_acquisition(source, tx, config()));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.readings[0].value, 1.0);
        assert_eq!(second.readings[0].value, 2.0);

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn a_failed_poll_skips_the_tick_and_continues() {
        let polls = Arc::new(AtomicU64::new(0));
        let source = ScriptedSource {
            polls: Arc::clone(&polls),
            fail_on: vec![1, 2],
        };
        let (tx, mut rx) = mpsc::channel(8);
        let task = tokio::spawn(run_acquisition(source, tx, config()));

        // Polls 1 and 2 fail; the first delivered snapshot is poll 3.
        let first = rx.recv().await.unwrap();
        assert_eq!(first.readings[0].value, 3.0);

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn drops_on_backpressure_without_blocking_the_timer() {
        let polls = Arc::new(AtomicU64::new(0));
        let source = ScriptedSource {
            polls: Arc::clone(&polls),
            fail_on: Vec::new(),
        };
        let (tx, mut rx) = mpsc::channel(1);
        let task = tokio::spawn(run_acquisition(source, tx, config()));

        // Let several ticks elapse with no consumer draining the channel.
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(polls.load(Ordering::SeqCst) >= 5, "timer must keep ticking");

        // Only the first snapshot was retained; the rest were dropped.
        let held = rx.recv().await.unwrap();
        assert_eq!(held.readings[0].value, 1.0);

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_the_aggregator_side_closes() {
        let polls = Arc::new(AtomicU64::new(0));
        let source = ScriptedSource {
            polls: Arc::clone(&polls),
            fail_on: Vec::new(),
        };
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(run_acquisition(source, tx, config()));

        drop(rx);
        // The loop notices the closed channel on its next send attempt.
        tokio::time::timeout(Duration::from_secs(10), task)
            .await
            .unwrap()
            .unwrap();
    }
}
