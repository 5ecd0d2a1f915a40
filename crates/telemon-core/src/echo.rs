//! The echo rendezvous: a one-shot synchronous request for the latest
//! snapshot, bounded by a timeout.
//!
//! # Semantics
//!
//! Echo returns the **latest-known** snapshot -- it never forces a fresh
//! bus read, so the answer may be up to one poll interval old. Before the
//! very first snapshot ever arrives the request waits (the aggregator
//! parks it and fulfils it on arrival), bounded by the same timeout. The
//! timeout is set to twice the poll interval: long enough to span one
//! missed tick, short enough to bound caller latency. Retry policy, if
//! any, belongs to the caller.

use std::time::Duration;

use telemon_types::Snapshot;
use tokio::sync::{mpsc, oneshot};

/// Capacity of the request channel toward the aggregator.
///
/// Requests are tiny (a reply handle); a small buffer absorbs bursts
/// without ever letting callers queue up meaningfully.
const ECHO_REQUEST_CAPACITY: usize = 16;

/// Errors surfaced to an echo caller.
#[derive(Debug, thiserror::Error)]
pub enum EchoError {
    /// No snapshot arrived within the timeout window.
    #[error("timed out after {timeout:?} waiting for a snapshot")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The aggregator is no longer running.
    #[error("aggregator is not running")]
    Closed,
}

/// Caller-side handle for the echo rendezvous.
#[derive(Debug, Clone)]
pub struct EchoClient {
    requests: mpsc::Sender<oneshot::Sender<Snapshot>>,
    timeout: Duration,
}

impl EchoClient {
    /// Request the latest-known snapshot.
    ///
    /// # Errors
    ///
    /// [`EchoError::Timeout`] if nothing arrives within the configured
    /// window; [`EchoError::Closed`] if the aggregator has shut down.
    pub async fn request(&self) -> Result<Snapshot, EchoError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(reply_tx)
            .await
            .map_err(|_| EchoError::Closed)?;
        match tokio::time::timeout(self.timeout, reply_rx).await {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(_)) => Err(EchoError::Closed),
            Err(_) => Err(EchoError::Timeout {
                timeout: self.timeout,
            }),
        }
    }

    /// The timeout applied to each request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Create the echo request channel.
///
/// Returns the caller-side [`EchoClient`] and the receiver the
/// aggregator selects on. `timeout` should be twice the poll interval.
#[must_use]
pub fn echo_channel(
    timeout: Duration,
) -> (EchoClient, mpsc::Receiver<oneshot::Sender<Snapshot>>) {
    let (tx, rx) = mpsc::channel(ECHO_REQUEST_CAPACITY);
    (
        EchoClient {
            requests: tx,
            timeout,
        },
        rx,
    )
}
