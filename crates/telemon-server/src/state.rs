//! Shared application state for the observer server.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use telemon_core::echo::EchoClient;

use crate::hub::HubHandle;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Holds
/// the hub handle (for observer registration from the `WebSocket`
/// handler), the echo client, and a few values the status page shows.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Message streams toward the broadcast hub.
    pub hub: HubHandle,
    /// Caller-side handle for the echo rendezvous.
    pub echo: EchoClient,
    /// The configured acquisition poll interval.
    pub poll_interval: Duration,
    /// When this server instance started.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Assemble the shared state.
    #[must_use]
    pub fn new(hub: HubHandle, echo: EchoClient, poll_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            hub,
            echo,
            poll_interval,
            started_at: Utc::now(),
        })
    }

    /// Acquisition frequency in Hz, as shown on the status page.
    #[must_use]
    pub fn poll_frequency(&self) -> f64 {
        let secs = self.poll_interval.as_secs_f64();
        if secs > 0.0 { 1.0 / secs } else { 0.0 }
    }
}
