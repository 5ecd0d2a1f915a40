//! The broadcast hub and its observer registry.
//!
//! The hub task is the single point of truth for observer membership. It
//! selects over three message streams -- registrations, unregistrations,
//! and finished broadcast frames -- and is the only code that ever reads
//! or writes the member set. Dispatch serializes a frame exactly once
//! and attempts a non-blocking enqueue onto every member's bounded
//! queue; a member whose queue is full is evicted immediately, so one
//! stalled observer never delays delivery to any other.

use std::collections::HashMap;

use telemon_types::BroadcastFrame;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Capacity of each observer's private outbound queue.
pub const OBSERVER_QUEUE_CAPACITY: usize = 256;

/// Capacity of the registration and unregistration channels.
const CONTROL_CAPACITY: usize = 16;

/// A connected observer: an opaque identity plus the sending half of its
/// bounded outbound queue. The transport layer drains the receiving half.
#[derive(Debug)]
pub struct Observer {
    /// Opaque connection identity.
    pub id: Uuid,
    queue: mpsc::Sender<Vec<u8>>,
}

impl Observer {
    /// Create an observer with the default queue capacity.
    ///
    /// Returns the observer (to hand to the hub) and the receiving half
    /// of its queue (for the transport to drain).
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<Vec<u8>>) {
        Self::with_queue_capacity(OBSERVER_QUEUE_CAPACITY)
    }

    /// Create an observer with an explicit queue capacity.
    #[must_use]
    pub fn with_queue_capacity(capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                id: Uuid::new_v4(),
                queue: tx,
            },
            rx,
        )
    }
}

/// The authoritative set of currently-connected observers.
///
/// Single-writer by construction: only the hub task holds a `Registry`.
/// Kept separate from the event loop so the dispatch and eviction rules
/// are directly unit-testable.
#[derive(Debug, Default)]
pub struct Registry {
    members: HashMap<Uuid, mpsc::Sender<Vec<u8>>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the member set.
    pub fn register(&mut self, observer: Observer) {
        info!(id = %observer.id, "observer registered");
        self.members.insert(observer.id, observer.queue);
    }

    /// Remove an observer, closing its outbound queue.
    ///
    /// No-op if the observer was already evicted.
    pub fn unregister(&mut self, id: Uuid) {
        if self.members.remove(&id).is_some() {
            info!(%id, "observer disconnected");
        }
    }

    /// Broadcast a frame to every member.
    ///
    /// Serializes the frame exactly once and enqueues the bytes
    /// non-blockingly onto each member's queue. Members whose queue is
    /// saturated (or already closed) are evicted. Returns the number of
    /// members the frame was delivered to.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the frame cannot be encoded;
    /// the member set is untouched in that case.
    pub fn dispatch(&mut self, frame: &BroadcastFrame) -> Result<usize, serde_json::Error> {
        if self.members.is_empty() {
            return Ok(0);
        }
        let bytes = serde_json::to_vec(frame)?;

        let mut evicted = Vec::new();
        let mut delivered = 0;
        for (id, queue) in &self.members {
            match queue.try_send(bytes.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_) | TrySendError::Closed(_)) => evicted.push(*id),
            }
        }
        for id in evicted {
            // Dropping the sender closes the queue; the observer just
            // sees its stream end, with no reason delivered.
            self.members.remove(&id);
            warn!(%id, "observer queue saturated; evicted");
        }
        Ok(delivered)
    }

    /// Number of current members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the registry has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the given observer is currently a member.
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.members.contains_key(&id)
    }
}

/// Cloneable sending side of the hub's three message streams.
#[derive(Debug, Clone)]
pub struct HubHandle {
    /// Register a new observer.
    pub register_tx: mpsc::Sender<Observer>,
    /// Unregister a disconnected observer.
    pub unregister_tx: mpsc::Sender<Uuid>,
    /// Deliver a finished broadcast frame (capacity 1; the producer
    /// drops on full -- observers only need the latest frame).
    pub frames_tx: mpsc::Sender<BroadcastFrame>,
}

/// Receiving side of the hub's message streams, consumed by [`run_hub`].
#[derive(Debug)]
pub struct HubInbox {
    register_rx: mpsc::Receiver<Observer>,
    unregister_rx: mpsc::Receiver<Uuid>,
    frames_rx: mpsc::Receiver<BroadcastFrame>,
}

/// Create the hub message channels.
#[must_use]
pub fn hub_channel() -> (HubHandle, HubInbox) {
    let (register_tx, register_rx) = mpsc::channel(CONTROL_CAPACITY);
    let (unregister_tx, unregister_rx) = mpsc::channel(CONTROL_CAPACITY);
    let (frames_tx, frames_rx) = mpsc::channel(1);
    (
        HubHandle {
            register_tx,
            unregister_tx,
            frames_tx,
        },
        HubInbox {
            register_rx,
            unregister_rx,
            frames_rx,
        },
    )
}

/// Run the hub event loop until every handle is gone.
///
/// All registry mutation happens inside this loop.
pub async fn run_hub(mut inbox: HubInbox) {
    let mut registry = Registry::new();
    loop {
        tokio::select! {
            received = inbox.register_rx.recv() => match received {
                Some(observer) => registry.register(observer),
                None => break,
            },
            received = inbox.unregister_rx.recv() => match received {
                Some(id) => registry.unregister(id),
                None => break,
            },
            received = inbox.frames_rx.recv() => match received {
                Some(frame) => match registry.dispatch(&frame) {
                    Ok(delivered) => debug!(delivered, observers = registry.len(), "frame dispatched"),
                    Err(error) => warn!(%error, "frame serialization failed; skipping broadcast"),
                },
                None => break,
            },
        }
    }
    info!("hub stopped");
}
