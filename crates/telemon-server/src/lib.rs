//! Observer surface for the Telemon sensor monitor.
//!
//! This crate provides the Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/data`) streaming every broadcast frame
//!   to connected dashboard observers
//! - **Echo endpoint** (`/echo`) for a one-shot JSON snapshot via the
//!   bounded-wait echo rendezvous
//! - **Minimal HTML status page** (`GET /`) showing the poll frequency
//!   and available endpoints
//!
//! # Architecture
//!
//! Observer membership lives in the [`Registry`], owned exclusively by
//! the hub task ([`hub::run_hub`]): registration, unregistration, and
//! frame dispatch all arrive as messages, so no other task ever touches
//! the member set. Each observer gets a private bounded outbound queue;
//! a frame is serialized exactly once and enqueued non-blockingly onto
//! every queue, and an observer whose queue is saturated is evicted on
//! the spot. One stalled consumer never delays the rest.
//!
//! [`Registry`]: hub::Registry

pub mod error;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use hub::{hub_channel, run_hub, HubHandle, Observer, Registry};
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
