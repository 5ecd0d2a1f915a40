//! Shared type definitions for the Telemon sensor monitor.
//!
//! This crate is the single source of truth for the data model shared
//! across the Telemon workspace: measurement kinds, individual readings,
//! immutable snapshots, and the broadcast frame pushed to connected
//! dashboard observers.
//!
//! # Modules
//!
//! - [`kind`] -- The closed enumeration of measurement kinds
//! - [`snapshot`] -- Readings and immutable timestamped snapshots
//! - [`frame`] -- The JSON frame broadcast to every observer

pub mod frame;
pub mod kind;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use frame::BroadcastFrame;
pub use kind::MeasurementKind;
pub use snapshot::{Reading, Snapshot};
