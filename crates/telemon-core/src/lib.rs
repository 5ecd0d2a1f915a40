//! Core acquisition and aggregation logic for the Telemon sensor monitor.
//!
//! This crate owns everything between the physical bus and the broadcast
//! hub:
//!
//! - [`sensors`] -- the sensor descriptor model, the [`SensorBus`]
//!   device capability, and the [`BusSource`] snapshot source built from
//!   configured descriptors
//! - [`buffer`] -- the bounded [`SampleBuffer`] with halving compaction,
//!   used for both the short-horizon history and the long-horizon trend
//! - [`acquire`] -- the periodic acquisition loop
//! - [`aggregate`] -- the single-owner aggregator task that maintains the
//!   buffers, renders broadcast frames, and serves echo requests
//! - [`echo`] -- the bounded-wait synchronous snapshot rendezvous
//! - [`render`] -- the render capability seam consumed by the aggregator
//! - [`config`] -- typed YAML configuration and validation
//!
//! # Concurrency model
//!
//! Every piece of mutable state is confined to exactly one task and all
//! cross-task handoffs go through bounded channels. Producer-side sends
//! are non-blocking with drop-on-full semantics (acquisition to
//! aggregator, aggregator to hub) so a slow consumer never stalls a
//! faster producer. The one exception is the echo rendezvous, a
//! bounded-wait synchronous exchange with an explicit timeout.
//!
//! [`SensorBus`]: sensors::SensorBus
//! [`BusSource`]: sensors::BusSource
//! [`SampleBuffer`]: buffer::SampleBuffer

pub mod acquire;
pub mod aggregate;
pub mod buffer;
pub mod config;
pub mod echo;
pub mod render;
pub mod sensors;

// Re-export primary types for convenience.
pub use acquire::{run_acquisition, AcquisitionConfig};
pub use aggregate::{run_aggregator, Aggregator, AggregatorConfig};
pub use buffer::SampleBuffer;
pub use config::{ConfigError, TelemonConfig};
pub use echo::{echo_channel, EchoClient, EchoError};
pub use render::{RenderError, Renderer};
pub use sensors::{BusSource, SensorBus, SensorDescriptor, SensorModel, SnapshotSource, SourceError};
