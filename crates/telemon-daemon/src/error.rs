//! Error types for the Telemon daemon binary.
//!
//! [`DaemonError`] is the top-level error type that wraps all possible
//! failure modes during startup. Anything that fails here stops the
//! process before it starts serving.

/// Top-level error for the daemon binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: telemon_core::config::ConfigError,
    },

    /// The snapshot source could not be built.
    #[error("source error: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: telemon_core::sensors::SourceError,
    },

    /// The observer server failed to start.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: telemon_server::server::ServerError,
    },

    /// The bus handle could not be acquired.
    #[error("bus error: {message}")]
    Bus {
        /// Description of the bus failure.
        message: String,
    },
}
