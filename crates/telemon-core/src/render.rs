//! The render capability consumed by the aggregator.
//!
//! Rendering is an external concern: the aggregator only needs something
//! that turns a window of snapshots into an opaque rendered view. A
//! failure is non-fatal -- the aggregator logs it and keeps the previous
//! broadcast frame current.

use telemon_types::Snapshot;

/// Errors produced by a renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The window holds no snapshots to render.
    #[error("no snapshots to render")]
    EmptyWindow,

    /// The renderer failed for an implementation-specific reason.
    #[error("render failed: {0}")]
    Failed(String),
}

/// Turn a window of snapshots (oldest first) into an opaque rendered view.
///
/// The built-in implementation emits inline SVG; anything that serializes
/// to a string the dashboard can embed works.
pub trait Renderer: Send {
    /// Render the given window.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyWindow`] for an empty window, or
    /// [`RenderError::Failed`] for implementation-specific failures.
    fn render(&self, window: &[Snapshot]) -> Result<String, RenderError>;
}
