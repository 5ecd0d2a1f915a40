//! The JSON frame broadcast to every connected observer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// One render-ready update pushed to all dashboard observers.
///
/// `plot` and `trends` are opaque rendered images (the built-in renderer
/// emits inline SVG); `data` is the latest snapshot as an aligned text
/// table. The frame is serialized exactly once per broadcast and the
/// resulting bytes are fanned out to every observer queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastFrame {
    /// Rendered short-horizon (history) view.
    pub plot: String,
    /// Rendered long-horizon (trend) view.
    pub trends: String,
    /// Human-readable timestamp of this update.
    pub update: String,
    /// The latest readings as an aligned text table.
    pub data: String,
}

impl BroadcastFrame {
    /// Assemble a frame from rendered views and the snapshot they reflect.
    #[must_use]
    pub fn new(plot: String, trends: String, update: DateTime<Utc>, latest: &Snapshot) -> Self {
        Self {
            plot,
            trends,
            update: update.format("%Y-%m-%d %H:%M:%S (UTC)").to_string(),
            data: latest.text_table(),
        }
    }
}
