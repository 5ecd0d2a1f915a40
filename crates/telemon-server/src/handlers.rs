//! HTTP endpoint handlers for the observer server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/data` | `WebSocket` broadcast frame stream |
//! | `GET` | `/echo` | One-shot JSON snapshot (echo rendezvous) |

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;
use telemon_types::Snapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// Serve a minimal HTML page showing server status and endpoints.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let freq = state.poll_frequency();
    let started = state.started_at.format("%Y-%m-%d %H:%M:%S (UTC)");

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Telemon</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 700px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        a {{ color: #58a6ff; }}
        code {{ background: #161b22; padding: 0.1rem 0.3rem; border-radius: 4px; }}
    </style>
</head>
<body>
    <h1>Telemon</h1>
    <p class="subtitle">sensor monitoring &mdash; polling at {freq:.2} Hz, up since {started}</p>
    <ul>
        <li><code>GET /data</code> &mdash; WebSocket broadcast frame stream</li>
        <li><a href="/echo"><code>GET /echo</code></a> &mdash; latest snapshot as JSON</li>
    </ul>
</body>
</html>"#
    ))
}

/// Serve the latest-known snapshot as JSON.
///
/// Blocks only before the very first snapshot ever arrives, bounded by
/// the echo timeout (twice the poll interval). A timeout surfaces as
/// HTTP 504 with a JSON error body.
pub async fn echo(State(state): State<Arc<AppState>>) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = state.echo.request().await?;
    Ok(Json(snapshot))
}
