//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that reports the
//! state of the sensor bridge link.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sensors_exporter::LinkHealth;
use serde::Deserialize;
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;

/// Query parameters for /health.
#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    /// "json" for a JSON body, plain text otherwise.
    pub format: Option<String>,
}

/// Formats an uptime in seconds as e.g. `1d 2h 3m 4s`.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / SECONDS_PER_DAY;
    let hours = (secs % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = secs % SECONDS_PER_MINUTE;
    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else {
        format!("{}h {}m {}s", hours, minutes, seconds)
    }
}

/// Handler for the /health endpoint.
///
/// Returns 200 while a session with the bridge is open, 503 otherwise.
#[instrument(skip(state))]
pub async fn health_handler(
    State(state): State<SharedState>,
    Query(query): Query<HealthQuery>,
) -> Response {
    debug!("Processing /health request");

    let health = state.link_status.get_health();
    let status = if health.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    debug!("Health check: {} - {}", status, health.status);

    if query.format.as_deref() == Some("json") {
        return (status, Json(health)).into_response();
    }

    let uptime = format_uptime(state.start_time.elapsed().as_secs());
    let source = state.config.link_config().address;
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        render_link_health(&health, &source, &uptime),
    )
        .into_response()
}

/// Renders link health as a plain-text table.
fn render_link_health(health: &LinkHealth, source: &str, uptime: &str) -> String {
    let never = || "never".to_string();
    let mut out = String::new();
    writeln!(out, "{}", health.status.to_uppercase()).ok();
    writeln!(out).ok();
    writeln!(out, "Uptime: {}", uptime).ok();
    writeln!(out).ok();
    writeln!(out, "SENSOR LINK").ok();
    writeln!(out, "===========").ok();
    writeln!(out, "{:20} | {}", "Source", source).ok();
    writeln!(out, "{:20} | {}", "Connected", health.connected).ok();
    writeln!(out, "{:20} | {}", "Connection", health.connection_number).ok();
    writeln!(
        out,
        "{:20} | {}",
        "Last connected",
        health.last_connected.map(|t| t.to_rfc3339()).unwrap_or_else(never)
    )
    .ok();
    writeln!(
        out,
        "{:20} | {}",
        "Last sample",
        health.last_sample.map(|t| t.to_rfc3339()).unwrap_or_else(never)
    )
    .ok();
    writeln!(
        out,
        "{:20} | {}",
        "Last error",
        health.last_error.as_deref().unwrap_or("-")
    )
    .ok();
    out
}
