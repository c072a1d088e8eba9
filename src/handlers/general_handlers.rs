//! General service endpoints.
//!
//! - GET /api         -> welcome message
//! - GET /api/health  -> liveness ("UP"), never performs I/O
//! - GET /api/info    -> name, version and uptime

use crate::{
    errors::AppError,
    models::general::{HealthResponse, IndexResponse, InfoResponse},
    state::AppState,
};
use axum::{Json, extract::State};
use chrono::{DateTime, TimeDelta, Utc};

pub const NOT_STARTED: &str = "Not yet started";
pub const INVALID_START_TIME: &str = "Error: Invalid start_time in app state";

/// `GET /api`
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Welcome to the Picture API!".into(),
    })
}

/// `GET /api/health`
///
/// Always answers `{"status": "UP"}`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".into(),
    })
}

/// `GET /api/info`
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: state.config.name.clone(),
        version: state.config.version.clone(),
        uptime: format_uptime(state.started_at, Utc::now()),
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::not_found("Not Found")
}

/// Render the time elapsed since `started_at` as `[N day(s), ]H:MM:SS[.ffffff]`.
///
/// Never fails: a missing start time yields [`NOT_STARTED`] and a start time
/// later than `now` yields [`INVALID_START_TIME`].
pub fn format_uptime(started_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(started_at) = started_at else {
        return NOT_STARTED.to_string();
    };
    let elapsed = now.signed_duration_since(started_at);
    if elapsed < TimeDelta::zero() {
        return INVALID_START_TIME.to_string();
    }
    format_duration(elapsed)
}

/// Same as [`format_uptime`] with the fractional seconds dropped.
pub fn format_uptime_whole_seconds(
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    match started_at {
        Some(start) if now >= start => {
            let elapsed = now.signed_duration_since(start);
            format_duration(TimeDelta::seconds(elapsed.num_seconds()))
        }
        _ => format_uptime(started_at, now),
    }
}

fn format_duration(elapsed: TimeDelta) -> String {
    let total_secs = elapsed.num_seconds();
    let micros = elapsed.subsec_nanos() / 1_000;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if days > 0 {
        let unit = if days == 1 { "day" } else { "days" };
        out.push_str(&format!("{} {}, ", days, unit));
    }
    out.push_str(&format!("{}:{:02}:{:02}", hours, minutes, seconds));
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}
