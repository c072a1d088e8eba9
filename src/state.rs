//! Shared state handed to every handler.

use crate::{config::AppConfig, services::picture_service::PictureService};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Cheap to clone; everything inside is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pictures: PictureService,
    /// Recorded when the listener is up; `None` until then.
    pub started_at: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, pictures: PictureService) -> Self {
        Self {
            config,
            pictures,
            started_at: None,
        }
    }

    /// Same state, marked as started at `at`.
    pub fn started(self, at: DateTime<Utc>) -> Self {
        Self {
            started_at: Some(at),
            ..self
        }
    }
}
