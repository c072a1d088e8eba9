//! Bodies of the general (non-picture) endpoints.

use serde::{Deserialize, Serialize};

/// `GET /api`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IndexResponse {
    pub message: String,
}

/// `GET /api/health`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

/// `GET /api/info`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InfoResponse {
    /// Configured service name.
    pub name: String,

    /// Deployed version identifier.
    pub version: String,

    /// Time since start, e.g. `0:15:32.548123` or `3 days, 2:05:55`.
    pub uptime: String,
}
