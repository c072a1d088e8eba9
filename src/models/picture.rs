//! Represents the metadata returned after a picture has been stored.

use serde::{Deserialize, Serialize};

/// Response body of `POST /api/v1/pictures`.
///
/// Built once per successful upload from what the storage backend reported;
/// nothing here is persisted by the service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UploadResponse {
    /// Filename as sent by the client.
    pub original_filename: String,

    /// Key under which the backend stored the object.
    pub object_name: String,

    /// URL the object can be fetched from.
    pub file_url: String,

    /// Stored size in bytes.
    pub size: u64,

    /// Integrity token returned by the backend.
    pub etag: String,
}
