//! src/services/storage_service.rs
//!
//! The storage seam of the service: the `FileStorageService` trait the
//! picture workflow talks to, the records exchanged through it, and the
//! factory that picks a backend from configuration.

use crate::{
    config::AppConfig,
    errors::{BoxError, PictureError},
    services::minio_storage::MinioStorageService,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Payload handed to a storage backend.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub content: Bytes,
    pub filename: String,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// What the backend reports after storing an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub object_name: String,
    pub etag: String,
    pub size: u64,
}

#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend was reachable but refused or failed the operation.
    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// The file or its addressing is not acceptable to the backend.
    #[error("invalid file: {0}")]
    InvalidFile(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl StorageError {
    pub fn backend(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage operations needed by the picture workflow.
///
/// Implementations are built once at startup and shared by every request,
/// so they must be safe to use concurrently without locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorageService: Send + Sync {
    /// Store `file` in `bucket`, returning the generated key, ETag and size.
    async fn upload_file(&self, file: FileUpload, bucket: &str) -> StorageResult<StoredObject>;

    /// Public URL of `object_name` inside `bucket`.
    fn get_file_url(&self, bucket: &str, object_name: &str) -> StorageResult<String>;

    /// Short backend name used in logs.
    fn provider(&self) -> &'static str;
}

/// Build the storage backend selected by `FILE_STORAGE_PROVIDER`.
pub async fn build_storage_service(
    cfg: &AppConfig,
) -> Result<Arc<dyn FileStorageService>, PictureError> {
    let provider = cfg.file_storage_provider.as_str();
    info!("Creating storage service based on provider: {}", provider);

    match provider {
        "minio" => match MinioStorageService::connect(&cfg.minio).await {
            Ok(service) => Ok(Arc::new(service)),
            Err(err) => {
                let message = format!(
                    "Failed to initialize storage service provider '{}': {}",
                    provider, err
                );
                error!("{}", message);
                Err(PictureError::picture(message, err))
            }
        },
        other => {
            let message = format!("Unsupported file storage provider: {}", other);
            error!("{}", message);
            Err(PictureError::Picture {
                message,
                source: None,
            })
        }
    }
}
