//! PictureService — validates an upload, hands it to the configured storage
//! backend, resolves its URL and assembles the response.
//!
//! Storage failures are never returned raw: each one is re-signalled as a
//! `PictureError` that keeps the backend error as its source.

use crate::{
    errors::PictureError,
    models::picture::UploadResponse,
    services::storage_service::{FileStorageService, FileUpload, StorageError},
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct PictureService {
    storage: Arc<dyn FileStorageService>,
}

impl PictureService {
    pub fn new(storage: Arc<dyn FileStorageService>) -> Self {
        info!(
            "PictureService initialized with storage: {}",
            storage.provider()
        );
        Self { storage }
    }

    /// Upload `file_content` into `target_bucket` and describe the result.
    ///
    /// Fails with `InvalidInput` when the content is empty or the filename or
    /// bucket is missing (blank counts as missing), and with `Upload` when the
    /// backend fails to store the object or to produce its URL.
    pub async fn upload_file(
        &self,
        file_content: Bytes,
        original_filename: Option<&str>,
        content_type: Option<&str>,
        target_bucket: Option<&str>,
    ) -> Result<UploadResponse, PictureError> {
        info!(
            "Processing upload for file: {:?} to bucket: {:?}",
            original_filename, target_bucket
        );

        if file_content.is_empty() {
            return Err(PictureError::invalid_input("Cannot upload an empty file."));
        }
        let Some(original_filename) = original_filename.filter(|name| !name.trim().is_empty())
        else {
            return Err(PictureError::invalid_input(
                "Original filename is required for upload.",
            ));
        };
        let Some(target_bucket) = target_bucket.filter(|bucket| !bucket.trim().is_empty()) else {
            return Err(PictureError::invalid_input(
                "Target bucket must be specified.",
            ));
        };

        let file = FileUpload {
            content: file_content,
            filename: original_filename.to_string(),
            content_type: content_type.map(str::to_string),
        };

        let stored = self
            .storage
            .upload_file(file, target_bucket)
            .await
            .map_err(|err| match err {
                StorageError::InvalidFile(_) => {
                    let message = format!("Invalid file provided for upload: {}", err);
                    error!("{}", message);
                    PictureError::invalid_input_caused_by(message, err)
                }
                StorageError::Backend { .. } => {
                    let message = format!("Storage service failed during upload: {}", err);
                    error!("{}", message);
                    PictureError::upload(message, err)
                }
                StorageError::Unexpected(_) => {
                    let message = format!("Unexpected error during storage upload step: {}", err);
                    error!("{}", message);
                    PictureError::upload(message, err)
                }
            })?;
        info!(
            "File uploaded via {} to {}/{}. Size: {}, ETag: {}",
            self.storage.provider(),
            target_bucket,
            stored.object_name,
            stored.size,
            stored.etag
        );

        let file_url = self
            .storage
            .get_file_url(target_bucket, &stored.object_name)
            .map_err(|err| {
                let message = match err {
                    StorageError::Unexpected(_) => {
                        format!("Unexpected error getting file URL: {}", err)
                    }
                    _ => format!("Failed to get file URL from storage service {}", err),
                };
                error!("{}", message);
                PictureError::upload(message, err)
            })?;
        debug!("Retrieved file URL: {}", file_url);

        Ok(UploadResponse {
            original_filename: original_filename.to_string(),
            object_name: stored.object_name,
            file_url,
            size: stored.size,
            etag: stored.etag,
        })
    }
}
