//! MinIO backend for `FileStorageService`, spoken to through the S3 API.
//!
//! Objects are written path-style as `{endpoint}/{bucket}/{object_name}`
//! where `object_name` is a random UUID keeping the original extension.

use crate::{
    config::MinioConfig,
    services::storage_service::{
        FileStorageService, FileUpload, StorageError, StorageResult, StoredObject,
    },
};
use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
};
use base64::{Engine as _, engine::general_purpose};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Clone, Debug)]
pub struct MinioStorageService {
    client: Client,
    /// Endpoint with scheme and without trailing slash, used for URLs.
    endpoint: String,
}

impl MinioStorageService {
    /// Build the S3 client from `cfg`. No request is sent until first use.
    pub async fn connect(cfg: &MinioConfig) -> StorageResult<Self> {
        let (Some(access_key), Some(secret_key)) = (&cfg.access_key, &cfg.secret_key) else {
            return Err(StorageError::Backend {
                message: "MINIO_ACCESS_KEY and MINIO_SECRET_KEY must be set".into(),
                source: None,
            });
        };

        let endpoint = cfg.endpoint_url();
        let credentials = Credentials::new(
            access_key.expose(),
            secret_key.expose(),
            None,
            None,
            "picture-service",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        info!("MinIO storage client configured for {}", endpoint);
        Ok(Self {
            client: Client::from_conf(s3_config),
            endpoint,
        })
    }

    /// Create `bucket` when the backend does not know it yet.
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false) =>
            {
                self.client
                    .create_bucket()
                    .bucket(bucket)
                    .send()
                    .await
                    .map_err(|err| {
                        StorageError::backend(
                            format!(
                                "creating bucket `{}` failed: {}",
                                bucket,
                                DisplayErrorContext(&err)
                            ),
                            err,
                        )
                    })?;
                info!("Created bucket {}", bucket);
                Ok(())
            }
            Err(err) => Err(StorageError::backend(
                format!(
                    "checking bucket `{}` failed: {}",
                    bucket,
                    DisplayErrorContext(&err)
                ),
                err,
            )),
        }
    }
}

#[async_trait]
impl FileStorageService for MinioStorageService {
    async fn upload_file(&self, file: FileUpload, bucket: &str) -> StorageResult<StoredObject> {
        ensure_addressable(bucket, &file.filename)?;
        if file.content.is_empty() {
            return Err(StorageError::InvalidFile("file content is empty".into()));
        }

        self.ensure_bucket(bucket).await?;

        let object_name = object_name_for(&file.filename);
        let size = file.size();
        let content_md5 = general_purpose::STANDARD.encode(md5::compute(&file.content).0);
        let content_type = file
            .content_type
            .clone()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.into());

        debug!(
            "PUT {}/{} ({} bytes, {})",
            bucket, object_name, size, content_type
        );
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(&object_name)
            .content_type(content_type)
            .content_md5(content_md5)
            .content_length(size as i64)
            .body(ByteStream::from(file.content))
            .send()
            .await
            .map_err(|err| {
                StorageError::backend(
                    format!(
                        "uploading `{}` to bucket `{}` failed: {}",
                        object_name,
                        bucket,
                        DisplayErrorContext(&err)
                    ),
                    err,
                )
            })?;

        let etag = output
            .e_tag()
            .map(|tag| tag.trim_matches('"').to_string())
            .filter(|tag| !tag.is_empty())
            .ok_or_else(|| anyhow!("backend returned no ETag for `{}`", object_name))?;

        Ok(StoredObject {
            object_name,
            etag,
            size,
        })
    }

    fn get_file_url(&self, bucket: &str, object_name: &str) -> StorageResult<String> {
        ensure_addressable(bucket, object_name)?;
        Ok(format!("{}/{}/{}", self.endpoint, bucket, object_name))
    }

    fn provider(&self) -> &'static str {
        "minio"
    }
}

fn ensure_addressable(bucket: &str, name: &str) -> StorageResult<()> {
    if bucket.trim().is_empty() {
        return Err(StorageError::InvalidFile("bucket name is empty".into()));
    }
    if name.trim().is_empty() {
        return Err(StorageError::InvalidFile("object name is empty".into()));
    }
    Ok(())
}

/// Random object key that keeps a short alphanumeric extension, lowercased.
fn object_name_for(filename: &str) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.bytes().all(|b| b.is_ascii_alphanumeric())
        });

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}
