//! HTTP handlers for picture operations.
//! Reads the multipart upload and delegates everything else to `PictureService`.

use crate::{errors::AppError, models::picture::UploadResponse, state::AppState};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use tracing::{debug, info, warn};

/// Multipart field carrying the picture.
pub const FILE_FIELD: &str = "file";

const PARSE_ERROR: &str = "There was an error parsing the body";

/// Detail returned when the upload is bigger than `MAX_UPLOAD_BYTES`.
pub fn too_large_message(max_upload_bytes: usize) -> String {
    format!(
        "Uploaded file exceeds the maximum allowed size of {} bytes",
        max_upload_bytes
    )
}

fn read_error(status: StatusCode, max_upload_bytes: usize) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(status, too_large_message(max_upload_bytes))
    } else {
        AppError::new(status, PARSE_ERROR)
    }
}

/// `POST /api/v1/pictures` — upload a picture from the `file` form field.
pub async fn upload_picture(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Rejected upload request: {}", rejection);
        AppError::bad_request(PARSE_ERROR)
    })?;
    let max_upload_bytes = state.config.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        warn!("Failed to read multipart body: {}", err);
        read_error(err.status(), max_upload_bytes)
    })? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        info!("Received upload request for file: {:?}", filename);

        let contents = field.bytes().await.map_err(|err| {
            warn!("Failed to read uploaded file {:?}: {}", filename, err);
            read_error(err.status(), max_upload_bytes)
        })?;

        // The body limit leaves room for multipart framing, so the file itself is checked here.
        if contents.len() > max_upload_bytes {
            warn!(
                "Uploaded file {:?} is {} bytes, limit is {}",
                filename,
                contents.len(),
                max_upload_bytes
            );
            return Err(read_error(StatusCode::PAYLOAD_TOO_LARGE, max_upload_bytes));
        }

        let response = state
            .pictures
            .upload_file(
                contents,
                filename.as_deref(),
                content_type.as_deref(),
                Some(state.config.upload_bucket.as_str()),
            )
            .await?;

        return Ok((StatusCode::CREATED, Json(response)));
    }

    warn!("Upload request without a `{}` field", FILE_FIELD);
    Err(AppError::bad_request(format!(
        "Form field `{}` is required",
        FILE_FIELD
    )))
}
