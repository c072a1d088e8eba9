//! Defines routes for the picture service.
//!
//! ## Structure
//! - **General endpoints**
//!   - `GET  /api`         — welcome message
//!   - `GET  /api/health`  — liveness
//!   - `GET  /api/info`    — name, version, uptime
//!
//! - **Picture endpoints**
//!   - `POST /api/v1/pictures` — multipart upload (`file` field)
//!
//! Anything else answers 404 with a JSON body.

use crate::{
    handlers::{
        general_handlers::{health, index, info, not_found},
        picture_handlers::upload_picture,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue},
    routing::{get, post},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub const ROOT_PATH: &str = "/api";
pub const HEALTH_PATH: &str = "/api/health";
pub const INFO_PATH: &str = "/api/info";
pub const PICTURES_PATH_V1: &str = "/api/v1/pictures";

/// Headers attached to every response.
const SECURITY_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
];

/// Room left in the request body limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build and return the router for all service routes.
///
/// The router carries shared state (`AppState`) to all handlers. The request
/// body limit is `max_upload_bytes` plus multipart framing; the upload handler
/// checks the file size itself.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    let mut router = Router::new()
        .route(ROOT_PATH, get(index))
        .route(HEALTH_PATH, get(health))
        .route(INFO_PATH, get(info))
        .route(PICTURES_PATH_V1, post(upload_picture))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AppConfig, Args, DEFAULT_MAX_UPLOAD_BYTES},
        errors::INTERNAL_ERROR_DETAIL,
        handlers::{general_handlers::NOT_STARTED, picture_handlers::too_large_message},
        services::{
            picture_service::{
                PictureService,
                tests::{
                    TEST_BUCKET_NAME, TEST_CONTENT, TEST_ETAG, TEST_FILE_NAME, TEST_OBJECT_NAME,
                    TEST_URL, happy_storage,
                },
            },
            storage_service::{MockFileStorageService, StorageError},
        },
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use chrono::{TimeDelta, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "picture-service-test-boundary";

    const TEST_MAX_UPLOAD_BYTES: usize = 1024;

    fn state(storage: MockFileStorageService) -> AppState {
        state_with_limit(storage, Some(TEST_MAX_UPLOAD_BYTES))
    }

    /// `None` keeps the default `MAX_UPLOAD_BYTES`.
    fn state_with_limit(storage: MockFileStorageService, limit: Option<usize>) -> AppState {
        let config = AppConfig::from_sources(Args::default(), |key| match key {
            "NAME" => Some("test_app".into()),
            "VERSION" => Some("1.0.0".into()),
            "UPLOAD_BUCKET" => Some(TEST_BUCKET_NAME.into()),
            "MAX_UPLOAD_BYTES" => limit.map(|bytes| bytes.to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(Arc::new(config), PictureService::new(Arc::new(storage)))
    }

    fn idle_storage() -> MockFileStorageService {
        let mut storage = MockFileStorageService::new();
        storage.expect_provider().return_const("mock");
        storage.expect_upload_file().never();
        storage.expect_get_file_url().never();
        storage
    }

    fn app(state: AppState) -> Router {
        let limit = state.config.max_upload_bytes;
        routes(limit).with_state(state)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        multipart_part(field, Some(filename), content)
    }

    fn multipart_part(field: &str, filename: Option<&str>, content: &[u8]) -> Request<Body> {
        let disposition = match filename {
            Some(filename) => format!("form-data; name=\"{field}\"; filename=\"{filename}\""),
            None => format!("form-data; name=\"{field}\""),
        };
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: {disposition}\r\n\
             Content-Type: text/plain\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(PICTURES_PATH_V1)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn index_returns_welcome_message() {
        let response = app(state(idle_storage()))
            .oneshot(get_request(ROOT_PATH))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Welcome to the Picture API!" })
        );
    }

    #[tokio::test]
    async fn health_returns_up_with_security_headers() {
        let response = app(state(idle_storage()))
            .oneshot(get_request(HEALTH_PATH))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(response.headers()[name], value);
        }
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(json_body(response).await, json!({ "status": "UP" }));
    }

    #[tokio::test]
    async fn info_before_start_reports_not_started() {
        let response = app(state(idle_storage()))
            .oneshot(get_request(INFO_PATH))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "name": "test_app", "version": "1.0.0", "uptime": NOT_STARTED })
        );
    }

    #[tokio::test]
    async fn info_after_start_reports_uptime() {
        let started = state(idle_storage()).started(Utc::now() - TimeDelta::seconds(90));
        let response = app(started).oneshot(get_request(INFO_PATH)).await.unwrap();

        let body = json_body(response).await;
        let uptime = body["uptime"].as_str().unwrap();
        assert!(uptime.starts_with("0:01:3"), "unexpected uptime {uptime}");
    }

    #[tokio::test]
    async fn unknown_route_returns_json_404() {
        let response = app(state(idle_storage()))
            .oneshot(get_request("/api/nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({ "detail": "Not Found", "status": 404 })
        );
    }

    #[tokio::test]
    async fn upload_returns_created_metadata() {
        let response = app(state(happy_storage()))
            .oneshot(multipart_request("file", TEST_FILE_NAME, TEST_CONTENT))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            json_body(response).await,
            json!({
                "original_filename": TEST_FILE_NAME,
                "object_name": TEST_OBJECT_NAME,
                "file_url": TEST_URL,
                "size": TEST_CONTENT.len(),
                "etag": TEST_ETAG,
            })
        );
    }

    #[tokio::test]
    async fn empty_upload_is_a_bad_request() {
        let response = app(state(idle_storage()))
            .oneshot(multipart_request("file", TEST_FILE_NAME, b""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["detail"],
            "Cannot upload an empty file."
        );
    }

    #[tokio::test]
    async fn non_multipart_body_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri(PICTURES_PATH_V1)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(state(idle_storage())).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["detail"],
            "There was an error parsing the body"
        );
    }

    #[tokio::test]
    async fn upload_without_file_field_is_a_bad_request() {
        let response = app(state(idle_storage()))
            .oneshot(multipart_request("avatar", TEST_FILE_NAME, TEST_CONTENT))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["detail"],
            "Form field `file` is required"
        );
    }

    #[tokio::test]
    async fn upload_without_filename_is_a_bad_request() {
        let response = app(state(idle_storage()))
            .oneshot(multipart_part("file", None, TEST_CONTENT))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["detail"],
            "Original filename is required for upload."
        );
    }

    #[tokio::test]
    async fn file_at_the_default_limit_is_accepted() {
        let content = vec![b'x'; DEFAULT_MAX_UPLOAD_BYTES];
        let response = app(state_with_limit(happy_storage(), None))
            .oneshot(multipart_request("file", "very_large_file.txt", &content))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["original_filename"], "very_large_file.txt");
        assert_eq!(body["size"], DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[rstest]
    #[case::file_over_limit(TEST_MAX_UPLOAD_BYTES + 1)]
    #[case::body_over_limit(TEST_MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES + 1)]
    #[tokio::test]
    async fn oversized_upload_is_rejected(#[case] size: usize) {
        let big = vec![b'x'; size];
        let response = app(state(idle_storage()))
            .oneshot(multipart_request("file", TEST_FILE_NAME, &big))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            json_body(response).await,
            json!({ "detail": too_large_message(TEST_MAX_UPLOAD_BYTES), "status": 413 })
        );
    }

    #[tokio::test]
    async fn storage_failure_is_a_server_error() {
        let mut storage = MockFileStorageService::new();
        storage.expect_provider().return_const("mock");
        storage.expect_upload_file().returning(|_, _| {
            Err(StorageError::Backend {
                message: "bucket unavailable".into(),
                source: None,
            })
        });

        let response = app(state(storage))
            .oneshot(multipart_request("file", TEST_FILE_NAME, TEST_CONTENT))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["status"], 500);
        assert_eq!(body["detail"], INTERNAL_ERROR_DETAIL);
    }
}
