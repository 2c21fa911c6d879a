//! HTTP surface: routes, envelope, and error mapping.
//!
//! Two methods on one logical endpoint:
//!
//! - `GET /` — liveness probe, returns build metadata, no side effects;
//! - `POST /api/diagnose` — runs the pipeline for one URL.
//!
//! Every response body is the `{ ok, data?, error? }` envelope. Clients
//! must treat any `ok: false` as a hard failure and must not touch `data`
//! unless `ok` is true.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use pagepulse_core::{AppConfig, DiagnosisResult, PagePulseError, diagnose_url};

/// Shared, immutable per-process state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/diagnose", post(diagnose))
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    ok: bool,
    name: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { ok: true, name: env!("CARGO_PKG_NAME"), version: env!("CARGO_PKG_VERSION") })
}

/// Inbound request body.
#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    pub url: String,
}

/// Response envelope shared by success and failure.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DiagnosisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    fn success(data: DiagnosisResult) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    fn failure(message: String) -> Self {
        Self { ok: false, data: None, error: Some(message) }
    }
}

async fn diagnose(
    State(state): State<AppState>, body: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(Envelope::failure(format!("invalid request body: {}", rejection.body_text()))),
            )
                .into_response();
        }
    };

    tracing::info!(url = %request.url, "diagnosis requested");

    match diagnose_url(&state.config, &request.url).await {
        Ok(diagnosis) => {
            tracing::info!(score = diagnosis.score, "diagnosis complete");
            (StatusCode::OK, Json(Envelope::success(diagnosis))).into_response()
        }
        Err(err) => {
            let status = status_for(&err);
            tracing::warn!(%err, status = status.as_u16(), "diagnosis failed");
            (status, Json(Envelope::failure(err.to_string()))).into_response()
        }
    }
}

/// Maps pipeline errors to HTTP status codes.
///
/// 400 is the caller's fault, 502 the target page's, 413/422 the page
/// content's, and 500 ours or the model service's.
fn status_for(err: &PagePulseError) -> StatusCode {
    match err {
        PagePulseError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        PagePulseError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        PagePulseError::InsufficientContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PagePulseError::Timeout { .. } | PagePulseError::Unreachable(_) | PagePulseError::UpstreamStatus { .. } => {
            StatusCode::BAD_GATEWAY
        }
        PagePulseError::HtmlParse(_)
        | PagePulseError::ConfigMissing(_)
        | PagePulseError::ModelRequest(_)
        | PagePulseError::MalformedModelOutput(_)
        | PagePulseError::SchemaViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        router(AppState { config: Arc::new(AppConfig::for_tests()) })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_probe() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_url_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/diagnose")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url": "not a url"}"#))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains("Invalid URL"));
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_unparsable_body_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/diagnose")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["ok"], false);
    }

    #[tokio::test]
    async fn test_missing_url_field_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/diagnose")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"address": "https://example.com"}"#))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/diagnose")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url": "ftp://example.com"}"#))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping_covers_the_taxonomy() {
        assert_eq!(
            status_for(&PagePulseError::InvalidUrl("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&PagePulseError::TooLarge { size: 2_000_000, limit: 1_500_000 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&PagePulseError::InsufficientContent { length: 50, minimum: 200 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(&PagePulseError::Timeout { timeout: 10 }), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&PagePulseError::Unreachable("dns".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&PagePulseError::UpstreamStatus { status: 500 }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&PagePulseError::ModelRequest("quota".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&PagePulseError::MalformedModelOutput("not json".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&PagePulseError::SchemaViolation("2 issues".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
