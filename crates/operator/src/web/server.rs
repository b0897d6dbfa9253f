//! Conversion webhook server.
//!
//! Speaks the apiextensions.k8s.io ConversionReview protocol: the API
//! server posts a review with a batch of objects and a desired API
//! version, and gets back either every object converted or a Failure
//! result. Conversion faults never surface as HTTP errors; they are
//! reported inside the review response, which is what the API server
//! expects.

use atelier_model::ConversionService;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

const REVIEW_API_VERSION: &str = "apiextensions.k8s.io/v1";
const REVIEW_KIND: &str = "ConversionReview";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReview {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ConversionRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ConversionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub uid: String,
    /// Full API version, e.g. `atelier.io/v1beta7`. The apiextensions
    /// wire form capitalizes API, which camelCase would not produce.
    #[serde(rename = "desiredAPIVersion")]
    pub desired_api_version: String,
    #[serde(default)]
    pub objects: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub converted_objects: Vec<Value>,
    pub result: ReviewResult,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReviewResult {
    fn success() -> Self {
        Self {
            status: "Success".to_string(),
            message: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            status: "Failure".to_string(),
            message: Some(message.into()),
        }
    }
}

pub fn router(service: Arc<ConversionService>) -> Router {
    Router::new()
        .route("/convert", post(convert))
        .route("/healthz", get(healthz))
        .with_state(service)
}

/// Bind and serve the webhook until the process shuts down.
pub async fn serve(service: Arc<ConversionService>, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "conversion webhook listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(service)).await
}

async fn healthz() -> &'static str {
    "ok"
}

async fn convert(
    State(service): State<Arc<ConversionService>>,
    Json(review): Json<ConversionReview>,
) -> Json<ConversionReview> {
    let Some(request) = review.request else {
        return Json(respond(
            String::new(),
            Vec::new(),
            ReviewResult::failure("review has no request"),
        ));
    };

    let target_version = request
        .desired_api_version
        .rsplit('/')
        .next()
        .unwrap_or(request.desired_api_version.as_str())
        .to_string();
    debug!(
        uid = request.uid,
        target_version,
        objects = request.objects.len(),
        "conversion request"
    );

    let mut converted = Vec::with_capacity(request.objects.len());
    for object in request.objects {
        match service.convert_value(object, &target_version) {
            Ok(object) => converted.push(object),
            Err(err) => {
                warn!(uid = request.uid, error = %err, "conversion failed");
                return Json(respond(
                    request.uid,
                    Vec::new(),
                    ReviewResult::failure(err.to_string()),
                ));
            }
        }
    }
    Json(respond(request.uid, converted, ReviewResult::success()))
}

fn respond(uid: String, converted_objects: Vec<Value>, result: ReviewResult) -> ConversionReview {
    ConversionReview {
        api_version: REVIEW_API_VERSION.to_string(),
        kind: REVIEW_KIND.to_string(),
        request: None,
        response: Some(ConversionResponse {
            uid,
            converted_objects,
            result,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(ConversionService::new().unwrap()))
    }

    async fn post_review(body: Value) -> (StatusCode, ConversionReview) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/convert")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_request_uses_apiextensions_field_casing() {
        let request: ConversionRequest = serde_json::from_value(json!({
            "uid": "req-0",
            "desiredAPIVersion": "atelier.io/v1beta4",
            "objects": []
        }))
        .unwrap();
        assert_eq!(request.desired_api_version, "atelier.io/v1beta4");

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("desiredAPIVersion").is_some());
        assert!(value.get("desiredApiVersion").is_none());
    }

    #[tokio::test]
    async fn test_healthz_responds() {
        let response = app()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_converts_batch_to_desired_version() {
        let (status, review) = post_review(json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "ConversionReview",
            "request": {
                "uid": "req-1",
                "desiredAPIVersion": "atelier.io/v1beta7",
                "objects": [
                    {
                        "apiVersion": "atelier.io/v1beta5",
                        "kind": "Session",
                        "metadata": {"name": "s1"},
                        "spec": {"name": "s1", "appDefinition": "ide-rust", "user": "alice"}
                    },
                    {
                        "apiVersion": "atelier.io/v1beta6",
                        "kind": "Session",
                        "metadata": {"name": "s2"},
                        "spec": {
                            "name": "s2",
                            "appDefinition": "ide-rust",
                            "user": "bob",
                            "sessionSecret": "tok"
                        }
                    }
                ]
            }
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = review.response.unwrap();
        assert_eq!(response.uid, "req-1");
        assert_eq!(response.result.status, "Success");
        assert_eq!(response.converted_objects.len(), 2);
        for object in &response.converted_objects {
            assert_eq!(object.get("apiVersion").unwrap(), "atelier.io/v1beta7");
        }
        assert_eq!(
            response.converted_objects[1]
                .pointer("/spec/sessionSecret")
                .unwrap(),
            "tok"
        );
    }

    #[tokio::test]
    async fn test_unsupported_version_reports_failure_not_http_error() {
        let (status, review) = post_review(json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "ConversionReview",
            "request": {
                "uid": "req-2",
                "desiredAPIVersion": "atelier.io/v1beta99",
                "objects": [{
                    "apiVersion": "atelier.io/v1beta7",
                    "kind": "Session",
                    "metadata": {"name": "s1"},
                    "spec": {"name": "s1", "appDefinition": "a", "user": "u"}
                }]
            }
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = review.response.unwrap();
        assert_eq!(response.result.status, "Failure");
        assert!(response.result.message.unwrap().contains("v1beta99"));
        assert!(response.converted_objects.is_empty());
    }

    #[tokio::test]
    async fn test_review_without_request_is_a_failure() {
        let (status, review) = post_review(json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "ConversionReview"
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(review.response.unwrap().result.status, "Failure");
    }
}
