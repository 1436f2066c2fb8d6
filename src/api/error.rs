use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Plagiarism check failed: detected {detected}%, threshold {threshold}%")]
    PlagiarismRejected { detected: f64, threshold: u32 },

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

/// Error envelope shared by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            error: None,
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, ErrorResponse::new(msg))
            }
            AppError::PlagiarismRejected {
                detected,
                threshold,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    details: Some(json!({
                        "message": format!("less than {}% plagiarism is accepted", threshold),
                        "type": "plagiarism",
                        "detected": detected,
                        "threshold": threshold,
                    })),
                    ..ErrorResponse::new("Plagiarism check failed")
                },
            ),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse {
                        error: Some(msg),
                        ..ErrorResponse::new("Plagiarism service unavailable")
                    },
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal Server Error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_plagiarism_rejection_carries_both_values() {
        let (status, json) = render(AppError::PlagiarismRejected {
            detected: 20.0,
            threshold: 15,
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(json["details"]["type"], "plagiarism");
        assert_eq!(json["details"]["detected"], 20.0);
        assert_eq!(json["details"]["threshold"], 15);
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let (status, json) = render(AppError::Internal("s3 exploded".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal Server Error");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_status_codes() {
        let (status, _) = render(AppError::UnsupportedMediaType("x".to_string())).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let (status, json) = render(AppError::ServiceUnavailable("refused".to_string())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "refused");

        let (status, json) = render(AppError::BadRequest("team_id is required".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "team_id is required");
    }
}
