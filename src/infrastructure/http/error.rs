//! HTTP Error Handling
//!
//! 业务错误一律返回 HTTP 200，错误信息放在 `errno` / `error` 字段

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const PAYLOAD_TOO_LARGE: i32 = 413;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// 上传超过 `server.max_upload_size`，以 HTTP 413 返回
    PayloadTooLarge(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::PayloadTooLarge(_) => errno::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }

    /// multipart 读取失败：超出请求体上限的保留 413，其余按参数错误处理
    pub fn from_multipart(context: &str, err: MultipartError) -> Self {
        let msg = format!("Failed to read {}: {}", context, err.body_text());
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(msg)
        } else {
            ApiError::BadRequest(msg)
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message().to_string();

        match &self {
            ApiError::Internal(_) | ApiError::ServiceUnavailable(_) => {
                tracing::error!(errno, error = %msg, "Request failed");
            }
            _ => {
                tracing::warn!(errno, error = %msg, "Request rejected");
            }
        }

        let status = match &self {
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::OK,
        };
        (status, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::InconsistentVoiceSamples(msg) => ApiError::BadRequest(msg),
            ApplicationError::DuplicateName(_) => ApiError::Conflict(e.to_string()),
            ApplicationError::EmbeddingExtractionFailed(_) => {
                ApiError::ServiceUnavailable(e.to_string())
            }
            ApplicationError::StorageCorruption(_)
            | ApplicationError::RepositoryError(_)
            | ApplicationError::InternalError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_application_error_mapping() {
        let cases = [
            (ApplicationError::not_found("VoiceProfile", Uuid::nil()), errno::NOT_FOUND),
            (ApplicationError::validation("bad index"), errno::BAD_REQUEST),
            (
                ApplicationError::InconsistentVoiceSamples("0.41 < 0.70".into()),
                errno::BAD_REQUEST,
            ),
            (ApplicationError::DuplicateName("alice".into()), errno::CONFLICT),
            (
                ApplicationError::EmbeddingExtractionFailed("timeout".into()),
                errno::SERVICE_UNAVAILABLE,
            ),
            (
                ApplicationError::StorageCorruption("bad json".into()),
                errno::INTERNAL_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).errno(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_response_is_http_ok() {
        let response = ApiError::Conflict("taken".into()).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errno"], 409);
        assert_eq!(json["error"], "taken");
        assert!(json["data"].is_null());
    }
}
