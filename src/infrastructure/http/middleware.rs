//! HTTP Middleware
//!
//! 上传审计中间件：记录命中的路由与请求体大小，并把 413 标记为上传超限

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// 请求体上限，取自 `server.max_upload_size`
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

/// 上传因超过请求体上限被拒绝
///
/// 挂在 413 响应的 extensions 上
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRejection {
    pub route: String,
    pub content_length: Option<u64>,
    pub max_upload_size: usize,
}

/// 上传审计中间件
///
/// - multipart 上传按路由记录 `content_length` 与耗时
/// - 413 记为上传超限并附带 `UploadRejection`
/// - 其余协议层 4xx / 5xx（JSON 无法解析、路由不存在等）照常记录。
///   业务错误走 HTTP 200，在 `ApiError::into_response()` 中记录
pub async fn upload_audit_middleware(
    State(UploadLimit(max_upload_size)): State<UploadLimit>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let content_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let is_upload = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let started = std::time::Instant::now();
    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(
            method = %method,
            route = %route,
            content_length,
            max_upload_size,
            elapsed_ms,
            "Upload rejected: body exceeds server.max_upload_size"
        );
        response.extensions_mut().insert(UploadRejection {
            route,
            content_length,
            max_upload_size,
        });
    } else if status.is_server_error() {
        tracing::error!(
            method = %method,
            route = %route,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            route = %route,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    } else if is_upload {
        tracing::debug!(
            route = %route,
            content_length,
            elapsed_ms,
            "Audio upload handled"
        );
    }

    response
}
