//! Ping / Health Handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 存活检查
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" | "degraded"
    pub status: &'static str,
    pub registered_voices: usize,
    pub identification_threshold: f32,
    pub model_name: String,
    pub extractor_available: bool,
}

/// 健康检查 - 注册表和提取服务状态
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let registered_voices = state
        .profile_store
        .count()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let extractor_available = state.extractor.health_check().await;

    Ok(Json(ApiResponse::success(HealthResponse {
        status: if extractor_available { "healthy" } else { "degraded" },
        registered_voices,
        identification_threshold: state.identification_threshold,
        model_name: state.extractor.model_name().to_string(),
        extractor_available,
    })))
}
