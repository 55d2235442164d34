//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                      GET   存活检查
//! - /api/health                    GET   注册表与提取服务状态
//! - /api/enrollment/phrases        GET   注册短语列表
//! - /api/voice/enroll              POST  上传音频注册（multipart）
//! - /api/voice/enroll_embeddings   POST  提交向量注册
//! - /api/voice/identify            POST  上传音频识别（multipart）
//! - /api/voice/identify_embedding  POST  提交向量识别
//! - /api/voice/list                GET   列出档案
//! - /api/voice/get                 POST  档案详情
//! - /api/voice/delete              POST  删除档案
//! - /api/voice/stats               GET   注册表统计

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .route("/enrollment/phrases", get(handlers::get_enrollment_phrases))
        .nest("/voice", voice_routes())
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/enroll", post(handlers::enroll_voice))
        .route("/enroll_embeddings", post(handlers::enroll_embeddings))
        .route("/identify", post(handlers::identify_voice))
        .route("/identify_embedding", post(handlers::identify_embedding))
        .route("/list", get(handlers::list_profiles))
        .route("/get", post(handlers::get_profile))
        .route("/delete", post(handlers::delete_profile))
        .route("/stats", get(handlers::registry_stats))
}
