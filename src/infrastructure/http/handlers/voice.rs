//! Voice HTTP Handlers - 识别与档案管理

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    DeleteProfile, GetProfile, GetRegistryStats, IdentifySpeaker, IdentifySpeakerFromAudio,
    ListProfiles,
};
use crate::infrastructure::http::dto::{
    ApiResponse, DeleteDto, IdentifyDto, IdentifyEmbeddingRequest, ProfileDto, ProfileIdRequest,
    ProfileListDto, StatsDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 上传音频识别说话人
pub async fn identify_voice(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<IdentifyDto>>, ApiError> {
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart("multipart field", e))?
    {
        if field.name() == Some("audio") {
            audio = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::from_multipart("audio", e))?
                    .to_vec(),
            );
        }
    }

    let audio = audio.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;

    let result = state
        .identify_handler
        .handle_audio(IdentifySpeakerFromAudio { audio })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 直接提交向量识别说话人
pub async fn identify_embedding(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdentifyEmbeddingRequest>,
) -> Result<Json<ApiResponse<IdentifyDto>>, ApiError> {
    let result = state
        .identify_handler
        .handle(IdentifySpeaker {
            probe: req.embedding,
        })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 列出已注册档案
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ProfileListDto>>, ApiError> {
    let users: Vec<ProfileDto> = state
        .list_profiles_handler
        .handle(ListProfiles)
        .await?
        .into_iter()
        .map(ProfileDto::from)
        .collect();

    Ok(Json(ApiResponse::success(ProfileListDto {
        total: users.len(),
        users,
    })))
}

/// 获取档案详情
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileIdRequest>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let result = state
        .get_profile_handler
        .handle(GetProfile { user_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 删除档案
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileIdRequest>,
) -> Result<Json<ApiResponse<DeleteDto>>, ApiError> {
    let result = state
        .delete_profile_handler
        .handle(DeleteProfile { user_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 注册表统计
pub async fn registry_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsDto>>, ApiError> {
    let result = state.registry_stats_handler.handle(GetRegistryStats).await?;
    Ok(Json(ApiResponse::success(result.into())))
}
