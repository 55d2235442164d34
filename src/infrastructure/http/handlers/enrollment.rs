//! Enrollment HTTP Handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{EnrollVoice, EnrollVoiceFromAudio, GetEnrollmentPhrases};
use crate::infrastructure::http::dto::{ApiResponse, EnrollDto, EnrollEmbeddingsRequest, PhrasesDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 解析逗号分隔的短语索引，兼容 "[0, 1, 2]" 写法
pub(crate) fn parse_phrase_indices(raw: &str) -> Result<Vec<i64>, ApiError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    if trimmed.trim().is_empty() {
        return Ok(Vec::new());
    }

    trimmed
        .split(',')
        .map(|part| {
            part.trim().parse::<i64>().map_err(|_| {
                ApiError::BadRequest(format!("Invalid phrase index: '{}'", part.trim()))
            })
        })
        .collect()
}

/// 获取注册短语列表
pub async fn get_enrollment_phrases(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<PhrasesDto>> {
    let result = state
        .enrollment_phrases_handler
        .handle(GetEnrollmentPhrases);
    Json(ApiResponse::success(result.into()))
}

/// 上传音频注册声纹
///
/// multipart 字段:
/// - `user_name`
/// - `phrase_indices`: 逗号分隔，顺序与音频一致
/// - `audio`: 每条短语一个文件，可重复
pub async fn enroll_voice(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<EnrollDto>>, ApiError> {
    let mut user_name: Option<String> = None;
    let mut phrase_indices: Option<Vec<i64>> = None;
    let mut audios: Vec<Vec<u8>> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart("multipart field", e))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "user_name" => {
                user_name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::from_multipart("user_name", e))?,
                );
            }
            "phrase_indices" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::from_multipart("phrase_indices", e))?;
                phrase_indices = Some(parse_phrase_indices(&raw)?);
            }
            "audio" => {
                audios.push(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::from_multipart("audio", e))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let user_name =
        user_name.ok_or_else(|| ApiError::BadRequest("user_name is required".to_string()))?;
    let phrase_indices = phrase_indices
        .ok_or_else(|| ApiError::BadRequest("phrase_indices is required".to_string()))?;

    tracing::debug!(
        user_name = %user_name,
        samples = audios.len(),
        "Enrollment upload received"
    );

    let result = state
        .enroll_handler
        .handle_audio(EnrollVoiceFromAudio {
            user_name,
            audios,
            phrase_indices,
        })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 直接提交声纹向量注册
pub async fn enroll_embeddings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnrollEmbeddingsRequest>,
) -> Result<Json<ApiResponse<EnrollDto>>, ApiError> {
    let result = state
        .enroll_handler
        .handle(EnrollVoice {
            user_name: req.user_name,
            embeddings: req.embeddings,
            phrase_indices: req.phrase_indices,
        })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}
