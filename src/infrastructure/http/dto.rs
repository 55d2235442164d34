//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    DeleteProfileResponse, EnrollVoiceResponse, EnrollmentPhrasesResponse,
    IdentifySpeakerResponse, ProfileSummary, RegistryStats,
};
use crate::domain::voiceprint::ProfileScore;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// 直接提交向量的注册请求
#[derive(Debug, Deserialize)]
pub struct EnrollEmbeddingsRequest {
    pub user_name: String,
    pub embeddings: Vec<Vec<f32>>,
    pub phrase_indices: Vec<i64>,
}

/// 直接提交向量的识别请求
#[derive(Debug, Deserialize)]
pub struct IdentifyEmbeddingRequest {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileIdRequest {
    pub id: Uuid,
}

// ============================================================================
// Enrollment DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EnrollDto {
    pub user_id: Uuid,
    pub user_name: String,
    pub phrases_recorded: usize,
    pub consistency_score: f32,
    pub min_consistency: f32,
    pub enrollment_date: String,
    pub message: String,
}

impl From<EnrollVoiceResponse> for EnrollDto {
    fn from(r: EnrollVoiceResponse) -> Self {
        Self {
            message: format!("Voice profile created for {}", r.user_name),
            user_id: r.user_id,
            user_name: r.user_name,
            phrases_recorded: r.phrases_recorded,
            consistency_score: r.consistency_score,
            min_consistency: r.min_consistency,
            enrollment_date: r.enrollment_date.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhraseDto {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PhrasesDto {
    pub phrases: Vec<PhraseDto>,
    pub required_count: usize,
    pub instructions: &'static str,
}

impl From<EnrollmentPhrasesResponse> for PhrasesDto {
    fn from(r: EnrollmentPhrasesResponse) -> Self {
        Self {
            phrases: r
                .phrases
                .into_iter()
                .enumerate()
                .map(|(index, text)| PhraseDto { index, text })
                .collect(),
            required_count: r.required_count,
            instructions: r.instructions,
        }
    }
}

// ============================================================================
// Identification DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct IdentifyDto {
    pub identified: bool,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub confidence_score: f32,
    pub threshold: f32,
    pub enrollment_date: Option<String>,
    pub top_matches: Vec<ProfileScore>,
    pub message: String,
}

impl From<IdentifySpeakerResponse> for IdentifyDto {
    fn from(r: IdentifySpeakerResponse) -> Self {
        match r {
            IdentifySpeakerResponse::Identified {
                user_id,
                user_name,
                confidence_score,
                enrollment_date,
                threshold,
                ranking,
            } => Self {
                identified: true,
                message: format!("Speaker identified as {}", user_name),
                user_id: Some(user_id),
                user_name: Some(user_name),
                confidence_score,
                threshold,
                enrollment_date: Some(enrollment_date.to_rfc3339()),
                top_matches: ranking,
            },
            IdentifySpeakerResponse::NotIdentified {
                best_score,
                threshold,
                ranking,
            } => Self {
                identified: false,
                user_id: None,
                user_name: None,
                confidence_score: best_score,
                threshold,
                enrollment_date: None,
                top_matches: ranking,
                message: "Speaker not recognized".to_string(),
            },
            IdentifySpeakerResponse::NoProfiles { threshold } => Self {
                identified: false,
                user_id: None,
                user_name: None,
                confidence_score: 0.0,
                threshold,
                enrollment_date: None,
                top_matches: Vec::new(),
                message: "No voice profiles registered".to_string(),
            },
        }
    }
}

// ============================================================================
// Profile DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub user_id: Uuid,
    pub user_name: String,
    pub enrollment_date: String,
    pub phrases_count: usize,
    pub consistency_score: f32,
    pub min_consistency: f32,
    pub phrases_used: Vec<String>,
    pub embedding_dim: usize,
}

impl From<ProfileSummary> for ProfileDto {
    fn from(s: ProfileSummary) -> Self {
        Self {
            user_id: s.user_id,
            user_name: s.user_name,
            enrollment_date: s.enrollment_date.to_rfc3339(),
            phrases_count: s.phrases_count,
            consistency_score: s.consistency_score,
            min_consistency: s.min_consistency,
            phrases_used: s.phrases_used,
            embedding_dim: s.embedding_dim,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileListDto {
    pub total: usize,
    pub users: Vec<ProfileDto>,
}

#[derive(Debug, Serialize)]
pub struct DeleteDto {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub message: String,
}

impl From<DeleteProfileResponse> for DeleteDto {
    fn from(r: DeleteProfileResponse) -> Self {
        let message = match &r.user_name {
            Some(name) => format!("Voice profile of {} deleted", name),
            None => format!("Corrupted voice profile {} deleted", r.user_id),
        };
        Self {
            user_id: r.user_id,
            user_name: r.user_name,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub total_profiles: usize,
    pub average_consistency: f32,
    pub min_consistency: f32,
    pub max_consistency: f32,
    pub identification_threshold: f32,
    pub system_ready: bool,
    pub model_name: String,
    pub embedding_dimension: Option<usize>,
}

impl From<RegistryStats> for StatsDto {
    fn from(s: RegistryStats) -> Self {
        Self {
            total_profiles: s.total_profiles,
            average_consistency: s.average_consistency,
            min_consistency: s.min_consistency,
            max_consistency: s.max_consistency,
            identification_threshold: s.identification_threshold,
            system_ready: s.system_ready,
            model_name: s.model_name,
            embedding_dimension: s.embedding_dimension,
        }
    }
}
