//! Profile Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{EmbeddingExtractorPort, ProfileStorePort};
use crate::application::queries::{GetEnrollmentPhrases, GetProfile, GetRegistryStats, ListProfiles};
use crate::domain::voiceprint::{EnrollmentPolicy, PhraseCatalog, UserId, VoiceProfile};

// ============================================================================
// Response DTOs
// ============================================================================

/// 档案摘要（不含向量）
#[derive(Debug, Clone)]
pub struct ProfileSummary {
    pub user_id: Uuid,
    pub user_name: String,
    pub enrollment_date: DateTime<Utc>,
    pub phrases_count: usize,
    pub consistency_score: f32,
    pub min_consistency: f32,
    pub phrases_used: Vec<String>,
    pub embedding_dim: usize,
}

impl ProfileSummary {
    pub fn from_profile(profile: &VoiceProfile, catalog: &PhraseCatalog) -> Self {
        Self {
            user_id: *profile.user_id().as_uuid(),
            user_name: profile.user_name().to_string(),
            enrollment_date: profile.enrollment_timestamp(),
            phrases_count: profile.phrase_embeddings().len(),
            consistency_score: profile.consistency_score(),
            min_consistency: profile.min_consistency(),
            phrases_used: if profile.phrases_used().is_empty() {
                catalog.resolve(profile.phrase_indices())
            } else {
                profile.phrases_used().to_vec()
            },
            embedding_dim: profile.embedding_dim(),
        }
    }
}

/// 注册表统计
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub total_profiles: usize,
    pub average_consistency: f32,
    pub min_consistency: f32,
    pub max_consistency: f32,
    pub identification_threshold: f32,
    pub system_ready: bool,
    pub model_name: String,
    pub embedding_dimension: Option<usize>,
}

/// 注册短语
#[derive(Debug, Clone)]
pub struct EnrollmentPhrasesResponse {
    pub phrases: Vec<String>,
    pub required_count: usize,
    pub instructions: &'static str,
}

const RECORDING_INSTRUCTIONS: &str =
    "Record each phrase clearly. Speak naturally and consistently.";

// ============================================================================
// Handlers
// ============================================================================

/// GetProfile Handler
pub struct GetProfileHandler {
    profile_store: Arc<dyn ProfileStorePort>,
    catalog: PhraseCatalog,
}

impl GetProfileHandler {
    pub fn new(profile_store: Arc<dyn ProfileStorePort>, catalog: PhraseCatalog) -> Self {
        Self {
            profile_store,
            catalog,
        }
    }

    pub async fn handle(&self, query: GetProfile) -> Result<ProfileSummary, ApplicationError> {
        let profile = self
            .profile_store
            .get(&UserId::from_uuid(query.user_id))
            .await?;

        Ok(ProfileSummary::from_profile(&profile, &self.catalog))
    }
}

/// ListProfiles Handler
pub struct ListProfilesHandler {
    profile_store: Arc<dyn ProfileStorePort>,
    catalog: PhraseCatalog,
}

impl ListProfilesHandler {
    pub fn new(profile_store: Arc<dyn ProfileStorePort>, catalog: PhraseCatalog) -> Self {
        Self {
            profile_store,
            catalog,
        }
    }

    /// 按注册时间倒序
    pub async fn handle(&self, _query: ListProfiles) -> Result<Vec<ProfileSummary>, ApplicationError> {
        let mut summaries: Vec<ProfileSummary> = self
            .profile_store
            .list_all()
            .await?
            .iter()
            .map(|p| ProfileSummary::from_profile(p, &self.catalog))
            .collect();

        summaries.sort_by(|a, b| {
            b.enrollment_date
                .cmp(&a.enrollment_date)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(summaries)
    }
}

/// GetRegistryStats Handler
pub struct GetRegistryStatsHandler {
    profile_store: Arc<dyn ProfileStorePort>,
    extractor: Arc<dyn EmbeddingExtractorPort>,
    identification_threshold: f32,
}

impl GetRegistryStatsHandler {
    pub fn new(
        profile_store: Arc<dyn ProfileStorePort>,
        extractor: Arc<dyn EmbeddingExtractorPort>,
        identification_threshold: f32,
    ) -> Self {
        Self {
            profile_store,
            extractor,
            identification_threshold,
        }
    }

    pub async fn handle(&self, _query: GetRegistryStats) -> Result<RegistryStats, ApplicationError> {
        let profiles = self.profile_store.list_all().await?;
        let scores: Vec<f32> = profiles.iter().map(|p| p.consistency_score()).collect();

        let (average, min, max) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = scores.iter().map(|&s| s as f64).sum();
            (
                (sum / scores.len() as f64) as f32,
                scores.iter().copied().fold(f32::INFINITY, f32::min),
                scores.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            )
        };

        Ok(RegistryStats {
            total_profiles: profiles.len(),
            average_consistency: average,
            min_consistency: min,
            max_consistency: max,
            identification_threshold: self.identification_threshold,
            system_ready: !profiles.is_empty(),
            model_name: self.extractor.model_name().to_string(),
            embedding_dimension: self.extractor.dimension(),
        })
    }
}

/// GetEnrollmentPhrases Handler
pub struct GetEnrollmentPhrasesHandler {
    policy: Arc<EnrollmentPolicy>,
}

impl GetEnrollmentPhrasesHandler {
    pub fn new(policy: Arc<EnrollmentPolicy>) -> Self {
        Self { policy }
    }

    pub fn handle(&self, _query: GetEnrollmentPhrases) -> EnrollmentPhrasesResponse {
        EnrollmentPhrasesResponse {
            phrases: self.policy.catalog().phrases().to_vec(),
            required_count: self.policy.required_phrases(),
            instructions: RECORDING_INSTRUCTIONS,
        }
    }
}
