//! Enrollment Command Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{DeleteProfile, EnrollVoice, EnrollVoiceFromAudio};
use crate::application::error::ApplicationError;
use crate::application::ports::{EmbeddingExtractorPort, ProfileStoreError, ProfileStorePort};
use crate::domain::voiceprint::{EnrollmentPolicy, UserId, UserName};

// ============================================================================
// EnrollVoice
// ============================================================================

/// 注册响应
#[derive(Debug, Clone)]
pub struct EnrollVoiceResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub phrases_recorded: usize,
    pub consistency_score: f32,
    pub min_consistency: f32,
    pub enrollment_date: DateTime<Utc>,
}

/// EnrollVoice Handler
///
/// 唯一的写入路径。用户名唯一性最终由 ProfileStorePort::create 保证
pub struct EnrollVoiceHandler {
    profile_store: Arc<dyn ProfileStorePort>,
    extractor: Arc<dyn EmbeddingExtractorPort>,
    policy: Arc<EnrollmentPolicy>,
}

impl EnrollVoiceHandler {
    pub fn new(
        profile_store: Arc<dyn ProfileStorePort>,
        extractor: Arc<dyn EmbeddingExtractorPort>,
        policy: Arc<EnrollmentPolicy>,
    ) -> Self {
        Self {
            profile_store,
            extractor,
            policy,
        }
    }

    pub async fn handle(&self, command: EnrollVoice) -> Result<EnrollVoiceResponse, ApplicationError> {
        let user_name = UserName::new(command.user_name)?;
        self.enroll(user_name, command.embeddings, &command.phrase_indices)
            .await
    }

    /// 先完成廉价校验（数量、索引、用户名），再逐段提取声纹
    pub async fn handle_audio(
        &self,
        command: EnrollVoiceFromAudio,
    ) -> Result<EnrollVoiceResponse, ApplicationError> {
        let user_name = UserName::new(command.user_name)?;
        self.policy
            .check_request(command.audios.len(), &command.phrase_indices)?;
        self.ensure_name_available(&user_name).await?;

        let mut embeddings = Vec::with_capacity(command.audios.len());
        for (i, audio) in command.audios.iter().enumerate() {
            let embedding = self.extractor.embed(audio).await.map_err(|e| {
                tracing::error!(
                    user_name = %user_name,
                    sample = i,
                    error = %e,
                    "Embedding extraction failed during enrollment"
                );
                ApplicationError::EmbeddingExtractionFailed(format!("sample {}: {}", i, e))
            })?;
            embeddings.push(embedding);
        }

        self.enroll(user_name, embeddings, &command.phrase_indices)
            .await
    }

    async fn ensure_name_available(&self, user_name: &UserName) -> Result<(), ApplicationError> {
        let existing = self.profile_store.list_all().await?;
        if existing.iter().any(|p| p.user_name().same_as(user_name)) {
            return Err(ApplicationError::DuplicateName(user_name.to_string()));
        }
        Ok(())
    }

    async fn enroll(
        &self,
        user_name: UserName,
        embeddings: Vec<Vec<f32>>,
        phrase_indices: &[i64],
    ) -> Result<EnrollVoiceResponse, ApplicationError> {
        let profile = self
            .policy
            .build_profile(user_name, embeddings, phrase_indices)
            .map_err(|e| {
                tracing::warn!(error = %e, "Enrollment rejected");
                e
            })?;

        self.profile_store.create(&profile).await?;

        tracing::info!(
            user_id = %profile.user_id(),
            user_name = %profile.user_name(),
            phrases = profile.phrase_embeddings().len(),
            consistency_score = profile.consistency_score(),
            min_consistency = profile.min_consistency(),
            "Voice profile enrolled"
        );

        Ok(EnrollVoiceResponse {
            user_id: *profile.user_id().as_uuid(),
            user_name: profile.user_name().to_string(),
            phrases_recorded: profile.phrase_embeddings().len(),
            consistency_score: profile.consistency_score(),
            min_consistency: profile.min_consistency(),
            enrollment_date: profile.enrollment_timestamp(),
        })
    }
}

// ============================================================================
// DeleteProfile
// ============================================================================

/// 删除响应
#[derive(Debug, Clone)]
pub struct DeleteProfileResponse {
    pub user_id: Uuid,
    /// 记录损坏时无法读出用户名
    pub user_name: Option<String>,
}

/// DeleteProfile Handler
pub struct DeleteProfileHandler {
    profile_store: Arc<dyn ProfileStorePort>,
}

impl DeleteProfileHandler {
    pub fn new(profile_store: Arc<dyn ProfileStorePort>) -> Self {
        Self { profile_store }
    }

    pub async fn handle(&self, command: DeleteProfile) -> Result<DeleteProfileResponse, ApplicationError> {
        let user_id = UserId::from_uuid(command.user_id);

        // 损坏的记录仍然允许删除
        let user_name = match self.profile_store.get(&user_id).await {
            Ok(profile) => Some(profile.user_name().to_string()),
            Err(ProfileStoreError::Corrupted { key, reason }) => {
                tracing::warn!(key = %key, reason = %reason, "Deleting corrupted profile record");
                None
            }
            Err(e) => return Err(e.into()),
        };

        self.profile_store.delete(&user_id).await?;

        tracing::info!(
            user_id = %user_id,
            user_name = ?user_name,
            "Voice profile deleted"
        );

        Ok(DeleteProfileResponse {
            user_id: command.user_id,
            user_name,
        })
    }
}
