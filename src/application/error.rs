//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::{EmbeddingError, ProfileStoreError};
use crate::domain::voiceprint::VoiceprintError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 用户名已注册
    #[error("User name '{0}' already registered")]
    DuplicateName(String),

    /// 注册样本一致性不足，整批被拒绝
    #[error("Voice samples inconsistent: {0}")]
    InconsistentVoiceSamples(String),

    /// 声纹提取失败
    #[error("Embedding extraction failed: {0}")]
    EmbeddingExtractionFailed(String),

    /// 持久化记录无法读取
    #[error("Storage corruption: {0}")]
    StorageCorruption(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<ProfileStoreError> for ApplicationError {
    fn from(err: ProfileStoreError) -> Self {
        match err {
            ProfileStoreError::NotFound(id) => Self::not_found("VoiceProfile", *id.as_uuid()),
            ProfileStoreError::DuplicateName(name) => Self::DuplicateName(name),
            ProfileStoreError::Corrupted { .. } => Self::StorageCorruption(err.to_string()),
            _ => Self::RepositoryError(err.to_string()),
        }
    }
}

impl From<VoiceprintError> for ApplicationError {
    fn from(err: VoiceprintError) -> Self {
        match err {
            VoiceprintError::InconsistentVoiceSamples { .. } => {
                Self::InconsistentVoiceSamples(err.to_string())
            }
            _ => Self::ValidationError(err.to_string()),
        }
    }
}

impl From<EmbeddingError> for ApplicationError {
    fn from(err: EmbeddingError) -> Self {
        Self::EmbeddingExtractionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voiceprint::UserId;

    #[test]
    fn test_store_errors_mapping() {
        let id = UserId::new();
        assert!(matches!(
            ApplicationError::from(ProfileStoreError::NotFound(id)),
            ApplicationError::NotFound { resource_type: "VoiceProfile", id: uuid } if uuid == *id.as_uuid()
        ));
        assert!(matches!(
            ApplicationError::from(ProfileStoreError::DuplicateName("alice".into())),
            ApplicationError::DuplicateName(_)
        ));
        assert!(matches!(
            ApplicationError::from(ProfileStoreError::Corrupted {
                key: "x.json".into(),
                reason: "bad".into()
            }),
            ApplicationError::StorageCorruption(_)
        ));
    }

    #[test]
    fn test_inconsistent_samples_kept_distinct() {
        let err = ApplicationError::from(VoiceprintError::InconsistentVoiceSamples {
            min_consistency: 0.4,
            threshold: 0.7,
        });
        assert!(matches!(err, ApplicationError::InconsistentVoiceSamples(_)));

        let err = ApplicationError::from(VoiceprintError::EmptyVector);
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
