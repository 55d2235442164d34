//! Profile Store Port - 出站端口
//!
//! 声纹档案的持久化抽象。具体实现在 infrastructure 层（JSON 文件、Sled、内存）
//!
//! 实现必须保证:
//! - `create` 原子写入，读者不会看到写了一半的档案
//! - 并发 `create` 时用户名（大小写不敏感）唯一
//! - `list_all` 跳过损坏的条目并记录警告

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voiceprint::{UserId, VoiceProfile};

/// Profile Store 错误
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("Voice profile not found: {0}")]
    NotFound(UserId),

    #[error("User name '{0}' already registered")]
    DuplicateName(String),

    #[error("Corrupted profile record {key}: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Profile Store Port
#[async_trait]
pub trait ProfileStorePort: Send + Sync {
    /// 保存新档案，用户名已存在时返回 `DuplicateName`
    async fn create(&self, profile: &VoiceProfile) -> Result<(), ProfileStoreError>;

    /// 根据 ID 读取档案
    async fn get(&self, user_id: &UserId) -> Result<VoiceProfile, ProfileStoreError>;

    /// 读取全部档案，顺序不保证
    async fn list_all(&self) -> Result<Vec<VoiceProfile>, ProfileStoreError>;

    /// 删除档案，不存在时返回 `NotFound`
    async fn delete(&self, user_id: &UserId) -> Result<(), ProfileStoreError>;

    /// 档案数量
    async fn count(&self) -> Result<usize, ProfileStoreError> {
        Ok(self.list_all().await?.len())
    }
}
