//! Embedding Extractor Port - 声纹向量提取
//!
//! 外部特征提取服务的抽象，具体实现在 infrastructure/adapters 层。
//! 要求同一输入得到相同的向量，维度固定。

use async_trait::async_trait;
use thiserror::Error;

/// 声纹提取错误
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Audio payload is empty")]
    EmptyAudio,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Embedding Extractor Port
#[async_trait]
pub trait EmbeddingExtractorPort: Send + Sync {
    /// 从原始音频中提取声纹向量
    async fn embed(&self, audio: &[u8]) -> Result<Vec<f32>, EmbeddingError>;

    /// 模型名称（用于统计和健康检查）
    fn model_name(&self) -> &str;

    /// 已知的向量维度
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// 检查提取服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
