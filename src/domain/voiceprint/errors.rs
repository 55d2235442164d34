//! Voiceprint Context - Errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VoiceprintError {
    #[error("向量维度不一致: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("向量不能为空")]
    EmptyVector,

    #[error("向量包含非有限数值")]
    NonFiniteValue,

    #[error("零向量无法归一化")]
    ZeroVector,

    #[error("声音样本不一致: min similarity {min_consistency:.3} < {threshold:.2}")]
    InconsistentVoiceSamples { min_consistency: f32, threshold: f32 },

    #[error("样本数量不足: 至少需要 {required} 段录音, 实际 {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("音频数量 ({embeddings}) 必须与短语索引数量 ({indices}) 一致")]
    PhraseCountMismatch { embeddings: usize, indices: usize },

    #[error("无效的短语索引: {invalid:?}, 必须在 0-{max} 之间")]
    InvalidPhraseIndex { invalid: Vec<i64>, max: usize },

    #[error("无效的用户名: {0}")]
    InvalidName(String),
}
