//! Voiceprint Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::similarity::UNIT_NORM_TOLERANCE;
use super::{ConsistencyReport, Embedding, UserId, UserName};

/// VoiceProfile 聚合根
///
/// 不变量:
/// - 所有向量均为单位向量，维度等于 `embedding_dim`
/// - `phrase_embeddings.len() == phrase_indices.len()`
/// - 创建时 `min_consistency` 已通过一致性阈值
/// - 创建后只读，没有重命名或更新操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    user_id: UserId,
    user_name: UserName,
    centroid_embedding: Embedding,
    phrase_embeddings: Vec<Embedding>,
    phrase_indices: Vec<usize>,
    consistency_score: f32,
    min_consistency: f32,
    enrollment_timestamp: DateTime<Utc>,
    embedding_dim: usize,
    /// 注册时的短语文本，与 `phrase_indices` 一一对应
    #[serde(default)]
    phrases_used: Vec<String>,
}

impl VoiceProfile {
    /// 由已通过一致性校验的样本创建档案
    pub(super) fn enroll(
        user_name: UserName,
        phrase_embeddings: Vec<Embedding>,
        phrase_indices: Vec<usize>,
        phrases_used: Vec<String>,
        report: ConsistencyReport,
    ) -> Self {
        let embedding_dim = report.centroid.dim();
        Self {
            user_id: UserId::new(),
            user_name,
            centroid_embedding: report.centroid,
            phrase_embeddings,
            phrase_indices,
            consistency_score: report.avg_consistency,
            min_consistency: report.min_consistency,
            enrollment_timestamp: Utc::now(),
            embedding_dim,
            phrases_used,
        }
    }

    /// 检查从存储读出的档案是否满足结构不变量
    pub fn check_integrity(&self) -> Result<(), String> {
        if self.phrase_embeddings.len() != self.phrase_indices.len() {
            return Err(format!(
                "phrase_embeddings ({}) and phrase_indices ({}) length differ",
                self.phrase_embeddings.len(),
                self.phrase_indices.len()
            ));
        }
        if !self.phrases_used.is_empty() && self.phrases_used.len() != self.phrase_indices.len() {
            return Err(format!(
                "phrases_used ({}) and phrase_indices ({}) length differ",
                self.phrases_used.len(),
                self.phrase_indices.len()
            ));
        }
        if self.phrase_embeddings.is_empty() {
            return Err("profile has no phrase embeddings".to_string());
        }

        let vectors = std::iter::once(&self.centroid_embedding).chain(&self.phrase_embeddings);
        for (i, v) in vectors.enumerate() {
            if v.dim() != self.embedding_dim {
                return Err(format!(
                    "vector {} has dimension {}, expected {}",
                    i,
                    v.dim(),
                    self.embedding_dim
                ));
            }
            if (v.norm() - 1.0).abs() > UNIT_NORM_TOLERANCE {
                return Err(format!("vector {} is not unit length (norm {})", i, v.norm()));
            }
        }
        Ok(())
    }

    // Getters
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_name(&self) -> &UserName {
        &self.user_name
    }

    pub fn centroid_embedding(&self) -> &Embedding {
        &self.centroid_embedding
    }

    pub fn phrase_embeddings(&self) -> &[Embedding] {
        &self.phrase_embeddings
    }

    pub fn phrase_indices(&self) -> &[usize] {
        &self.phrase_indices
    }

    /// 旧记录可能为空
    pub fn phrases_used(&self) -> &[String] {
        &self.phrases_used
    }

    pub fn consistency_score(&self) -> f32 {
        self.consistency_score
    }

    pub fn min_consistency(&self) -> f32 {
        self.min_consistency
    }

    pub fn enrollment_timestamp(&self) -> DateTime<Utc> {
        self.enrollment_timestamp
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}
