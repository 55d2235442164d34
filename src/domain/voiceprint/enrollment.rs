//! Enrollment Policy - 注册规则
//!
//! 在一致性校验之前完成数量、短语索引和维度检查，然后构建 VoiceProfile

use super::{
    ConsistencyValidator, Embedding, PhraseCatalog, UserName, VoiceProfile, VoiceprintError,
};

/// 注册所需的最少短语录音数
pub const DEFAULT_REQUIRED_PHRASES: usize = 5;

#[derive(Debug, Clone)]
pub struct EnrollmentPolicy {
    catalog: PhraseCatalog,
    required_phrases: usize,
    validator: ConsistencyValidator,
}

impl EnrollmentPolicy {
    pub fn new(
        catalog: PhraseCatalog,
        required_phrases: usize,
        validator: ConsistencyValidator,
    ) -> Self {
        Self {
            catalog,
            required_phrases,
            validator,
        }
    }

    pub fn catalog(&self) -> &PhraseCatalog {
        &self.catalog
    }

    pub fn required_phrases(&self) -> usize {
        self.required_phrases
    }

    pub fn validator(&self) -> &ConsistencyValidator {
        &self.validator
    }

    /// 提取声纹之前的请求校验，返回转换后的短语索引
    ///
    /// 重复的短语索引不会被拒绝
    pub fn check_request(
        &self,
        sample_count: usize,
        phrase_indices: &[i64],
    ) -> Result<Vec<usize>, VoiceprintError> {
        if sample_count != phrase_indices.len() {
            return Err(VoiceprintError::PhraseCountMismatch {
                embeddings: sample_count,
                indices: phrase_indices.len(),
            });
        }

        if sample_count < self.required_phrases {
            return Err(VoiceprintError::InsufficientSamples {
                required: self.required_phrases,
                actual: sample_count,
            });
        }

        let catalog_size = self.catalog.len();
        let invalid: Vec<i64> = phrase_indices
            .iter()
            .copied()
            .filter(|&i| i < 0 || i as u64 >= catalog_size as u64)
            .collect();
        if !invalid.is_empty() {
            return Err(VoiceprintError::InvalidPhraseIndex {
                invalid,
                max: catalog_size.saturating_sub(1),
            });
        }

        Ok(phrase_indices.iter().map(|&i| i as usize).collect())
    }

    /// 校验并构建档案
    ///
    /// 每个样本先归一化，维度必须一致，然后执行一致性校验
    pub fn build_profile(
        &self,
        user_name: UserName,
        embeddings: Vec<Vec<f32>>,
        phrase_indices: &[i64],
    ) -> Result<VoiceProfile, VoiceprintError> {
        let indices = self.check_request(embeddings.len(), phrase_indices)?;

        let samples = embeddings
            .into_iter()
            .map(|values| Embedding::new(values).and_then(Embedding::normalized))
            .collect::<Result<Vec<_>, _>>()?;

        let dim = samples
            .first()
            .ok_or(VoiceprintError::InsufficientSamples {
                required: self.required_phrases.max(2),
                actual: 0,
            })?
            .dim();
        if let Some(bad) = samples.iter().find(|s| s.dim() != dim) {
            return Err(VoiceprintError::DimensionMismatch {
                expected: dim,
                actual: bad.dim(),
            });
        }

        let report = self.validator.validate(&samples)?;

        let phrases_used = self.catalog.resolve(&indices);
        Ok(VoiceProfile::enroll(
            user_name,
            samples,
            indices,
            phrases_used,
            report,
        ))
    }
}

impl Default for EnrollmentPolicy {
    fn default() -> Self {
        Self::new(
            PhraseCatalog::default(),
            DEFAULT_REQUIRED_PHRASES,
            ConsistencyValidator::default(),
        )
    }
}
