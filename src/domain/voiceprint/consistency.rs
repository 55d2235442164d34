//! Consistency Validator - 注册样本一致性校验
//!
//! 判断一批注册向量是否来自同一说话人，并计算质心

use super::similarity::{cosine_similarity, l2_normalize, mean_vector};
use super::{Embedding, VoiceprintError};

/// 两两最小相似度的接受阈值
pub const DEFAULT_CONSISTENCY_THRESHOLD: f32 = 0.70;

/// 一致性校验结果
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    /// 归一化后的质心（不是任何一个输入向量）
    pub centroid: Embedding,
    /// 全部两两相似度的算术平均
    pub avg_consistency: f32,
    /// 全部两两相似度的最小值
    pub min_consistency: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ConsistencyValidator {
    threshold: f32,
}

impl Default for ConsistencyValidator {
    fn default() -> Self {
        Self::new(DEFAULT_CONSISTENCY_THRESHOLD)
    }
}

impl ConsistencyValidator {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// 校验 N >= 2 个向量的 N*(N-1)/2 对相似度
    ///
    /// `min_consistency < threshold` 时返回 `InconsistentVoiceSamples`
    pub fn validate(&self, embeddings: &[Embedding]) -> Result<ConsistencyReport, VoiceprintError> {
        if embeddings.len() < 2 {
            return Err(VoiceprintError::InsufficientSamples {
                required: 2,
                actual: embeddings.len(),
            });
        }

        let mut sum: f64 = 0.0;
        let mut min = f32::INFINITY;
        let mut pairs = 0usize;

        for (i, a) in embeddings.iter().enumerate() {
            for b in &embeddings[i + 1..] {
                let sim = cosine_similarity(a.as_slice(), b.as_slice())?;
                sum += sim as f64;
                min = min.min(sim);
                pairs += 1;
            }
        }

        let avg = (sum / pairs as f64) as f32;

        if min < self.threshold {
            tracing::debug!(
                min_consistency = min,
                avg_consistency = avg,
                threshold = self.threshold,
                "Enrollment samples rejected"
            );
            return Err(VoiceprintError::InconsistentVoiceSamples {
                min_consistency: min,
                threshold: self.threshold,
            });
        }

        let mut centroid = mean_vector(embeddings)?;
        if !l2_normalize(&mut centroid) {
            return Err(VoiceprintError::ZeroVector);
        }

        Ok(ConsistencyReport {
            centroid: Embedding::new(centroid)?,
            avg_consistency: avg,
            min_consistency: min,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(values: Vec<f32>) -> Embedding {
        Embedding::new(values).unwrap().normalized().unwrap()
    }

    fn noisy(base: &[f32], seed: usize) -> Embedding {
        let values = base
            .iter()
            .enumerate()
            .map(|(i, &x)| x + 0.001 * ((i * 7 + seed * 13) as f32).sin())
            .collect();
        unit(values)
    }

    fn base_vector() -> Vec<f32> {
        (0..16).map(|i| 1.0 + (i as f32) * 0.1).collect()
    }

    #[test]
    fn test_identical_vectors() {
        let v = unit(base_vector());
        let samples = vec![v.clone(); 5];

        let report = ConsistencyValidator::default().validate(&samples).unwrap();
        assert!((report.min_consistency - 1.0).abs() < 1e-6);
        assert!((report.avg_consistency - 1.0).abs() < 1e-6);
        for (c, x) in report.centroid.as_slice().iter().zip(v.as_slice()) {
            assert!((c - x).abs() < 1e-6);
        }
    }

    #[test]
    fn test_near_identical_vectors() {
        let base = base_vector();
        let samples: Vec<Embedding> = (0..5).map(|s| noisy(&base, s)).collect();

        let report = ConsistencyValidator::default().validate(&samples).unwrap();
        assert!((report.centroid.norm() - 1.0).abs() < 1e-5);
        for s in &samples {
            let sim = cosine_similarity(report.centroid.as_slice(), s.as_slice()).unwrap();
            assert!(sim >= 0.99, "centroid similarity {sim}");
        }
        assert!(report.min_consistency <= report.avg_consistency);
    }

    #[test]
    fn test_outlier_rejected() {
        let base = base_vector();
        let mut samples: Vec<Embedding> = (0..4).map(|s| noisy(&base, s)).collect();
        // 与 base 近似正交
        let outlier: Vec<f32> = (0..16).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        samples.push(unit(outlier));

        let err = ConsistencyValidator::default().validate(&samples).unwrap_err();
        match err {
            VoiceprintError::InconsistentVoiceSamples {
                min_consistency,
                threshold,
            } => {
                assert!(min_consistency < 0.70);
                assert_eq!(threshold, 0.70);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_requires_two_samples() {
        let v = unit(base_vector());
        assert_eq!(
            ConsistencyValidator::default().validate(&[v]),
            Err(VoiceprintError::InsufficientSamples {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let samples = vec![unit(vec![1.0, 0.0]), unit(vec![1.0, 0.0, 0.0])];
        assert!(matches!(
            ConsistencyValidator::default().validate(&samples),
            Err(VoiceprintError::DimensionMismatch { .. })
        ));
    }
}
