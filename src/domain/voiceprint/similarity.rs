//! Similarity Engine - 向量相似度
//!
//! 所有累加使用 f64 中间精度，结果以 f32 返回

use super::VoiceprintError;

/// 单位向量的范数容差
pub const UNIT_NORM_TOLERANCE: f32 = 1e-4;

/// 余弦相似度，结果在 `[-1, 1]`
///
/// 不要求输入已归一化，按 dot / (|a| * |b|) 计算。
/// 任一向量为零向量时返回 0.0。
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, VoiceprintError> {
    if a.len() != b.len() {
        return Err(VoiceprintError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = x as f64;
        let y = y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }

    // 浮点误差可能略微超出 [-1, 1]
    Ok((dot / denom).clamp(-1.0, 1.0) as f32)
}

/// 原地 L2 归一化，零向量返回 false 且保持不变
pub fn l2_normalize(v: &mut [f32]) -> bool {
    let norm = v
        .iter()
        .map(|&x| (x as f64) * (x as f64))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    for x in v.iter_mut() {
        *x = ((*x as f64) / norm) as f32;
    }
    true
}

/// 逐元素平均
pub fn mean_vector<V: AsRef<[f32]>>(vectors: &[V]) -> Result<Vec<f32>, VoiceprintError> {
    let first = vectors.first().ok_or(VoiceprintError::EmptyVector)?;
    let dim = first.as_ref().len();

    let mut sum = vec![0f64; dim];
    for v in vectors {
        let v = v.as_ref();
        if v.len() != dim {
            return Err(VoiceprintError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            });
        }
        for (acc, &x) in sum.iter_mut().zip(v.iter()) {
            *acc += x as f64;
        }
    }

    let n = vectors.len() as f64;
    Ok(sum.into_iter().map(|s| (s / n) as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let v = [0.6, 0.8, 0.0];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6, "identical: got {sim}");
    }

    #[test]
    fn test_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!(sim.abs() < 1e-6, "orthogonal: got {sim}");
    }

    #[test]
    fn test_opposite() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((sim + 1.0).abs() < 1e-6, "opposite: got {sim}");
    }

    #[test]
    fn test_unnormalized_inputs() {
        let sim = cosine_similarity(&[2.0, 0.0], &[5.0, 5.0]).unwrap();
        assert!((sim - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]),
            Err(VoiceprintError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), Ok(0.0));
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = [3.0, 0.0, 4.0];
        assert!(l2_normalize(&mut v));
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[2] - 0.8).abs() < 1e-6);

        let mut zero = [0.0, 0.0];
        assert!(!l2_normalize(&mut zero));
        assert_eq!(zero, [0.0, 0.0]);
    }

    #[test]
    fn test_mean_vector() {
        let mean = mean_vector(&[vec![1.0f32, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(mean, vec![0.5, 0.5]);
        assert!(mean_vector(&[vec![1.0f32], vec![1.0, 2.0]]).is_err());
    }
}
