//! Fake Embedding Extractor - 用于测试和本地开发的提取器
//!
//! 不调用任何模型，用音频内容的 md5 摘要作为种子生成单位向量。
//! 相同音频得到相同向量，不同音频的向量在高维下近似正交。

use async_trait::async_trait;

use crate::application::ports::{EmbeddingError, EmbeddingExtractorPort};

/// Fake Embedding Extractor
pub struct FakeEmbeddingExtractor {
    dimension: usize,
}

impl FakeEmbeddingExtractor {
    pub fn new(dimension: usize) -> Self {
        tracing::info!(dimension, "FakeEmbeddingExtractor initialized");
        Self {
            dimension: dimension.max(1),
        }
    }

    /// 确定性地把音频字节展开成向量
    fn expand(&self, audio: &[u8]) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.dimension);
        let mut block: u32 = 0;

        while values.len() < self.dimension {
            let mut ctx = md5::Context::new();
            ctx.consume(audio);
            ctx.consume(block.to_le_bytes());
            let digest = ctx.compute();

            for chunk in digest.0.chunks_exact(4) {
                if values.len() == self.dimension {
                    break;
                }
                let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                // 映射到 [-1, 1]
                values.push((raw as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32);
            }
            block += 1;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }
        values
    }
}

#[async_trait]
impl EmbeddingExtractorPort for FakeEmbeddingExtractor {
    async fn embed(&self, audio: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
        if audio.is_empty() {
            return Err(EmbeddingError::EmptyAudio);
        }
        tracing::debug!(
            audio_size = audio.len(),
            "FakeEmbeddingExtractor: deriving embedding from digest"
        );
        Ok(self.expand(audio))
    }

    fn model_name(&self) -> &str {
        "fake-md5"
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voiceprint::cosine_similarity;

    #[tokio::test]
    async fn test_deterministic_unit_vectors() {
        let extractor = FakeEmbeddingExtractor::new(192);
        let a = extractor.embed(b"hello").await.unwrap();
        let b = extractor.embed(b"hello").await.unwrap();

        assert_eq!(a.len(), 192);
        assert_eq!(a, b);
        let norm = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_different_audio_low_similarity() {
        let extractor = FakeEmbeddingExtractor::new(192);
        let a = extractor.embed(b"speaker one").await.unwrap();
        let b = extractor.embed(b"speaker two").await.unwrap();

        assert!(cosine_similarity(&a, &b).unwrap() < 0.5);
    }

    #[tokio::test]
    async fn test_empty_audio_rejected() {
        let extractor = FakeEmbeddingExtractor::new(8);
        assert!(matches!(
            extractor.embed(&[]).await,
            Err(EmbeddingError::EmptyAudio)
        ));
    }
}
