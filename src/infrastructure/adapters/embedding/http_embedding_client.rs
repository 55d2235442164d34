//! HTTP Embedding Client - 调用外部声纹提取服务
//!
//! 外部提取 API:
//! POST {base_url}/embed
//! Request: multipart/form-data, 字段 `audio`
//! Response: {"embedding": [f32, ...]}
//!
//! GET {base_url}/health 用于健康检查

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{EmbeddingError, EmbeddingExtractorPort};

/// 提取服务响应
#[derive(Debug, Deserialize)]
struct EmbedHttpResponse {
    embedding: Vec<f32>,
}

/// HTTP 提取客户端配置
#[derive(Debug, Clone)]
pub struct HttpEmbeddingClientConfig {
    /// 提取服务基础 URL
    pub base_url: String,
    /// 模型名称（仅用于展示）
    pub model_name: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 网络错误 / 超时的重试次数
    pub max_retries: u32,
    /// 期望的向量维度，None 表示不校验
    pub dimension: Option<usize>,
}

impl Default for HttpEmbeddingClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            model_name: "speechbrain/spkrec-ecapa-voxceleb".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            dimension: Some(192),
        }
    }
}

impl HttpEmbeddingClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// HTTP 声纹提取客户端
pub struct HttpEmbeddingClient {
    client: Client,
    config: HttpEmbeddingClientConfig,
}

impl HttpEmbeddingClient {
    pub fn new(config: HttpEmbeddingClientConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn embed_url(&self) -> String {
        format!("{}/embed", self.config.base_url.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    /// 单次请求，不重试
    async fn embed_once(&self, audio: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
        let part = Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| EmbeddingError::NetworkError(e.to_string()))?;
        let form = Form::new().part("audio", part);

        let response = self
            .client
            .post(self.embed_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else if e.is_connect() {
                    EmbeddingError::NetworkError(format!(
                        "Cannot connect to embedding service: {}",
                        e
                    ))
                } else {
                    EmbeddingError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: EmbedHttpResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if let Some(expected) = self.config.dimension {
            if body.embedding.len() != expected {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} dimensions, got {}",
                    expected,
                    body.embedding.len()
                )));
            }
        }

        Ok(body.embedding)
    }
}

fn is_retryable(err: &EmbeddingError) -> bool {
    matches!(err, EmbeddingError::NetworkError(_) | EmbeddingError::Timeout)
}

#[async_trait]
impl EmbeddingExtractorPort for HttpEmbeddingClient {
    async fn embed(&self, audio: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
        if audio.is_empty() {
            return Err(EmbeddingError::EmptyAudio);
        }

        tracing::debug!(
            url = %self.embed_url(),
            audio_size = audio.len(),
            "Sending embed request"
        );

        let mut attempt = 0;
        loop {
            match self.embed_once(audio).await {
                Ok(embedding) => {
                    tracing::debug!(dim = embedding.len(), attempt, "Embedding extracted");
                    return Ok(embedding);
                }
                Err(e) if is_retryable(&e) && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "Embedding request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn dimension(&self) -> Option<usize> {
        self.config.dimension
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpEmbeddingClientConfig::new("http://example.com:9000/")
            .with_timeout(5)
            .with_retries(0);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_retries, 0);

        let client = HttpEmbeddingClient::new(config).unwrap();
        assert_eq!(client.embed_url(), "http://example.com:9000/embed");
        assert_eq!(client.health_url(), "http://example.com:9000/health");
    }

    #[test]
    fn test_only_transport_errors_retry() {
        assert!(is_retryable(&EmbeddingError::Timeout));
        assert!(is_retryable(&EmbeddingError::NetworkError("reset".into())));
        assert!(!is_retryable(&EmbeddingError::ServiceError("HTTP 500".into())));
        assert!(!is_retryable(&EmbeddingError::InvalidResponse("bad".into())));
    }

    #[tokio::test]
    async fn test_empty_audio_short_circuits() {
        let client = HttpEmbeddingClient::new(HttpEmbeddingClientConfig::default()).unwrap();
        assert!(matches!(
            client.embed(&[]).await,
            Err(EmbeddingError::EmptyAudio)
        ));
    }
}
