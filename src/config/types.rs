//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::voiceprint::{
    DEFAULT_CONSISTENCY_THRESHOLD, DEFAULT_ENROLLMENT_PHRASES, DEFAULT_IDENTIFICATION_THRESHOLD,
    DEFAULT_REQUIRED_PHRASES,
};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 声纹提取服务配置
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// 注册表配置
    #[serde(default)]
    pub registry: RegistryConfig,

    /// 注册短语配置
    #[serde(default)]
    pub enrollment: EnrollmentConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节），默认 20MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_size() -> usize {
    20 * 1024 * 1024 // 20 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 声纹提取实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// 外部 HTTP 提取服务
    Http,
    /// 基于摘要的确定性向量，本地开发用
    Fake,
}

/// 声纹提取服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: EmbeddingProvider,

    /// 提取服务基础 URL
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// 模型名称（展示用）
    #[serde(default = "default_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// 网络错误重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 向量维度；http 下为 0 表示不校验
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

fn default_provider() -> EmbeddingProvider {
    EmbeddingProvider::Http
}

fn default_embedding_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_model() -> String {
    "speechbrain/spkrec-ecapa-voxceleb".to_string()
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_dimension() -> usize {
    192 // ECAPA-TDNN
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: default_embedding_url(),
            model: default_model(),
            timeout_secs: default_embedding_timeout(),
            max_retries: default_max_retries(),
            dimension: default_dimension(),
        }
    }
}

/// 档案存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// 每个档案一个 JSON 文件
    Json,
    /// Sled 嵌入式数据库
    Sled,
    /// 进程内存，重启丢失
    Memory,
}

/// 注册表配置
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_backend")]
    pub backend: RegistryBackend,

    /// 档案目录
    #[serde(default = "default_registry_dir")]
    pub dir: PathBuf,

    /// 识别阈值
    #[serde(default = "default_identification_threshold")]
    pub identification_threshold: f32,

    /// 注册样本一致性阈值
    #[serde(default = "default_consistency_threshold")]
    pub consistency_threshold: f32,

    /// 注册所需短语数
    #[serde(default = "default_required_phrases")]
    pub required_phrases: usize,
}

fn default_backend() -> RegistryBackend {
    RegistryBackend::Json
}

fn default_registry_dir() -> PathBuf {
    PathBuf::from("data/voice_profiles")
}

fn default_identification_threshold() -> f32 {
    DEFAULT_IDENTIFICATION_THRESHOLD
}

fn default_consistency_threshold() -> f32 {
    DEFAULT_CONSISTENCY_THRESHOLD
}

fn default_required_phrases() -> usize {
    DEFAULT_REQUIRED_PHRASES
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            dir: default_registry_dir(),
            identification_threshold: default_identification_threshold(),
            consistency_threshold: default_consistency_threshold(),
            required_phrases: default_required_phrases(),
        }
    }
}

/// 注册短语配置
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentConfig {
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,
}

fn default_phrases() -> Vec<String> {
    DEFAULT_ENROLLMENT_PHRASES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            phrases: default_phrases(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Http);
        assert_eq!(config.registry.backend, RegistryBackend::Json);
        assert_eq!(config.registry.identification_threshold, 0.82);
        assert_eq!(config.registry.consistency_threshold, 0.70);
        assert_eq!(config.registry.required_phrases, 5);
        assert_eq!(config.enrollment.phrases.len(), 15);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }
}
