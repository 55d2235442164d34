//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, EmbeddingProvider};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `VOCALIS_SERVER__PORT=8080`
/// - `VOCALIS_EMBEDDING__PROVIDER=fake`
/// - `VOCALIS_EMBEDDING__URL=http://embedder:8001`
/// - `VOCALIS_REGISTRY__BACKEND=sled`
/// - `VOCALIS_REGISTRY__IDENTIFICATION_THRESHOLD=0.85`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级），短语列表由 serde 默认值提供
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("server.max_upload_size", 20 * 1024 * 1024)?
        .set_default("embedding.provider", "http")?
        .set_default("embedding.url", "http://localhost:8001")?
        .set_default("embedding.model", "speechbrain/spkrec-ecapa-voxceleb")?
        .set_default("embedding.timeout_secs", 30)?
        .set_default("embedding.max_retries", 2)?
        .set_default("embedding.dimension", 192)?
        .set_default("registry.backend", "json")?
        .set_default("registry.dir", "data/voice_profiles")?
        .set_default("registry.identification_threshold", 0.82)?
        .set_default("registry.consistency_threshold", 0.70)?
        .set_default("registry.required_phrases", 5)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 前缀: VOCALIS_，层级分隔符: __
    builder = builder.add_source(
        Environment::with_prefix("VOCALIS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    match config.embedding.provider {
        EmbeddingProvider::Http if config.embedding.url.is_empty() => {
            return Err(ConfigError::ValidationError(
                "Embedding URL cannot be empty for the http provider".to_string(),
            ));
        }
        EmbeddingProvider::Fake if config.embedding.dimension == 0 => {
            return Err(ConfigError::ValidationError(
                "Embedding dimension must be positive for the fake provider".to_string(),
            ));
        }
        _ => {}
    }

    for (name, value) in [
        (
            "identification_threshold",
            config.registry.identification_threshold,
        ),
        ("consistency_threshold", config.registry.consistency_threshold),
    ] {
        if !(-1.0..=1.0).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "registry.{} must be within [-1, 1], got {}",
                name, value
            )));
        }
    }

    if config.registry.required_phrases < 2 {
        return Err(ConfigError::ValidationError(
            "registry.required_phrases must be at least 2".to_string(),
        ));
    }

    if config.registry.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Registry directory cannot be empty".to_string(),
        ));
    }

    if config.enrollment.phrases.is_empty() {
        return Err(ConfigError::ValidationError(
            "Enrollment phrase catalog cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Max Upload Size: {} bytes", config.server.max_upload_size);
    tracing::info!("Embedding Provider: {:?}", config.embedding.provider);
    if config.embedding.provider == EmbeddingProvider::Http {
        tracing::info!("Embedding URL: {}", config.embedding.url);
        tracing::info!("Embedding Timeout: {}s", config.embedding.timeout_secs);
    }
    tracing::info!("Embedding Dimension: {}", config.embedding.dimension);
    tracing::info!("Registry Backend: {:?}", config.registry.backend);
    tracing::info!("Registry Directory: {:?}", config.registry.dir);
    tracing::info!(
        "Thresholds: identification={} consistency={}",
        config.registry.identification_threshold,
        config.registry.consistency_threshold
    );
    tracing::info!(
        "Enrollment: {} of {} phrases",
        config.registry.required_phrases,
        config.enrollment.phrases.len()
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_url() {
        let mut config = AppConfig::default();
        config.embedding.url = String::new();
        assert!(validate_config(&config).is_err());

        // fake 提取器不需要 URL
        config.embedding.provider = EmbeddingProvider::Fake;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_fake_zero_dimension() {
        let mut config = AppConfig::default();
        config.embedding.provider = EmbeddingProvider::Fake;
        config.embedding.dimension = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_threshold_out_of_range() {
        let mut config = AppConfig::default();
        config.registry.identification_threshold = 1.5;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.registry.consistency_threshold = -1.1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_required_phrases() {
        let mut config = AppConfig::default();
        config.registry.required_phrases = 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_catalog() {
        let mut config = AppConfig::default();
        config.enrollment.phrases.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[embedding]
provider = "fake"
dimension = 64

[registry]
backend = "sled"
identification_threshold = 0.9

[enrollment]
phrases = ["one", "two", "three"]
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Fake);
        assert_eq!(config.embedding.dimension, 64);
        assert_eq!(config.registry.backend, crate::config::RegistryBackend::Sled);
        assert!((config.registry.identification_threshold - 0.9).abs() < 1e-6);
        assert_eq!(config.registry.required_phrases, 5);
        assert_eq!(config.enrollment.phrases, vec!["one", "two", "three"]);
    }
}
