//! Vocalis - 声纹注册与说话人识别服务

use std::sync::Arc;

use vocalis::application::{EmbeddingExtractorPort, ProfileStorePort};
use vocalis::config::{
    load_config, print_config, AppConfig, EmbeddingProvider, LogConfig, RegistryBackend,
};
use vocalis::domain::voiceprint::{
    ConsistencyValidator, EnrollmentPolicy, IdentificationMatcher, PhraseCatalog,
};
use vocalis::infrastructure::adapters::{
    FakeEmbeddingExtractor, HttpEmbeddingClient, HttpEmbeddingClientConfig,
};
use vocalis::infrastructure::http::{AppState, HttpServer, ServerConfig};
use vocalis::infrastructure::memory::InMemoryProfileStore;
use vocalis::infrastructure::persistence::{JsonFileProfileStore, SledProfileStore};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},vocalis={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn open_profile_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ProfileStorePort>> {
    let dir = &config.registry.dir;
    let store: Arc<dyn ProfileStorePort> = match config.registry.backend {
        RegistryBackend::Json => Arc::new(JsonFileProfileStore::new(dir).await?),
        RegistryBackend::Sled => {
            tokio::fs::create_dir_all(dir).await?;
            Arc::new(SledProfileStore::open(dir.join("profiles.sled"))?)
        }
        RegistryBackend::Memory => {
            tracing::warn!("Using in-memory profile store, profiles are lost on restart");
            Arc::new(InMemoryProfileStore::new())
        }
    };
    Ok(store)
}

fn build_extractor(config: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingExtractorPort>> {
    let embedding = &config.embedding;
    let extractor: Arc<dyn EmbeddingExtractorPort> = match embedding.provider {
        EmbeddingProvider::Http => {
            let client_config = HttpEmbeddingClientConfig {
                base_url: embedding.url.clone(),
                model_name: embedding.model.clone(),
                timeout_secs: embedding.timeout_secs,
                max_retries: embedding.max_retries,
                dimension: (embedding.dimension > 0).then_some(embedding.dimension),
            };
            Arc::new(HttpEmbeddingClient::new(client_config)?)
        }
        EmbeddingProvider::Fake => {
            tracing::warn!("Using fake embedding extractor, identification is not meaningful");
            Arc::new(FakeEmbeddingExtractor::new(embedding.dimension))
        }
    };
    Ok(extractor)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Vocalis - 声纹注册与识别服务");
    print_config(&config);

    let profile_store = open_profile_store(&config).await?;
    let extractor = build_extractor(&config)?;

    if !extractor.health_check().await {
        tracing::warn!(
            model = extractor.model_name(),
            "Embedding extractor is not reachable yet, audio endpoints will fail until it is"
        );
    }

    let policy = EnrollmentPolicy::new(
        PhraseCatalog::new(config.enrollment.phrases.clone()),
        config.registry.required_phrases,
        ConsistencyValidator::new(config.registry.consistency_threshold),
    );
    let matcher = IdentificationMatcher::new(config.registry.identification_threshold);

    let state = AppState::new(profile_store, extractor, policy, matcher);
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_upload_size(config.server.max_upload_size);
    let server = HttpServer::new(server_config, state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
