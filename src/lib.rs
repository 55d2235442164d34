//! Vocalis - 声纹注册与说话人识别服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voiceprint Context: 相似度、注册一致性校验、档案聚合、识别匹配
//!
//! 应用层 (application/):
//! - Ports: ProfileStore, EmbeddingExtractor
//! - Commands: 注册、删除
//! - Queries: 识别、档案、统计、注册短语
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: JSON 文件 / Sled 档案存储
//! - Memory: 内存档案存储
//! - Adapters: HTTP 提取客户端、Fake 提取器

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
