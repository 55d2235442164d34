//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod embedding_extractor;
mod profile_store;

pub use embedding_extractor::{EmbeddingError, EmbeddingExtractorPort};
pub use profile_store::{ProfileStoreError, ProfileStorePort};
