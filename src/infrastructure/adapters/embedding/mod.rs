//! Embedding Adapter - 声纹向量提取实现

mod fake_embedding_extractor;
mod http_embedding_client;

pub use fake_embedding_extractor::FakeEmbeddingExtractor;
pub use http_embedding_client::*;
