//! Sled 嵌入式 KV 持久化

mod profile_store;

pub use profile_store::SledProfileStore;
