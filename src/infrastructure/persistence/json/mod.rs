//! JSON 文件持久化 - 每个档案一个 JSON 文档

mod profile_store;

pub use profile_store::*;
