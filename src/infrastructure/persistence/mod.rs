//! Persistence Layer - 数据持久化
//!
//! JSON 文件和 Sled 存储实现

pub mod json;
pub mod sled;

pub use self::json::JsonFileProfileStore;
pub use self::sled::SledProfileStore;
