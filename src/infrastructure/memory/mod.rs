//! Memory Layer - In-Memory State Management
//!
//! 进程内的档案存储

mod profile_store;

pub use profile_store::InMemoryProfileStore;
