//! Domain Layer - 领域层
//!
//! 限界上下文:
//! - Voiceprint Context: 声纹注册与识别

pub mod voiceprint;
