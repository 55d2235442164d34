//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：注册与删除是仅有的写操作

mod enrollment_commands;

pub mod handlers;

pub use enrollment_commands::*;
