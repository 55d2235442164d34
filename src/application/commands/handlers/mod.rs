//! Command Handlers 实现

mod enrollment_handlers;

pub use enrollment_handlers::*;
