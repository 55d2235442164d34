//! Query Handlers 实现

mod identification_handlers;
mod profile_handlers;

pub use identification_handlers::*;
pub use profile_handlers::*;
