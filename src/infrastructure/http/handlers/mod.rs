//! HTTP Handlers

mod enrollment;
mod ping;
mod voice;

pub use enrollment::*;
pub use ping::*;
pub use voice::*;
