//! Display sink implementations
//!
//! Tracing-backed stand-ins for the windowing backend.

mod log;

pub use self::log::{LogFrameSink, LogSurface};
