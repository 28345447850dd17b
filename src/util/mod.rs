//! Shared utilities for the bridge.

pub mod argline;
pub mod config;
pub mod hash;
pub mod logger;

pub use logger::{init_tracing, CapturingLogger, CompilerLogger, TracingLogger};
