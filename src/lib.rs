//! Caravel - A version-adaptive bridge to incremental Scala/Java
//! compiler backends
//!
//! This crate provides the core library functionality for Caravel,
//! including backend selection, isolated backend environments, and the
//! compile facade with uniform diagnostics.

pub mod artifact;
pub mod backend;
pub mod core;
pub mod diag;
pub mod facade;
pub mod util;

pub use crate::core::{
    analysis::{Analysis, AnalysisStore, FileAnalysis, FileAnalysisStore},
    config::CompileConfig,
    coordinate::Coordinate,
    position::SourcePosition,
    problem::{CompilationProblem, Severity},
};

pub use artifact::{ArtifactResolver, ResolveError};
pub use backend::{
    Backend, BackendFailure, BackendProvider, BackendRegistry, BackendSelection, CompileOrder,
    CompilerId, Invocation, ParentFingerprint,
};
pub use diag::{mapper_artifacts, MapperChain, SourcePositionMapper};
pub use facade::{CompileError, CompilerBridge, ConfigurationError};
pub use util::logger::{CompilerLogger, TracingLogger};
