//! The stable contract every version-specific backend satisfies.
//!
//! Backends are opaque: the bridge hands one an [`Invocation`] and gets
//! back either a uniform [`Analysis`] or a [`BackendFailure`]. Anything
//! a backend's native machinery throws must be mapped into the failure
//! sum type by the backend itself; callers never see native types.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::artifact::ResolveError;
use crate::core::analysis::Analysis;
use crate::core::problem::CompilationProblem;
use crate::util::logger::CompilerLogger;

/// Order in which mixed Scala/Java sources are fed to the compilers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileOrder {
    /// Scala and Java sources compiled together.
    #[default]
    Mixed,
    ScalaThenJava,
    JavaThenScala,
}

/// Backend-native invocation input, assembled by the bridge from one
/// [`CompileConfig`](crate::core::CompileConfig).
pub struct Invocation {
    pub classpath: Vec<PathBuf>,

    /// Sources in deterministic (path-sorted) order; scalac output can
    /// depend on file order, and reproducible invocations need a
    /// reproducible command line.
    pub sources: Vec<PathBuf>,

    pub output_dir: PathBuf,

    /// Scalac parameters with the source encoding already merged in.
    pub scalac_options: Vec<String>,

    /// Javac parameters with the source encoding already merged in.
    pub javac_options: Vec<String>,

    pub analysis_cache_file: PathBuf,

    /// Other modules' artifact file -> analysis cache file.
    pub analysis_cache_map: BTreeMap<PathBuf, PathBuf>,

    pub compile_order: CompileOrder,

    pub logger: Arc<dyn CompilerLogger>,
}

/// Failure sum type backends map their native errors into.
#[derive(Debug, Error)]
pub enum BackendFailure {
    /// The backend ran to completion and reports compile problems.
    /// `console_error_lines` carries raw error-level console output for
    /// backends that report javac errors only as text.
    #[error("compilation failed")]
    Structural {
        problems: Vec<CompilationProblem>,
        console_error_lines: Vec<String>,
    },

    /// A required artifact could not be resolved mid-invocation.
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// The backend's own environment is broken (missing classes,
    /// incompatible toolchain, crashed worker).
    #[error("backend environment failure: {message}")]
    Isolation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BackendFailure {
    /// Structural failure with problems and no console text.
    pub fn structural(problems: Vec<CompilationProblem>) -> Self {
        BackendFailure::Structural {
            problems,
            console_error_lines: Vec::new(),
        }
    }

    pub fn isolation(message: impl Into<String>) -> Self {
        BackendFailure::Isolation {
            message: message.into(),
            source: None,
        }
    }
}

/// A version-specific incremental compiler backend.
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Scala version used when the project pins none and has no
    /// scala-library dependency.
    fn default_scala_version(&self) -> &str;

    /// Zinc version used when the project pins none.
    fn default_zinc_version(&self) -> &str;

    /// Whether this backend applies source position mappers to its own
    /// native diagnostics. When false, the bridge remaps normalized
    /// problems itself.
    fn supports_position_mappers(&self) -> bool {
        false
    }

    /// Run one incremental compilation.
    fn compile(&self, invocation: &Invocation) -> Result<Box<dyn Analysis>, BackendFailure>;
}
