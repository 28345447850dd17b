//! The compile facade: one entry point per compilation request.
//!
//! [`CompilerBridge::compile`] selects a backend, gets (or builds) its
//! isolated environment, assembles a backend-native invocation from the
//! request configuration, runs it, and normalizes whatever comes back.
//! Callers see uniform [`Analysis`] and [`CompileError`] values only;
//! no backend-native type crosses this boundary.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::artifact::{ArtifactResolver, ResolveError};
use crate::backend::contract::{BackendFailure, Invocation};
use crate::backend::isolate::{IsolationManager, ParentFingerprint};
use crate::backend::registry::{select_backend, BackendRegistry, SelectionError};
use crate::core::analysis::{Analysis, FileAnalysis};
use crate::core::config::CompileConfig;
use crate::core::coordinate::Coordinate;
use crate::core::problem::{CompilationProblem, Severity};
use crate::diag::parse::parse_javac_problems;
use crate::util::argline::{quote_if_needed, split_args, UnbalancedQuotes};
use crate::util::config::BridgeDefaults;
use crate::util::logger::CapturingLogger;

/// Invalid request configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigurationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Backend(#[from] SelectionError),

    #[error(transparent)]
    #[diagnostic(
        code(caravel::compile::options),
        help("Balance the quotes in the scalac/javac option strings")
    )]
    Options(#[from] UnbalancedQuotes),
}

/// Compilation failure, by responsibility.
#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    /// The request itself is wrong; fix the configuration.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A required artifact could not be resolved.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolveError),

    /// The backend environment is broken; fix the installation.
    #[error("backend environment failure: {message}")]
    #[diagnostic(code(caravel::compile::isolation))]
    Isolation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The sources do not compile; fix the code.
    #[error("compilation failed with {} error(s)", error_count(problems))]
    #[diagnostic(code(caravel::compile::failed))]
    Failed { problems: Vec<CompilationProblem> },
}

fn error_count(problems: &[CompilationProblem]) -> usize {
    problems
        .iter()
        .filter(|p| p.severity == Severity::Error)
        .count()
}

impl From<crate::backend::isolate::IsolationError> for CompileError {
    fn from(err: crate::backend::isolate::IsolationError) -> Self {
        use crate::backend::isolate::IsolationError;
        match err {
            IsolationError::Resolution(e) => CompileError::Resolution(e),
            IsolationError::Instantiate { source, .. } => CompileError::Isolation {
                message: "backend instantiation failed".to_string(),
                source: Some(source),
            },
            other => CompileError::Isolation {
                message: other.to_string(),
                source: None,
            },
        }
    }
}

/// Version-adaptive facade over the incremental compiler backends.
///
/// One bridge serves any number of compile calls, possibly concurrent;
/// isolated environments are cached across calls in the embedded
/// [`IsolationManager`].
pub struct CompilerBridge {
    resolver: Arc<dyn ArtifactResolver>,
    registry: BackendRegistry,
    isolation: IsolationManager,
    declared_backends: Vec<Coordinate>,
    zinc_version: Option<String>,
    framework_version: Option<String>,
    parent: ParentFingerprint,
}

impl CompilerBridge {
    pub fn new(resolver: Arc<dyn ArtifactResolver>, registry: BackendRegistry) -> Self {
        CompilerBridge {
            resolver,
            registry,
            isolation: IsolationManager::new(),
            declared_backends: Vec::new(),
            zinc_version: None,
            framework_version: None,
            // Without a host-supplied fingerprint the context identity
            // is the bridge build itself.
            parent: ParentFingerprint::from_token(env!("CARGO_PKG_VERSION")),
        }
    }

    /// Backend declarations from the bridge's own dependency slot.
    pub fn with_declared_backends(mut self, declared: Vec<Coordinate>) -> Self {
        self.declared_backends = declared;
        self
    }

    /// Zinc version pinned by the project, when any.
    pub fn with_zinc_version(mut self, version: impl Into<String>) -> Self {
        self.zinc_version = Some(version.into());
        self
    }

    /// Framework version hint used when no Zinc version narrows the
    /// backend choice.
    pub fn with_framework_version(mut self, version: impl Into<String>) -> Self {
        self.framework_version = Some(version.into());
        self
    }

    /// Versions from the bridge defaults files, consulted only for
    /// fields the host did not set explicitly.
    pub fn with_defaults(mut self, defaults: &BridgeDefaults) -> Self {
        if self.zinc_version.is_none() {
            self.zinc_version = defaults.zinc_version.clone();
        }
        if self.framework_version.is_none() {
            self.framework_version = defaults.framework_version.clone();
        }
        self
    }

    /// Fingerprint of the host's current loading context. Cached
    /// backend environments built under a different fingerprint are
    /// rebuilt on next use.
    pub fn with_parent_fingerprint(mut self, parent: ParentFingerprint) -> Self {
        self.parent = parent;
        self
    }

    /// Version of the well-known backend artifacts to resolve.
    pub fn with_backend_version(mut self, version: impl Into<String>) -> Self {
        self.isolation = self.isolation.with_backend_version(version);
        self
    }

    /// Number of live cached backend environments.
    pub fn cached_environments(&self) -> usize {
        self.isolation.cached_handles()
    }

    /// Run one compilation request.
    pub fn compile(&self, mut config: CompileConfig) -> Result<Box<dyn Analysis>, CompileError> {
        if config.sources.is_empty() {
            config.logger.info("No sources to compile");
            return Ok(Box::new(FileAnalysis::new()));
        }

        let selection = select_backend(
            &self.declared_backends,
            self.zinc_version.as_deref(),
            self.framework_version.as_deref(),
        )
        .map_err(ConfigurationError::Backend)?;

        let handle = self.isolation.get_or_create(
            &selection,
            &self.parent,
            &self.registry,
            self.resolver.as_ref(),
        )?;

        if config.logger.debug_enabled() {
            config.logger.debug(&format!(
                "using backend `{selection}` (default Scala {}, default Zinc {})",
                handle.backend.default_scala_version(),
                handle.backend.default_zinc_version()
            ));
        }

        let scalac_options = self.assemble_scalac_options(&config)?;
        let javac_options = assemble_javac_options(&config)?;

        if let Some(encoding) = &config.source_encoding {
            config.position_mappers.set_charset(encoding);
        }

        let mut sources = config.sources.clone();
        sources.sort();

        config.logger.info(&format!(
            "Compiling {} source file(s) to {}",
            sources.len(),
            config.output_dir.display()
        ));

        // Error-level console output is recorded so javac problems that
        // only exist as text can be recovered after a failure.
        let capture = Arc::new(CapturingLogger::new(Arc::clone(&config.logger)));

        let invocation = Invocation {
            classpath: config.classpath.clone(),
            sources,
            output_dir: config.output_dir.clone(),
            scalac_options,
            javac_options,
            analysis_cache_file: config.analysis_cache_file.clone(),
            analysis_cache_map: config.analysis_cache_map.clone(),
            compile_order: config.compile_order,
            logger: capture.clone(),
        };

        match handle.backend.compile(&invocation) {
            Ok(analysis) => Ok(analysis),
            Err(BackendFailure::Structural {
                problems,
                console_error_lines,
            }) => {
                let mut problems = if problems.is_empty() {
                    let lines = if console_error_lines.is_empty() {
                        capture.error_lines()
                    } else {
                        console_error_lines
                    };
                    parse_javac_problems(&lines)
                } else {
                    problems
                };

                if !handle.backend.supports_position_mappers() {
                    for problem in &mut problems {
                        problem.position = config.position_mappers.map_or_keep(&problem.position);
                    }
                }

                for problem in &problems {
                    config.logger.error(&problem.to_string());
                }

                Err(CompileError::Failed { problems })
            }
            Err(BackendFailure::Resolution(e)) => Err(CompileError::Resolution(e)),
            Err(BackendFailure::Isolation { message, source }) => {
                Err(CompileError::Isolation { message, source })
            }
        }
    }

    /// Scalac options: the configured option string, resolved plugin
    /// flags appended, then split into arguments with the source
    /// encoding merged in.
    fn assemble_scalac_options(&self, config: &CompileConfig) -> Result<Vec<String>, CompileError> {
        let mut line = config.scalac_options.clone();
        for coordinate in &config.plugin_artifacts {
            let file = self.resolver.resolve(coordinate)?;
            line.push_str(" -Xplugin:");
            line.push_str(&quote_if_needed(&file.to_string_lossy()));
        }

        let mut options = split_args(&line).map_err(ConfigurationError::Options)?;
        merge_encoding(&mut options, config.source_encoding.as_deref());
        Ok(options)
    }
}

fn assemble_javac_options(config: &CompileConfig) -> Result<Vec<String>, CompileError> {
    let mut options = split_args(&config.javac_options).map_err(ConfigurationError::Options)?;
    merge_encoding(&mut options, config.source_encoding.as_deref());
    Ok(options)
}

/// Append `-encoding <enc>` unless the options already carry one.
fn merge_encoding(options: &mut Vec<String>, encoding: Option<&str>) {
    let Some(encoding) = encoding else { return };
    if options.iter().any(|opt| opt == "-encoding") {
        return;
    }
    options.push("-encoding".to_string());
    options.push(encoding.to_string());
}
