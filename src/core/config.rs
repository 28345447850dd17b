//! Compilation request configuration.
//!
//! One [`CompileConfig`] describes one compile call. It is built once
//! by the host build tool, handed to the bridge, and not touched again
//! for the duration of that call. All file paths except the output
//! directory and the analysis cache are expected to exist on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::contract::CompileOrder;
use crate::core::coordinate::Coordinate;
use crate::diag::remap::MapperChain;
use crate::util::config::BridgeDefaults;
use crate::util::logger::{CompilerLogger, TracingLogger};

/// Configuration for one compilation request.
pub struct CompileConfig {
    /// Source files to compile. Order is not significant here; the
    /// bridge imposes a deterministic order before invoking a backend
    /// because scalac is sensitive to file order.
    pub sources: Vec<PathBuf>,

    /// Compilation classpath entries.
    pub classpath: Vec<PathBuf>,

    /// Directory receiving compiled outputs. Created if missing.
    pub output_dir: PathBuf,

    /// Additional scalac parameters as one option string.
    pub scalac_options: String,

    /// Additional javac parameters as one option string.
    pub javac_options: String,

    /// Compiler plugin artifacts, resolved and appended as
    /// `-Xplugin:` flags.
    pub plugin_artifacts: Vec<Coordinate>,

    /// Source file encoding merged into both option lists unless an
    /// explicit `-encoding` flag is already present.
    pub source_encoding: Option<String>,

    /// Incremental compilation analysis cache file for this project.
    pub analysis_cache_file: PathBuf,

    /// Other modules' build artifact file -> their analysis cache file,
    /// for cross-module incremental reuse.
    pub analysis_cache_map: BTreeMap<PathBuf, PathBuf>,

    /// Order in which mixed Scala/Java sources are compiled.
    pub compile_order: CompileOrder,

    /// Ordered mappers rewriting diagnostic positions from generated
    /// sources back to authored sources.
    pub position_mappers: MapperChain,

    /// Logger supplied by the host build tool.
    pub logger: Arc<dyn CompilerLogger>,
}

impl CompileConfig {
    /// Create a configuration with the required fields; everything else
    /// starts empty.
    pub fn new(
        sources: Vec<PathBuf>,
        classpath: Vec<PathBuf>,
        output_dir: impl Into<PathBuf>,
        analysis_cache_file: impl Into<PathBuf>,
    ) -> Self {
        CompileConfig {
            sources,
            classpath,
            output_dir: output_dir.into(),
            scalac_options: String::new(),
            javac_options: String::new(),
            plugin_artifacts: Vec::new(),
            source_encoding: None,
            analysis_cache_file: analysis_cache_file.into(),
            analysis_cache_map: BTreeMap::new(),
            compile_order: CompileOrder::default(),
            position_mappers: MapperChain::default(),
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_scalac_options(mut self, options: impl Into<String>) -> Self {
        self.scalac_options = options.into();
        self
    }

    pub fn with_javac_options(mut self, options: impl Into<String>) -> Self {
        self.javac_options = options.into();
        self
    }

    pub fn with_source_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.source_encoding = Some(encoding.into());
        self
    }

    pub fn with_plugin_artifacts(mut self, artifacts: Vec<Coordinate>) -> Self {
        self.plugin_artifacts = artifacts;
        self
    }

    pub fn with_analysis_cache_map(mut self, map: BTreeMap<PathBuf, PathBuf>) -> Self {
        self.analysis_cache_map = map;
        self
    }

    /// Fill in option strings from the bridge defaults files. Options
    /// the host supplied explicitly are kept as-is.
    pub fn with_defaults(mut self, defaults: &BridgeDefaults) -> Self {
        if self.scalac_options.is_empty() {
            self.scalac_options = defaults.scalac_options().to_string();
        }
        if self.javac_options.is_empty() {
            self.javac_options = defaults.javac_options().to_string();
        }
        self
    }

    pub fn with_compile_order(mut self, order: CompileOrder) -> Self {
        self.compile_order = order;
        self
    }

    pub fn with_position_mappers(mut self, mappers: MapperChain) -> Self {
        self.position_mappers = mappers;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn CompilerLogger>) -> Self {
        self.logger = logger;
        self
    }
}

/// Directory for incremental compilation cache files next to an output
/// directory: `classes` becomes `cache`, `test-classes` becomes `cache`.
pub fn cache_directory(output_dir: &Path) -> PathBuf {
    let name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // test-classes first, otherwise "classes" inside it would match.
    let cache_name = name.replace("test-classes", "cache").replace("classes", "cache");
    match output_dir.parent() {
        Some(parent) => parent.join(cache_name),
        None => PathBuf::from(cache_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = CompileConfig::new(
            vec![PathBuf::from("src/App.scala")],
            vec![],
            "target/classes",
            "target/cache/compile",
        )
        .with_scalac_options("-deprecation")
        .with_source_encoding("UTF-8");

        assert_eq!(config.scalac_options, "-deprecation");
        assert_eq!(config.javac_options, "");
        assert_eq!(config.source_encoding.as_deref(), Some("UTF-8"));
        assert!(config.analysis_cache_map.is_empty());
    }

    #[test]
    fn test_defaults_fill_only_unset_options() {
        let defaults = BridgeDefaults::default();
        let config = CompileConfig::new(vec![], vec![], "target/classes", "target/cache/compile")
            .with_javac_options("-parameters")
            .with_defaults(&defaults);

        assert_eq!(config.scalac_options, "-deprecation -unchecked");
        assert_eq!(config.javac_options, "-parameters");
    }

    #[test]
    fn test_cache_directory_main() {
        assert_eq!(
            cache_directory(Path::new("target/classes")),
            PathBuf::from("target/cache")
        );
    }

    #[test]
    fn test_cache_directory_test() {
        assert_eq!(
            cache_directory(Path::new("target/test-classes")),
            PathBuf::from("target/cache")
        );
    }
}
