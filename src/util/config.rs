//! Configuration file support for the bridge.
//!
//! Two locations are consulted:
//! - Global: `~/.caravel/bridge.toml` - user-wide defaults
//! - Project: `.caravel/bridge.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, field by field.
//! These are defaults only; the host build tool can override any of
//! them when assembling a [`CompileConfig`](crate::core::CompileConfig).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default additional javac parameters.
pub const DEFAULT_JAVAC_OPTIONS: &str = "-g";

/// Default additional scalac parameters.
pub const DEFAULT_SCALAC_OPTIONS: &str = "-deprecation -unchecked";

/// Bridge defaults loaded from configuration files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeDefaults {
    /// Forced Scala version. When absent, the version is taken from the
    /// project classpath or the selected backend's default.
    pub scala_version: Option<String>,

    /// Forced toolchain (Zinc) version used for backend selection.
    pub zinc_version: Option<String>,

    /// Framework version hint used for backend selection when no
    /// toolchain version is known.
    pub framework_version: Option<String>,

    /// Additional parameters for the Java compiler.
    pub javac_options: Option<String>,

    /// Additional parameters for the Scala compiler.
    pub scalac_options: Option<String>,

    /// Source position mapper artifacts, `group:artifact:version`
    /// triples, space- or comma-delimited. Concatenated with the list
    /// supplied by the host build tool, never deduplicated.
    pub position_mappers: Option<String>,
}

impl BridgeDefaults {
    /// Load defaults from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read bridge config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse bridge config: {}", path.display()))
    }

    /// Load defaults with fallback when the file doesn't exist or is
    /// malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load bridge config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another set of defaults over this one. Fields present in
    /// `over` win.
    pub fn merged_with(mut self, over: BridgeDefaults) -> Self {
        if over.scala_version.is_some() {
            self.scala_version = over.scala_version;
        }
        if over.zinc_version.is_some() {
            self.zinc_version = over.zinc_version;
        }
        if over.framework_version.is_some() {
            self.framework_version = over.framework_version;
        }
        if over.javac_options.is_some() {
            self.javac_options = over.javac_options;
        }
        if over.scalac_options.is_some() {
            self.scalac_options = over.scalac_options;
        }
        if over.position_mappers.is_some() {
            self.position_mappers = over.position_mappers;
        }
        self
    }

    /// Effective javac option string.
    pub fn javac_options(&self) -> &str {
        self.javac_options.as_deref().unwrap_or(DEFAULT_JAVAC_OPTIONS)
    }

    /// Effective scalac option string.
    pub fn scalac_options(&self) -> &str {
        self.scalac_options
            .as_deref()
            .unwrap_or(DEFAULT_SCALAC_OPTIONS)
    }
}

/// Path to the project-level bridge config inside a project directory.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".caravel").join("bridge.toml")
}

/// Path to the global bridge config, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".caravel").join("bridge.toml"))
}

/// Load defaults, applying project config over global config.
pub fn load_defaults(global: &Path, project: &Path) -> BridgeDefaults {
    BridgeDefaults::load_or_default(global).merged_with(BridgeDefaults::load_or_default(project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_files_missing() {
        let tmp = TempDir::new().unwrap();
        let defaults = load_defaults(&tmp.path().join("none"), &tmp.path().join("none2"));

        assert_eq!(defaults.javac_options(), "-g");
        assert_eq!(defaults.scalac_options(), "-deprecation -unchecked");
        assert!(defaults.zinc_version.is_none());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "zinc_version = \"1.9.3\"\nscalac_options = \"-feature\"\n",
        )
        .unwrap();
        std::fs::write(&project, "zinc_version = \"2.0.3\"\n").unwrap();

        let defaults = load_defaults(&global, &project);
        assert_eq!(defaults.zinc_version.as_deref(), Some("2.0.3"));
        assert_eq!(defaults.scalac_options(), "-feature");
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "zinc_version = [not toml").unwrap();

        assert_eq!(BridgeDefaults::load_or_default(&path), BridgeDefaults::default());
    }
}
