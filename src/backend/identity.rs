//! Backend identities.
//!
//! A [`CompilerId`] is the symbolic token selecting one well-known
//! backend line; a [`BackendDescriptor`] adds the default Scala and
//! Zinc versions that identity implies when the project pins neither.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a well-known compiler backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerId {
    /// Zinc 1.9.x compatible backend.
    Zinc19,
    /// Zinc 2.0.0 backend.
    Zinc200,
    /// Zinc 2.0.1 backend.
    Zinc201,
    /// Zinc 2.0.x line head (2.0.5).
    Zinc205,
}

/// The identity selected when nothing narrows the choice.
pub const LATEST_COMPILER_ID: CompilerId = CompilerId::Zinc205;

impl CompilerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerId::Zinc19 => "zinc19",
            CompilerId::Zinc200 => "zinc200",
            CompilerId::Zinc201 => "zinc201",
            CompilerId::Zinc205 => "zinc205",
        }
    }

    /// Artifact id of the backend implementation for this identity.
    pub fn backend_artifact_id(&self) -> String {
        format!("caravel-backend-{}", self.as_str())
    }

    /// Descriptor with the default versions this identity implies.
    pub fn descriptor(&self) -> BackendDescriptor {
        match self {
            CompilerId::Zinc19 => BackendDescriptor::new(*self, "2.13.10", "1.9.3"),
            CompilerId::Zinc200 => BackendDescriptor::new(*self, "3.3.1", "2.0.0"),
            CompilerId::Zinc201 => BackendDescriptor::new(*self, "3.3.3", "2.0.1"),
            CompilerId::Zinc205 => BackendDescriptor::new(*self, "3.4.2", "2.0.5"),
        }
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an invalid compiler ID.
#[derive(Debug, Clone)]
pub struct CompilerIdParseError(pub String);

impl fmt::Display for CompilerIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid compiler ID '{}', valid values: zinc19, zinc200, zinc201, zinc205",
            self.0
        )
    }
}

impl std::error::Error for CompilerIdParseError {}

impl FromStr for CompilerId {
    type Err = CompilerIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zinc19" => Ok(CompilerId::Zinc19),
            "zinc200" => Ok(CompilerId::Zinc200),
            "zinc201" => Ok(CompilerId::Zinc201),
            "zinc205" => Ok(CompilerId::Zinc205),
            _ => Err(CompilerIdParseError(s.to_string())),
        }
    }
}

/// Identity plus the default versions it implies. Pure value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub id: CompilerId,

    /// Scala version used when the project neither pins one nor has a
    /// scala-library dependency.
    pub default_scala_version: String,

    /// Zinc version used when the project pins none.
    pub default_zinc_version: String,
}

impl BackendDescriptor {
    fn new(id: CompilerId, scala: &str, zinc: &str) -> Self {
        BackendDescriptor {
            id,
            default_scala_version: scala.to_string(),
            default_zinc_version: zinc.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_parse_display() {
        for id in [
            CompilerId::Zinc19,
            CompilerId::Zinc200,
            CompilerId::Zinc201,
            CompilerId::Zinc205,
        ] {
            assert_eq!(id.as_str().parse::<CompilerId>().unwrap(), id);
        }
        assert!("zinc999".parse::<CompilerId>().is_err());
    }

    #[test]
    fn test_backend_artifact_id() {
        assert_eq!(CompilerId::Zinc205.backend_artifact_id(), "caravel-backend-zinc205");
    }

    #[test]
    fn test_descriptor_versions() {
        let descriptor = CompilerId::Zinc19.descriptor();
        assert_eq!(descriptor.default_zinc_version, "1.9.3");
        assert_eq!(descriptor.default_scala_version, "2.13.10");
    }
}
