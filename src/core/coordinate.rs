//! Artifact coordinates - WHAT artifact (group + artifact + version).
//!
//! Coordinates address artifacts in the packaging repository the host
//! build tool resolves from. They are pure values with no lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A packaging repository coordinate: `group:artifact:version` with an
/// optional classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl Coordinate {
    /// Create a coordinate without a classifier.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Coordinate {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    /// Attach a classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(ref classifier) = self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

/// Error returned when parsing an invalid coordinate string.
#[derive(Debug, Clone, Error)]
#[error("invalid artifact coordinate `{0}`, expected group:artifact:version[:classifier]")]
pub struct CoordinateParseError(pub String);

impl FromStr for Coordinate {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 3 || parts.len() > 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(CoordinateParseError(s.to_string()));
        }

        let mut coord = Coordinate::new(parts[0], parts[1], parts[2]);
        if parts.len() == 4 {
            coord = coord.with_classifier(parts[3]);
        }
        Ok(coord)
    }
}

/// Parse a space- or comma-delimited list of coordinates.
///
/// Duplicates are preserved; callers concatenating lists from several
/// sources rely on that.
pub fn parse_coordinate_list(list: &str) -> Result<Vec<Coordinate>, CoordinateParseError> {
    list.split([' ', ','])
        .filter(|token| !token.is_empty())
        .map(Coordinate::from_str)
        .collect()
}
