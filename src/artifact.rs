//! Boundary to the host build tool's artifact resolution service.
//!
//! The bridge never talks to repositories itself; the host supplies an
//! implementation of [`ArtifactResolver`]. Resolution failures are
//! fatal for the invocation that needed them and always carry the
//! exact coordinate that failed.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::coordinate::Coordinate;

/// Artifact resolution failure.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    /// The artifact does not exist in any configured repository.
    #[error("required artifact {coordinate} not found")]
    #[diagnostic(
        code(caravel::resolve::not_found),
        help("Check the coordinate and the configured repositories")
    )]
    NotFound { coordinate: Coordinate },

    /// The artifact exists but could not be resolved.
    #[error("failed to resolve artifact {coordinate}")]
    #[diagnostic(code(caravel::resolve::failed))]
    Failed {
        coordinate: Coordinate,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ResolveError {
    /// The coordinate that failed to resolve.
    pub fn coordinate(&self) -> &Coordinate {
        match self {
            ResolveError::NotFound { coordinate } => coordinate,
            ResolveError::Failed { coordinate, .. } => coordinate,
        }
    }
}

/// Resolves packaging repository coordinates to local files.
pub trait ArtifactResolver: Send + Sync {
    /// Resolve one artifact to its local file.
    fn resolve(&self, coordinate: &Coordinate) -> Result<PathBuf, ResolveError>;

    /// Resolve an artifact plus its full transitive dependency closure.
    /// Coordinates for which `exclude` returns true are dropped, along
    /// with their subtrees.
    fn resolve_transitive(
        &self,
        coordinate: &Coordinate,
        exclude: &dyn Fn(&Coordinate) -> bool,
    ) -> Result<Vec<PathBuf>, ResolveError>;
}
