//! Source position remapping.
//!
//! Frameworks that compile generated intermediate sources (templates,
//! routes) want diagnostics reported against the files a human wrote.
//! A [`MapperChain`] holds an ordered sequence of mappers; the first
//! one that knows the position wins. A mapper that fails is treated as
//! "not found" for that mapper only - remapping never fails a
//! compilation.

use anyhow::Result;

use crate::core::coordinate::{parse_coordinate_list, Coordinate, CoordinateParseError};
use crate::core::position::SourcePosition;

/// Assemble the mapper artifact list from its two configuration
/// sources: the list the host build tool supplies directly and the one
/// from the bridge defaults files. The lists are concatenated, never
/// deduplicated; mapper order is significant and hosts ship defaults
/// that may overlap with project configuration.
pub fn mapper_artifacts(
    configured: Option<&str>,
    defaults: Option<&str>,
) -> Result<Vec<Coordinate>, CoordinateParseError> {
    let mut artifacts = Vec::new();
    for list in [configured, defaults].into_iter().flatten() {
        artifacts.extend(parse_coordinate_list(list)?);
    }
    Ok(artifacts)
}

/// Maps a position in a generated source to the position in the
/// original authored source, when known.
pub trait SourcePositionMapper: Send {
    /// Set the source file encoding. Called once before the first
    /// [`map`](Self::map) call.
    fn set_charset(&mut self, charset_name: &str);

    /// Return the authored-source position, or `None` when this mapper
    /// does not know the given position.
    fn map(&self, position: &SourcePosition) -> Result<Option<SourcePosition>>;
}

/// Ordered chain of position mappers.
#[derive(Default)]
pub struct MapperChain {
    mappers: Vec<Box<dyn SourcePositionMapper>>,
}

impl MapperChain {
    pub fn new(mappers: Vec<Box<dyn SourcePositionMapper>>) -> Self {
        MapperChain { mappers }
    }

    pub fn push(&mut self, mapper: Box<dyn SourcePositionMapper>) {
        self.mappers.push(mapper);
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Propagate the source encoding to every mapper.
    pub fn set_charset(&mut self, charset_name: &str) {
        for mapper in &mut self.mappers {
            mapper.set_charset(charset_name);
        }
    }

    /// Try each mapper in order; first hit wins. Mappers after the hit
    /// are not consulted. A failing mapper is skipped.
    pub fn map(&self, position: &SourcePosition) -> Option<SourcePosition> {
        for mapper in &self.mappers {
            match mapper.map(position) {
                Ok(Some(mapped)) => return Some(mapped),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!("position mapper failed, skipping: {e:?}");
                }
            }
        }
        None
    }

    /// Like [`map`](Self::map), but falls back to the input position
    /// when no mapper matches.
    pub fn map_or_keep(&self, position: &SourcePosition) -> SourcePosition {
        self.map(position).unwrap_or_else(|| position.clone())
    }
}
