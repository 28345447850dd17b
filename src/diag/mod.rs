//! Diagnostic normalization: console fallback parsing and position
//! remapping.

pub mod parse;
pub mod remap;

pub use parse::parse_javac_problems;
pub use remap::{mapper_artifacts, MapperChain, SourcePositionMapper};
