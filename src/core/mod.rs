//! Core value types: compilation requests, diagnostics, and results.

pub mod analysis;
pub mod config;
pub mod coordinate;
pub mod position;
pub mod problem;

pub use analysis::{Analysis, AnalysisStore, FileAnalysis, FileAnalysisStore};
pub use config::{cache_directory, CompileConfig};
pub use coordinate::{parse_coordinate_list, Coordinate};
pub use position::SourcePosition;
pub use problem::{CompilationProblem, Severity};
