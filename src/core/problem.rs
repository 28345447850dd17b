//! Uniform compilation problem model.
//!
//! Backend-native diagnostics are normalized into this representation
//! so callers never see a backend's own types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::position::SourcePosition;

/// Problem severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One normalized compilation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationProblem {
    /// Backend-specific category, empty when the backend has none.
    pub category: String,

    /// Human-readable message, possibly multi-line.
    pub message: String,

    pub severity: Severity,

    pub position: SourcePosition,
}

impl CompilationProblem {
    pub fn new(
        category: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        position: SourcePosition,
    ) -> Self {
        CompilationProblem {
            category: category.into(),
            message: message.into(),
            severity,
            position,
        }
    }

    /// Shorthand for an error problem with no category.
    pub fn error(message: impl Into<String>, position: SourcePosition) -> Self {
        Self::new("", message, Severity::Error, position)
    }
}

impl fmt::Display for CompilationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.severity, self.message)
    }
}
