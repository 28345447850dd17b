//! Source positions for compilation problems.
//!
//! Positions come from two places: a backend's native diagnostics and
//! the fallback console parser. Backends differ in what they know, so
//! every field has an explicit "unknown" convention instead of being
//! optional wholesale:
//! - `line`: one-based, `<= 0` means unknown
//! - `line_content`: raw text of the offending line, empty means unknown
//! - `offset`: zero-based character offset, `< 0` means unknown
//! - `pointer`: column of the caret under the offending line (count of
//!   characters preceding it), `< 0` means unknown
//! - `file`: originating file, optional

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Position of a diagnostic within a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: i32,
    pub line_content: String,
    pub offset: i64,
    pub pointer: i32,
    pub file: Option<PathBuf>,
}

impl SourcePosition {
    /// Create a position with every field supplied.
    pub fn new(
        line: i32,
        line_content: impl Into<String>,
        offset: i64,
        pointer: i32,
        file: Option<PathBuf>,
    ) -> Self {
        SourcePosition {
            line,
            line_content: line_content.into(),
            offset,
            pointer,
            file,
        }
    }

    /// A fully unknown position.
    pub fn unknown() -> Self {
        SourcePosition {
            line: -1,
            line_content: String::new(),
            offset: -1,
            pointer: -1,
            file: None,
        }
    }

    pub fn has_line(&self) -> bool {
        self.line > 0
    }

    pub fn has_pointer(&self) -> bool {
        self.pointer >= 0
    }
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.has_line()) {
            (Some(file), true) => write!(f, "{}:{}", file.display(), self.line),
            (Some(file), false) => write!(f, "{}", file.display()),
            (None, true) => write!(f, "<unknown>:{}", self.line),
            (None, false) => write!(f, "<unknown>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_position() {
        let pos = SourcePosition::unknown();
        assert!(!pos.has_line());
        assert!(!pos.has_pointer());
        assert_eq!(pos.to_string(), "<unknown>");
    }

    #[test]
    fn test_display_with_file_and_line() {
        let pos = SourcePosition::new(10, "val x = 1", -1, 2, Some(PathBuf::from("Foo.scala")));
        assert_eq!(pos.to_string(), "Foo.scala:10");
    }
}
