//! Fallback parser for javac console diagnostics.
//!
//! Some backends report Java compilation errors only as raw console
//! text, with no structured problems attached to the failure. This
//! parser recovers file/line/message triples from captured error-level
//! output of the form:
//!
//! ```text
//! src/Foo.java:10: error: ';' expected
//!     int x = 1
//!              ^
//!   symbol:   variable x
//! ```
//!
//! Older javac releases emit extra message lines between the header and
//! the source-line echo; those are folded into the message and the
//! buffered line text is rotated forward until the caret line is found.
//! Lines that do not start an error block are skipped one at a time,
//! so arbitrary noise in the output is tolerated.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::position::SourcePosition;
use crate::core::problem::{CompilationProblem, Severity};

static JAVAC_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(.*[.]java):(\d+):\s*(.*)").unwrap());

static JAVAC_ERROR_POSITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\s*)\^\s*").unwrap());

static JAVAC_ERROR_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+([a-z ]+):(.*)$").unwrap());

/// Parse captured console error lines into problems.
///
/// Never fails; input with no recognizable error blocks yields an empty
/// vector.
pub fn parse_javac_problems(lines: &[String]) -> Vec<CompilationProblem> {
    let mut problems = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(header) = JAVAC_ERROR.captures(&lines[i]) else {
            i += 1;
            continue;
        };

        let file = PathBuf::from(&header[1]);
        let line_no: i32 = header[2].parse().unwrap_or(-1);
        let mut message = header[3].to_string();
        if let Some(stripped) = message.strip_prefix("error: ") {
            message = stripped.to_string();
        }

        let mut line_content = String::new();
        let mut pointer = -1;
        i += 1;
        if i < lines.len() {
            line_content = lines[i].clone();
            i += 1;
            let mut caret_found = false;
            while i < lines.len() {
                let line = &lines[i];
                i += 1;
                if let Some(caret) = JAVAC_ERROR_POSITION.captures(line) {
                    pointer = caret[1].chars().count() as i32;
                    caret_found = true;
                    break;
                }
                // Extra message line before the source-line echo: what
                // was buffered as line content belongs to the message.
                message.push_str("\n  ");
                message.push_str(&line_content);
                line_content = line.clone();
            }
            if caret_found {
                while i < lines.len() {
                    let line = &lines[i];
                    if !JAVAC_ERROR_INFO.is_match(line) {
                        break;
                    }
                    message.push('\n');
                    message.push_str(line);
                    i += 1;
                }
            }
        }

        let position = SourcePosition::new(line_no, line_content, -1, pointer, Some(file));
        problems.push(CompilationProblem::new("", message, Severity::Error, position));
    }

    problems
}
