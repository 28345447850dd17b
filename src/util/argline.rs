//! Quote-aware splitting and quoting of compiler option strings.
//!
//! Backend option parameters arrive as single strings (e.g.
//! `-deprecation -unchecked`) and must be cracked into argument vectors
//! before they reach a backend. Splitting honors single and double
//! quotes so paths with spaces survive the round trip.

use thiserror::Error;

/// Error returned for an option string with unterminated quoting.
#[derive(Debug, Clone, Error)]
#[error("unbalanced quotes in `{0}`")]
pub struct UnbalancedQuotes(pub String);

#[derive(PartialEq)]
enum State {
    Normal,
    InQuote,
    InDoubleQuote,
}

/// Split an option string into individual arguments.
///
/// Quoted sections (single or double) are kept as one argument with the
/// quotes removed. An empty or whitespace-only input yields an empty
/// vector.
pub fn split_args(line: &str) -> Result<Vec<String>, UnbalancedQuotes> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    let mut last_was_quoted = false;

    for ch in line.chars() {
        match state {
            State::InQuote => {
                if ch == '\'' {
                    last_was_quoted = true;
                    state = State::Normal;
                } else {
                    current.push(ch);
                }
            }
            State::InDoubleQuote => {
                if ch == '"' {
                    last_was_quoted = true;
                    state = State::Normal;
                } else {
                    current.push(ch);
                }
            }
            State::Normal => match ch {
                '\'' => state = State::InQuote,
                '"' => state = State::InDoubleQuote,
                ' ' => {
                    if last_was_quoted || !current.is_empty() {
                        args.push(std::mem::take(&mut current));
                    }
                    last_was_quoted = false;
                }
                _ => {
                    current.push(ch);
                    last_was_quoted = false;
                }
            },
        }
    }

    if last_was_quoted || !current.is_empty() {
        args.push(current);
    }

    if state != State::Normal {
        return Err(UnbalancedQuotes(line.to_string()));
    }

    Ok(args)
}

/// Wrap a flag value in double quotes when it contains whitespace.
///
/// Used when appending resolved plugin paths as option flags.
pub fn quote_if_needed(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}
