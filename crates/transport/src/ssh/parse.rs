use std::ffi::{OsStr, OsString};

use thiserror::Error;

/// Errors reported while splitting a remote shell specification.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RemoteShellParseError {
    /// The specification contained no words.
    #[error("remote shell specification is empty")]
    Empty,
    /// A single or double quote was left open.
    #[error("unterminated quote in remote shell specification")]
    UnterminatedQuote,
}

/// Splits a remote shell specification into words.
///
/// Words are separated by unquoted whitespace. Single quotes preserve their
/// contents literally; double quotes allow `\"` and `\\` escapes; a backslash
/// outside quotes escapes the next character.
///
/// # Errors
///
/// Returns [`RemoteShellParseError`] for empty input or unbalanced quotes.
pub fn parse_remote_shell(spec: &OsStr) -> Result<Vec<OsString>, RemoteShellParseError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let text = spec.to_string_lossy();
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Quote::None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(OsString::from(std::mem::take(&mut current)));
                    in_word = false;
                }
            }
            (Quote::None, '\'') => {
                quote = Quote::Single;
                in_word = true;
            }
            (Quote::None, '"') => {
                quote = Quote::Double;
                in_word = true;
            }
            (Quote::None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
            (Quote::Double, '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => return Err(RemoteShellParseError::UnterminatedQuote),
            },
            (_, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote != Quote::None {
        return Err(RemoteShellParseError::UnterminatedQuote);
    }
    if in_word {
        words.push(OsString::from(current));
    }
    if words.is_empty() {
        return Err(RemoteShellParseError::Empty);
    }
    Ok(words)
}
