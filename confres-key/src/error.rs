//! Errors produced while tokenizing and parsing a property key.

use std::fmt;

/// The specific syntax violation found while scanning a key.
///
/// Each variant renders to one of the stable, user-visible messages
/// pinned by the resolution engine's test suites. Do not reword these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A `$` was seen that is not immediately followed by `{`.
    DollarWithoutBrace,
    /// A `}` was seen with no open override/placeholder to close.
    UnmatchedCloseBrace,
    /// A `.` was seen where no part had been started, or where the
    /// current part was empty (e.g. a leading or doubled `.`).
    UnexpectedPartBoundary,
    /// End of input reached with an override or placeholder still open.
    UnterminatedBrace,
    /// A literal, whole, override, or placeholder part closed with zero
    /// characters in it.
    BlankPart,
    /// A character outside `[A-Za-z0-9._{}$-]` was encountered.
    UnsupportedCharacter(char),
    /// A `-` appeared without alphanumeric characters on both sides.
    IllegalHyphen(char),
    /// A `_` appeared without alphanumeric characters on both sides.
    IllegalUnderscore(char),
    /// The scanner failed to make progress; this indicates a bug in the
    /// parser itself, not a malformed key.
    InternalLoop,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DollarWithoutBrace => {
                write!(f, "Unexpected '$', placeholders require brackets")
            }
            Self::UnmatchedCloseBrace => write!(f, "Unexpected '}}'"),
            Self::UnexpectedPartBoundary => {
                write!(f, "Unexpected end of property part")
            }
            Self::UnterminatedBrace => {
                write!(f, "Unexpected end of property part, expected '}}'")
            }
            Self::BlankPart => write!(f, "Property part cannot be blank"),
            Self::UnsupportedCharacter(c) => {
                write!(f, "Unsupported character '{c}' in property key")
            }
            Self::IllegalHyphen(c) => {
                write!(f, "Unexpected '{c}', illegal use of hyphen")
            }
            Self::IllegalUnderscore(c) => {
                write!(f, "Unexpected '{c}', illegal use of underscore")
            }
            Self::InternalLoop => write!(
                f,
                "internal error: property key parser made no progress (this is a library bug)"
            ),
        }
    }
}

/// A syntax error found while parsing a property key, at a specific
/// cursor offset into the original key string.
///
/// `Display` renders just the inner message (e.g. `"Unexpected '}'"`),
/// matching the pinned per-cause strings in the resolution engine's
/// test suites. Callers that need the wrapping `"Could not parse
/// property key, error at index N"` form build it themselves from
/// `index` and this error as the cause — see `confres::ConfigurationError`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    /// Byte offset into the key string where the error was detected.
    pub index: usize,
    /// What went wrong at that offset.
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(index: usize, kind: ParseErrorKind) -> Self {
        Self { index, kind }
    }
}
