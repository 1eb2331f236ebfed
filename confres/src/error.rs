//! The engine's two error kinds: key-syntax violations (wrapping
//! [`confres_key::ParseError`]) and everything else a caller can hit
//! at the boundary.

use thiserror::Error;

/// A property key failed to parse.
///
/// `Display` renders the stable, user-visible wrapper string; the
/// inner [`confres_key::ParseError`] (offset + cause) is reachable via
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("Could not parse property key, error at index {}", source.index)]
pub struct ParserError {
    #[source]
    source: confres_key::ParseError,
}

impl ParserError {
    /// Wrap a lower-level key-grammar error.
    pub fn new(source: confres_key::ParseError) -> Self {
        Self { source }
    }

    /// The byte offset the underlying parse error was reported at.
    pub fn index(&self) -> usize {
        self.source.index
    }
}

impl From<confres_key::ParseError> for ParserError {
    fn from(source: confres_key::ParseError) -> Self {
        Self::new(source)
    }
}

/// A user-facing configuration problem.
///
/// These are the failures an application is expected to handle or
/// report directly, as opposed to [`ParserError`], which signals a
/// malformed key.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required `.properties` file was missing at build time.
    #[error("Missing required .properties file for configuration: {0}")]
    MissingPropertiesFile(String),

    /// Two sources were registered under the same label.
    #[error("Duplicate source label '{0}' found")]
    DuplicateSourceLabel(String),

    /// A placeholder expansion chain revisited a key it had already
    /// started expanding.
    #[error("Property Expansion Loop")]
    ExpansionLoop,

    /// `or_else_throw` was called on a [`crate::Value`] with no
    /// resolved value.
    #[error("Key for [{0}] not configured")]
    NotConfigured(String),

    /// A resolved string value could not be coerced to the requested
    /// type.
    #[error("Could not parse '{key}' value as type '{type_name}'")]
    CoercionFailed {
        /// The key whose value failed to coerce.
        key: String,
        /// The configured type name for the target type, e.g.
        /// `java.lang.Integer`.
        type_name: String,
    },

    /// The key itself failed to parse while resolving a lookup.
    #[error(transparent)]
    Parser(#[from] ParserError),
}

impl ConfigurationError {
    /// Shorthand for constructing a [`ConfigurationError::Parser`]
    /// directly from a [`confres_key::ParseError`].
    pub fn from_parse_error(err: confres_key::ParseError) -> Self {
        ConfigurationError::Parser(ParserError::new(err))
    }
}
