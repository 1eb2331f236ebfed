#![deny(missing_docs)]
//! Property-key grammar for the configuration resolution engine.
//!
//! This crate knows nothing about sources, caches, or expansion — it
//! only tokenizes a key string (literal parts, `{overrides}`, and
//! `${placeholders}`, dot-separated) into a [`PartTree`], normalizes
//! that tree into its *specific* and *generic* forms, and finds leaf
//! `${...}` regions in an already-unwrapped value string.
//!
//! # Example
//!
//! ```rust
//! use confres_key::{parse, normalize};
//!
//! let tree = parse("persistence.db.{username}").unwrap();
//! assert_eq!(normalize(&tree, true), "persistence.db.username");
//! assert_eq!(normalize(&tree, false), "persistence.db");
//! ```

mod error;
mod normalize;
mod parser;
mod placeholder;
mod tree;

pub use error::{ParseError, ParseErrorKind};
pub use normalize::normalize;
pub use parser::parse;
pub use placeholder::{find_leaf_regions, PlaceholderRegion};
pub use tree::{Part, PartKind, PartTree};
