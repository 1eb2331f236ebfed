#![deny(missing_docs)]
//! A hierarchical configuration resolution engine.
//!
//! Layers of named [`Source`]s are scanned in reverse insertion order
//! (last registered wins); matched values are recursively expanded
//! for `${...}` placeholders; key segments in `{...}` braces are
//! treated as overrides, falling back to the key without that segment
//! when no override-specific value is configured. An optional
//! [`AgeAwareCache`] bounds how often a key is re-resolved.
//!
//! Key parsing and normalization live in the sibling [`confres_key`]
//! crate; this crate wires that grammar into sources, caching, and
//! expansion.
//!
//! # Example
//!
//! ```rust
//! use confres::ConfigLoaderBuilder;
//! use std::collections::HashMap;
//!
//! let loader = ConfigLoaderBuilder::new()
//!     .with_map_source("app", HashMap::from([
//!         ("some.flag.for".to_string(), "rainbow".to_string()),
//!         ("some.flag.for.kiwi".to_string(), "green".to_string()),
//!     ]))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     loader.get_string("some.flag.for.{kiwi}", 0).unwrap().into_option().as_deref(),
//!     Some("green")
//! );
//! ```

mod cache;
mod clock;
mod engine;
mod error;
mod logger;
mod properties;
mod source;

pub use cache::{AgeAwareCache, Cache, NullCache};
pub use clock::{Clock, FakeClock, SystemClock};
pub use engine::{ConfigLoader, ConfigLoaderBuilder, TypeNames, Value};
pub use error::{ConfigurationError, ParserError};
pub use logger::{Logger, TracingLogger};
pub use properties::{parse_properties, PropertiesFileSpec};
pub use source::{DeferredSource, Source, SourceRegistry};
