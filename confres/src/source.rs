//! The layered source registry: an ordered list of named
//! string-to-string lookups, searched in reverse insertion order.

use crate::error::ConfigurationError;
use std::fmt;
use std::sync::Arc;

type LookupFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// A single named lookup: `label` identifies it for logging and
/// duplicate-detection, `lookup` resolves a key to a value.
#[derive(Clone)]
pub struct Source {
    label: String,
    lookup: Arc<LookupFn>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source").field("label", &self.label).finish()
    }
}

impl Source {
    /// Build a source from a label and a lookup closure.
    pub fn new(label: impl Into<String>, lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            lookup: Arc::new(lookup),
        }
    }

    /// Build a source backed by a static key-value mapping.
    pub fn from_map(
        label: impl Into<String>,
        map: std::collections::HashMap<String, String>,
    ) -> Self {
        Self::new(label, move |key: &str| map.get(key).cloned())
    }

    /// The sentinel used to drop a deferred factory's output: never
    /// registered, pruned at build time.
    pub(crate) fn empty() -> Self {
        Self::new(EMPTY_LABEL, |_| None)
    }

    pub(crate) fn is_empty_sentinel(&self) -> bool {
        self.label == EMPTY_LABEL
    }

    /// This source's label, e.g. a properties-file path or an
    /// application-chosen name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolve `key` against this source alone.
    pub fn lookup(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }
}

const EMPTY_LABEL: &str = "\0confres::empty";
const ROOT_LABEL: &str = "ROOT";

/// A source whose construction depends on the already-registered
/// static sources, resolved in a single post-build pass.
///
/// Only one level of deferral is supported: a deferred source may
/// consult the static first-pass registry, but a deferred factory may
/// not itself register another deferred source.
pub struct DeferredSource {
    factory: Box<dyn FnOnce(&SourceRegistry) -> Source + Send>,
}

impl DeferredSource {
    /// Wrap a factory that inspects the static-only registry and
    /// produces a source, or [`Source::empty`]-equivalent via
    /// returning `None` from `factory`, to be pruned at build.
    pub fn new(factory: impl FnOnce(&SourceRegistry) -> Option<Source> + Send + 'static) -> Self {
        Self {
            factory: Box::new(move |reg| factory(reg).unwrap_or_else(Source::empty)),
        }
    }
}

/// The finalized, immutable registry of sources.
///
/// Priority is reverse insertion order: the source added last is
/// consulted first. The synthetic `ROOT` source is always present and
/// always resolves to `None` — it exists purely as a floor label for
/// scan traces.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    /// Highest priority first.
    sources: Vec<Source>,
}

impl SourceRegistry {
    /// Build a registry from static sources and deferred factories,
    /// enforcing label uniqueness and running the single deferred
    /// initialization pass.
    ///
    /// `static_sources` and `deferred` are both given in insertion
    /// order (earliest first); within the finalized registry, later
    /// entries across both lists outrank earlier ones, and all
    /// deferred sources are resolved after every static one, so a
    /// deferred source always outranks the static sources it was
    /// built from.
    pub fn build(
        static_sources: Vec<Source>,
        deferred: Vec<DeferredSource>,
    ) -> Result<Self, ConfigurationError> {
        let transient = SourceRegistry {
            sources: static_sources.iter().rev().cloned().collect(),
        };

        let mut resolved: Vec<Source> = static_sources;
        for d in deferred {
            let source = (d.factory)(&transient);
            if !source.is_empty_sentinel() {
                resolved.push(source);
            }
        }

        let mut seen = std::collections::HashSet::new();
        for s in &resolved {
            if !seen.insert(s.label.clone()) {
                return Err(ConfigurationError::DuplicateSourceLabel(s.label.clone()));
            }
        }

        resolved.reverse();
        resolved.push(Source::new(ROOT_LABEL, |_| None));
        Ok(SourceRegistry { sources: resolved })
    }

    /// Labels in descending priority order, as logged at build time.
    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    /// Scan from highest to lowest priority, returning the first hit
    /// along with the label that produced it.
    pub fn find(&self, key: &str) -> Option<(String, &str)> {
        self.sources
            .iter()
            .find_map(|s| s.lookup(key).map(|v| (v, s.label())))
    }
}
