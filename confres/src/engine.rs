//! The resolution engine: orchestrates key normalization, priority
//! search over the source registry, recursive placeholder expansion,
//! override fallback, and optional age-aware caching.

use crate::cache::{AgeAwareCache, Cache, NullCache};
use crate::clock::{Clock, SystemClock};
use crate::error::ConfigurationError;
use crate::logger::{Logger, TracingLogger};
use crate::properties::PropertiesFileSpec;
use crate::source::{DeferredSource, Source, SourceRegistry};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// The result of a lookup: the key it was requested for, and the
/// value if one was configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value<T> {
    key: String,
    value: Option<T>,
}

impl<T> Value<T> {
    fn new(key: String, value: Option<T>) -> Self {
        Self { key, value }
    }

    /// The key this value was resolved for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True if a value was configured for this key.
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// The resolved value, discarding the key it came from.
    pub fn into_option(self) -> Option<T> {
        self.value
    }

    /// The resolved value, or a [`ConfigurationError::NotConfigured`]
    /// naming the key.
    pub fn or_else_throw(self) -> Result<T, ConfigurationError> {
        self.value
            .ok_or_else(|| ConfigurationError::NotConfigured(self.key))
    }
}

/// The source-language-specific type names embedded in coercion
/// failure messages.
///
/// The reference implementation this engine's behavior is pinned to
/// reports e.g. `java.lang.Boolean` on a failed boolean coercion.
/// Defaults replicate those literal strings for behavioral parity;
/// override them if your application should report its own type
/// vocabulary instead.
#[derive(Debug, Clone)]
pub struct TypeNames {
    /// Name reported for a failed [`ConfigLoader::get_bool`] coercion.
    pub boolean: String,
    /// Name reported for a failed [`ConfigLoader::get_integer`] coercion.
    pub integer: String,
    /// Name reported for a failed [`ConfigLoader::get_long`] coercion.
    pub long: String,
    /// Name reported for a failed [`ConfigLoader::get_float`] coercion.
    pub float: String,
    /// Name reported for a failed [`ConfigLoader::get_double`] coercion.
    pub double: String,
}

impl Default for TypeNames {
    fn default() -> Self {
        Self {
            boolean: "java.lang.Boolean".to_string(),
            integer: "java.lang.Integer".to_string(),
            long: "java.lang.Long".to_string(),
            float: "java.lang.Float".to_string(),
            double: "java.lang.Double".to_string(),
        }
    }
}

enum PendingSource {
    Static(Source),
    PropertiesFile(PropertiesFileSpec),
}

/// Builds a [`ConfigLoader`] from static sources, deferred sources,
/// and properties files, in the order they're added.
pub struct ConfigLoaderBuilder {
    pending: Vec<PendingSource>,
    deferred: Vec<DeferredSource>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
    cache_enabled: bool,
    type_names: TypeNames,
    resource_root: Option<PathBuf>,
}

impl Default for ConfigLoaderBuilder {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            deferred: Vec::new(),
            clock: Arc::new(SystemClock),
            logger: Arc::new(TracingLogger),
            cache_enabled: true,
            type_names: TypeNames::default(),
            resource_root: None,
        }
    }
}

impl ConfigLoaderBuilder {
    /// Start an empty builder: no sources, a system clock, a tracing
    /// logger, caching enabled, and the default Java-style type names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source directly. Sources added later outrank
    /// sources added earlier.
    pub fn with_source(mut self, source: Source) -> Self {
        self.pending.push(PendingSource::Static(source));
        self
    }

    /// Convenience overload: register a source backed by a static
    /// key-value mapping.
    pub fn with_map_source(self, label: impl Into<String>, map: HashMap<String, String>) -> Self {
        self.with_source(Source::from_map(label, map))
    }

    /// Register a properties-file source. Loaded at [`Self::build`]
    /// time; see [`PropertiesFileSpec`] for the `required`/`is_resource`
    /// contract.
    pub fn with_properties_file(mut self, spec: PropertiesFileSpec) -> Self {
        self.pending.push(PendingSource::PropertiesFile(spec));
        self
    }

    /// Register a deferred source, resolved in a single pass after
    /// every static and properties-file source has been built.
    pub fn with_deferred_source(mut self, deferred: DeferredSource) -> Self {
        self.deferred.push(deferred);
        self
    }

    /// Override the clock used by the cache. Defaults to
    /// [`SystemClock`].
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the logger. Defaults to [`TracingLogger`].
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Disable the cache: every lookup re-resolves from the sources.
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Override the type-name vocabulary used in coercion failure
    /// messages.
    pub fn with_type_names(mut self, type_names: TypeNames) -> Self {
        self.type_names = type_names;
        self
    }

    /// Set the root directory searched for `is_resource` properties
    /// files. Defaults to treating such files as relative to the
    /// process working directory, same as non-resource files.
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    /// Resolve properties files, run the deferred-source pass, and
    /// finalize the registry.
    pub fn build(self) -> Result<ConfigLoader, ConfigurationError> {
        let mut static_sources = Vec::new();
        for entry in self.pending {
            match entry {
                PendingSource::Static(source) => static_sources.push(source),
                PendingSource::PropertiesFile(spec) => {
                    if let Some(source) = spec.load(self.resource_root.as_deref())? {
                        static_sources.push(source);
                    }
                }
            }
        }
        let registry = SourceRegistry::build(static_sources, self.deferred)?;
        self.logger.info(&format!(
            "Building ConfigLoader with the following sources (in descending order of priority): [{}]",
            registry.labels().join(", ")
        ));
        let cache = if self.cache_enabled {
            Cache::Aged(AgeAwareCache::new(self.clock.clone()))
        } else {
            Cache::Disabled(NullCache)
        };
        Ok(ConfigLoader {
            registry,
            cache,
            logger: self.logger,
            type_names: self.type_names,
        })
    }
}

/// The finalized engine: a registry, an optional cache, a logger, and
/// a type-name vocabulary for coercion errors.
pub struct ConfigLoader {
    registry: SourceRegistry,
    cache: Cache,
    logger: Arc<dyn Logger>,
    type_names: TypeNames,
}

impl ConfigLoader {
    /// Resolve `key` to its (possibly placeholder-expanded,
    /// override-resolved) string value.
    ///
    /// With caching enabled, `max_age_ms` bounds how stale a cached
    /// entry may be before this call re-resolves from the sources;
    /// `max_age_ms = 0` re-resolves on every call but still stores the
    /// result. With caching disabled, every call re-resolves.
    pub fn get_string(&self, key: &str, max_age_ms: i64) -> Result<Value<String>, ConfigurationError> {
        let error: RefCell<Option<ConfigurationError>> = RefCell::new(None);
        let fallback = || match self.resolve_raw(key) {
            Ok(value) => value,
            Err(e) => {
                *error.borrow_mut() = Some(e);
                None
            }
        };
        let value = self.cache.get(key, max_age_ms, fallback);
        if let Some(e) = error.into_inner() {
            return Err(e);
        }
        Ok(Value::new(key.to_string(), value))
    }

    /// Resolve `key` and coerce it to a `bool`: case-insensitive
    /// `"true"`/`"false"`, otherwise a coercion error.
    pub fn get_bool(&self, key: &str, max_age_ms: i64) -> Result<Value<bool>, ConfigurationError> {
        self.get_coerced(key, max_age_ms, &self.type_names.boolean.clone(), |s| {
            match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }
        })
    }

    /// Resolve `key` and coerce it to a signed 32-bit integer.
    pub fn get_integer(&self, key: &str, max_age_ms: i64) -> Result<Value<i32>, ConfigurationError> {
        self.get_coerced(key, max_age_ms, &self.type_names.integer.clone(), |s| s.parse().ok())
    }

    /// Resolve `key` and coerce it to a signed 64-bit integer.
    pub fn get_long(&self, key: &str, max_age_ms: i64) -> Result<Value<i64>, ConfigurationError> {
        self.get_coerced(key, max_age_ms, &self.type_names.long.clone(), |s| s.parse().ok())
    }

    /// Resolve `key` and coerce it to an `f32`.
    pub fn get_float(&self, key: &str, max_age_ms: i64) -> Result<Value<f32>, ConfigurationError> {
        self.get_coerced(key, max_age_ms, &self.type_names.float.clone(), |s| s.parse().ok())
    }

    /// Resolve `key` and coerce it to an `f64`.
    pub fn get_double(&self, key: &str, max_age_ms: i64) -> Result<Value<f64>, ConfigurationError> {
        self.get_coerced(key, max_age_ms, &self.type_names.double.clone(), |s| s.parse().ok())
    }

    fn get_coerced<T>(
        &self,
        key: &str,
        max_age_ms: i64,
        type_name: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Value<T>, ConfigurationError> {
        let raw = self.get_string(key, max_age_ms)?;
        match raw.value {
            None => Ok(Value::new(raw.key, None)),
            Some(s) => match parse(&s) {
                Some(v) => Ok(Value::new(raw.key, Some(v))),
                None => Err(ConfigurationError::CoercionFailed {
                    key: raw.key,
                    type_name: type_name.to_string(),
                }),
            },
        }
    }

    /// Normalize, scan, and recursively expand `key`, without cache
    /// interaction. This is the engine's fallback function for a
    /// cache miss, and the recursive step for placeholder expansion.
    fn resolve_raw(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        let mut visited = HashSet::new();
        visited.insert(key.to_string());
        self.resolve_raw_visited(key, visited)
    }

    fn resolve_raw_visited(
        &self,
        key: &str,
        visited: HashSet<String>,
    ) -> Result<Option<String>, ConfigurationError> {
        let expanded_key = self.expand_placeholders(key, &visited)?;
        self.lookup_with_overrides(&expanded_key, &visited)
    }

    /// Substitute every leaf `${...}` region in `s`, innermost first,
    /// recursively resolving each inner key. A region whose inner key
    /// doesn't resolve is written back unchanged, for traceability.
    fn expand_placeholders(
        &self,
        s: &str,
        visited: &HashSet<String>,
    ) -> Result<String, ConfigurationError> {
        let regions = confres_key::find_leaf_regions(s);
        let mut result = s.to_string();
        for region in regions.into_iter().rev() {
            let rk = region.inner_key.clone();
            let mut local_visited = visited.clone();
            if !local_visited.insert(rk.clone()) {
                return Err(ConfigurationError::ExpansionLoop);
            }
            let resolved = self.resolve_raw_visited(&rk, local_visited)?;
            let replacement = resolved.unwrap_or_else(|| format!("${{{rk}}}"));
            result.replace_range(region.start..region.end, &replacement);
        }
        Ok(result)
    }

    /// Try the specific form of `absolute_key`, then its generic form
    /// if different, expanding any placeholders in whichever value
    /// hits first.
    fn lookup_with_overrides(
        &self,
        absolute_key: &str,
        visited: &HashSet<String>,
    ) -> Result<Option<String>, ConfigurationError> {
        let tree = confres_key::parse(absolute_key).map_err(ConfigurationError::from_parse_error)?;
        let specific = tree.specific();
        let generic = tree.generic();

        if let Some(v) = self.scan_sources(&specific) {
            return Ok(Some(self.expand_placeholders(&v, visited)?));
        }
        if generic != specific {
            if let Some(v) = self.scan_sources(&generic) {
                return Ok(Some(self.expand_placeholders(&v, visited)?));
            }
        }
        Ok(None)
    }

    fn scan_sources(&self, key: &str) -> Option<String> {
        match self.registry.find(key) {
            Some((value, label)) => {
                self.logger.info(&format!("Resolved '{key}' from source '{label}'"));
                Some(value)
            }
            None => {
                self.logger.info(&format!("No source provided a value for '{key}'"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn s1_placeholder_chain() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source(
                "app",
                map(&[
                    ("expanded.first", "${expanded.second}"),
                    ("expanded.second", "${expanded.last.1}.${expanded.last.2}.${expanded.last.1}"),
                    ("expanded.last.1", "foo"),
                    ("expanded.last.2", "bar"),
                ]),
            )
            .build()
            .unwrap();
        let v = loader.get_string("expanded.first", 0).unwrap();
        assert_eq!(v.into_option().as_deref(), Some("foo.bar.foo"));
    }

    #[test]
    fn s2_unresolvable_placeholder_preserved() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("app", map(&[("expanded.never", "${expanded.missing}")]))
            .build()
            .unwrap();
        let v = loader.get_string("expanded.never", 0).unwrap();
        assert_eq!(v.into_option().as_deref(), Some("${expanded.missing}"));
    }

    #[test]
    fn s3_override_fallback() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source(
                "app",
                map(&[
                    ("some.flag.for", "rainbow"),
                    ("some.flag.for.kiwi", "green"),
                    ("found.key", "banana"),
                    ("some.flag.for.banana", "yellow"),
                ]),
            )
            .build()
            .unwrap();
        assert_eq!(
            loader.get_string("some.flag.for.{kiwi}", 0).unwrap().into_option().as_deref(),
            Some("green")
        );
        assert_eq!(
            loader.get_string("some.flag.for.{sky}", 0).unwrap().into_option().as_deref(),
            Some("rainbow")
        );
        assert_eq!(
            loader
                .get_string("some.flag.for.{${found.key}}", 0)
                .unwrap()
                .into_option()
                .as_deref(),
            Some("yellow")
        );
    }

    #[test]
    fn s4_expansion_loop() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("app", map(&[("a", "${b}"), ("b", "${a}")]))
            .build()
            .unwrap();
        let err = loader.get_string("a", 0).unwrap_err();
        assert_eq!(err.to_string(), "Property Expansion Loop");
    }

    #[test]
    fn s7_deferred_source_one_pass() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("flags", map(&[("deferredKey", "true")]))
            .with_deferred_source(DeferredSource::new(|reg| {
                let enabled = reg.find("deferredKey").map(|(v, _)| v).as_deref() == Some("true");
                enabled.then(|| Source::from_map("derived", map(&[("some.key", "some value")])))
            }))
            .build()
            .unwrap();
        assert_eq!(
            loader.get_string("some.key", 0).unwrap().into_option().as_deref(),
            Some("some value")
        );
    }

    #[test]
    fn missing_key_is_absent_not_an_error() {
        let loader = ConfigLoaderBuilder::new().build().unwrap();
        let v = loader.get_string("not.there", 0).unwrap();
        assert!(!v.is_present());
        let err = v.or_else_throw().unwrap_err();
        assert_eq!(err.to_string(), "Key for [not.there] not configured");
    }

    #[test]
    fn boolean_coercion_is_case_insensitive() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("app", map(&[("flag", "TRUE")]))
            .build()
            .unwrap();
        assert_eq!(loader.get_bool("flag", 0).unwrap().into_option(), Some(true));
    }

    #[test]
    fn boolean_coercion_failure_reports_configured_type_name() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("app", map(&[("flag", "not-a-bool")]))
            .build()
            .unwrap();
        let err = loader.get_bool("flag", 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not parse 'flag' value as type 'java.lang.Boolean'"
        );
    }

    #[test]
    fn integer_coercion() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("app", map(&[("port", "8080")]))
            .build()
            .unwrap();
        assert_eq!(loader.get_integer("port", 0).unwrap().into_option(), Some(8080));
    }

    #[test]
    fn custom_type_names_are_honored_on_coercion_failure() {
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("app", map(&[("flag", "not-a-bool")]))
            .with_type_names(TypeNames {
                boolean: "bool".to_string(),
                ..TypeNames::default()
            })
            .build()
            .unwrap();
        let err = loader.get_bool("flag", 0).unwrap_err();
        assert_eq!(err.to_string(), "Could not parse 'flag' value as type 'bool'");
    }

    #[test]
    fn cache_can_be_driven_through_the_engine() {
        let clock = Arc::new(FakeClock::new(5000));
        let loader = ConfigLoaderBuilder::new()
            .with_map_source("app", map(&[("k", "v1")]))
            .with_clock(clock.clone())
            .build()
            .unwrap();
        assert_eq!(loader.get_string("k", 5_000).unwrap().into_option().as_deref(), Some("v1"));
        clock.set(10_000);
        assert_eq!(loader.get_string("k", 2_000).unwrap().into_option().as_deref(), Some("v1"));
    }

    #[test]
    fn without_cache_re_resolves_every_call_even_within_the_max_age_window() {
        use std::sync::Mutex;
        let current = Arc::new(Mutex::new("v1".to_string()));
        let current_for_lookup = current.clone();
        let loader = ConfigLoaderBuilder::new()
            .with_source(Source::new("mutable", move |key| {
                (key == "k").then(|| current_for_lookup.lock().unwrap().clone())
            }))
            .without_cache()
            .build()
            .unwrap();
        assert_eq!(loader.get_string("k", 60_000).unwrap().into_option().as_deref(), Some("v1"));
        *current.lock().unwrap() = "v2".to_string();
        assert_eq!(
            loader.get_string("k", 60_000).unwrap().into_option().as_deref(),
            Some("v2"),
            "a disabled cache must re-resolve even under a large max_age"
        );
    }

    #[test]
    fn duplicate_source_labels_fail_at_build() {
        let err = ConfigLoaderBuilder::new()
            .with_source(Source::from_map("dup", HashMap::new()))
            .with_source(Source::from_map("dup", HashMap::new()))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate source label 'dup' found");
    }

    #[test]
    fn build_logs_sources_in_descending_priority() {
        let logger = Arc::new(crate::logger::test_support::RecordingLogger::default());
        ConfigLoaderBuilder::new()
            .with_map_source("first", HashMap::new())
            .with_map_source("second", HashMap::new())
            .with_logger(logger.clone())
            .build()
            .unwrap();
        let info = logger.info.lock().unwrap();
        assert!(info[0].contains("[second, first, ROOT]"));
    }
}
