//! The properties-file loader: turns a `.properties`-style file into
//! a flat string-to-string mapping, and a [`crate::source::Source`]
//! labeled by its path.

use crate::error::ConfigurationError;
use crate::source::Source;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a properties file should be looked for, and whether its
/// absence is fatal.
#[derive(Debug, Clone)]
pub struct PropertiesFileSpec {
    /// The path to search for, relative to either the resource root
    /// or the process working directory.
    pub path: PathBuf,
    /// If true, search the packaged resource root; else the process
    /// working directory.
    pub is_resource: bool,
    /// If true and the file is absent, building the registry fails.
    pub required: bool,
}

impl PropertiesFileSpec {
    /// A required file searched relative to the working directory.
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_resource: false,
            required: true,
        }
    }

    /// An optional file searched relative to the working directory.
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_resource: false,
            required: false,
        }
    }

    fn resolve(&self, resource_root: Option<&Path>) -> PathBuf {
        if self.is_resource {
            resource_root
                .map(|root| root.join(&self.path))
                .unwrap_or_else(|| self.path.clone())
        } else {
            self.path.clone()
        }
    }

    /// Load this spec into a [`Source`] labeled by its path, or
    /// `None` if it was optional and absent.
    pub fn load(&self, resource_root: Option<&Path>) -> Result<Option<Source>, ConfigurationError> {
        let resolved = self.resolve(resource_root);
        let label = self.path.display().to_string();
        let text = match std::fs::read_to_string(&resolved) {
            Ok(text) => text,
            Err(_) if self.required => {
                return Err(ConfigurationError::MissingPropertiesFile(label));
            }
            Err(_) => return Ok(None),
        };
        let map = parse_properties(&text);
        Ok(Some(Source::from_map(label, map)))
    }
}

/// Parse `.properties`-file text into a flat mapping.
///
/// One `key=value` or `key:value` pair per logical line. `#` and `!`
/// start a comment when they are the first non-whitespace character
/// on a line. A line ending in an unescaped `\` continues onto the
/// next. Recognizes the customary backslash escapes (`\n`, `\t`,
/// `\r`, `\\`, `\:`, `\=`, `\ `) plus `\uXXXX`.
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut lines = text.lines();
    while let Some(raw_line) = lines.next() {
        let mut logical = raw_line.trim_start().to_string();
        while logical.ends_with('\\') && !logical.ends_with("\\\\") {
            logical.pop();
            match lines.next() {
                Some(cont) => logical.push_str(cont.trim_start()),
                None => break,
            }
        }
        if logical.is_empty() {
            continue;
        }
        let first = logical.chars().next().unwrap();
        if first == '#' || first == '!' {
            continue;
        }
        if let Some((key, value)) = split_key_value(&logical) {
            map.insert(unescape(&key), unescape(&value));
        }
    }
    map
}

/// Find the first unescaped `=`, `:`, or run of whitespace separating
/// a properties-file key from its value.
fn split_key_value(line: &str) -> Option<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut key = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            key.push('\\');
            key.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if c == '=' || c == ':' || c == ' ' || c == '\t' {
            break;
        }
        key.push(c);
        i += 1;
    }
    let rest: String = chars[i..].iter().collect();
    let rest = rest.trim_start();
    let value = if let Some(stripped) = rest.strip_prefix('=').or_else(|| rest.strip_prefix(':')) {
        stripped.trim_start()
    } else {
        rest
    };
    if key.is_empty() {
        None
    } else {
        Some((key, value.to_string()))
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(':') => out.push(':'),
            Some('=') => out.push('='),
            Some(' ') => out.push(' '),
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                if let Ok(code) = u32::from_str_radix(&hex, 16) {
                    if let Some(ch) = char::from_u32(code) {
                        out.push(ch);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
