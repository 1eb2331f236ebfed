//! The part tree produced by [`crate::parse`], and the `unwrap`
//! operation that turns a tree back into a string in either its
//! specific or generic form.

/// The kind of a single node in a parsed property key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// The synthetic root of a parsed key. Always has exactly one
    /// [`PartKind::Whole`] child.
    Root,
    /// The interior of the whole key, or of an override/placeholder.
    /// Its children are the dot-separated literal/override/placeholder
    /// parts.
    Whole,
    /// A run of `[A-Za-z0-9_-]` characters forming one dot-separated
    /// segment. Always a leaf.
    Literal,
    /// A `{...}` segment. Has exactly one [`PartKind::Whole`] child
    /// holding its interior.
    Override,
    /// A `${...}` segment. Has exactly one [`PartKind::Whole`] child
    /// holding its interior. Left untouched by `unwrap` — placeholder
    /// expansion is a separate pass over the resolved value.
    Placeholder,
}

/// One node of a parsed property key.
///
/// `start`/`end` are a half-open byte range into the original key
/// string; `raw` is that substring. Children's ranges are strictly
/// nested within the parent's and never overlap each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Which grammar production this node came from.
    pub kind: PartKind,
    /// Start byte offset into the original key string (inclusive).
    pub start: usize,
    /// End byte offset into the original key string (exclusive).
    pub end: usize,
    /// The substring `key[start..end]`.
    pub raw: String,
    /// Ordered, non-overlapping child parts.
    pub children: Vec<Part>,
}

impl Part {
    pub(crate) fn new(kind: PartKind, start: usize, end: usize, raw: String) -> Self {
        Self {
            kind,
            start,
            end,
            raw,
            children: Vec::new(),
        }
    }

    pub(crate) fn with_children(mut self, children: Vec<Part>) -> Self {
        self.children = children;
        self
    }

    /// Render this part (and its subtree) back to a string.
    ///
    /// With `keep_overrides` true, override braces are dropped but
    /// their interior is kept (the "specific" form); with it false,
    /// the entire override subtree is dropped (the "generic" form).
    /// Placeholder parts are always rendered as their raw `${...}`
    /// text, regardless of `keep_overrides` — placeholder expansion is
    /// a later pass over the resolved value, not part of unwrapping.
    pub fn unwrap(&self, keep_overrides: bool) -> String {
        match self.kind {
            PartKind::Root => {
                let whole = self
                    .children
                    .first()
                    .expect("Root part always has exactly one Whole child");
                whole.unwrap(keep_overrides)
            }
            PartKind::Whole => {
                // Children's own unwraps never carry the dot that
                // separated them in the source (literals stop short
                // of it, overrides/placeholders never had one): join
                // with '.', but only between parts that actually
                // produced something, so a dropped override doesn't
                // leave a stray separator behind. This is also what
                // gives the trailing-dot trimming its effect, without
                // a special case for it: a dropped trailing override
                // simply contributes nothing to join.
                self.children
                    .iter()
                    .map(|child| child.unwrap(keep_overrides))
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(".")
            }
            PartKind::Literal => {
                if self.raw == "." {
                    String::new()
                } else {
                    self.raw.clone()
                }
            }
            PartKind::Override => {
                if keep_overrides {
                    self.children
                        .first()
                        .expect("Override part always has exactly one Whole child")
                        .unwrap(keep_overrides)
                } else {
                    String::new()
                }
            }
            PartKind::Placeholder => self.raw.clone(),
        }
    }
}

/// The result of successfully parsing a property key: a rooted tree
/// whose single child is the [`PartKind::Whole`] spanning the whole
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTree {
    /// The synthetic [`PartKind::Root`] node; its one child is the
    /// [`PartKind::Whole`] spanning the entire key.
    pub root: Part,
}

impl PartTree {
    /// The specific normalized form: override braces dropped, their
    /// contents kept.
    pub fn specific(&self) -> String {
        self.root.unwrap(true)
    }

    /// The generic normalized form: override segments dropped
    /// entirely.
    pub fn generic(&self) -> String {
        self.root.unwrap(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn dot_literal_unwraps_empty() {
        // Constructed directly: a stray `.`-only literal should
        // unwrap to nothing rather than a literal `.` character.
        let lit = Part::new(PartKind::Literal, 0, 1, ".".to_string());
        assert_eq!(lit.unwrap(true), "");
    }

    #[test]
    fn trailing_dot_is_trimmed_when_generic_drops_a_trailing_override() {
        let tree = parse("persistence.db.{username}").unwrap();
        assert_eq!(tree.generic(), "persistence.db");
        assert!(!tree.generic().ends_with('.'));
    }

    #[test]
    fn specific_and_generic_diverge_only_on_overrides() {
        let tree = parse("a.b.{c}.d").unwrap();
        assert_eq!(tree.specific(), "a.b.c.d");
        assert_eq!(tree.generic(), "a.b.d");
    }
}
