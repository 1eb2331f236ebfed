//! Key normalization: turning a parsed [`PartTree`] into one of its two
//! canonical string forms.

use crate::tree::PartTree;

/// Normalize a parsed key.
///
/// With `keep_overrides` true, produces the *specific* form: override
/// braces are dropped but their contents are kept. With it false,
/// produces the *generic* form: override segments are dropped
/// entirely.
///
/// `normalize(parse("persistence.db.{username}")?, true)` is
/// `"persistence.db.username"`; with `false` it is `"persistence.db"`.
pub fn normalize(parsed: &PartTree, keep_overrides: bool) -> String {
    parsed.root.unwrap(keep_overrides)
}
