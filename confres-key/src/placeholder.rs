//! Finds leaf `${...}` regions in an already-unwrapped value or key
//! string.
//!
//! A *leaf* region is an innermost placeholder: one whose body
//! contains no further `${`. This scanner never looks inside an
//! override (`{...}`) that isn't itself introduced by a `$` — those
//! braces are only tracked so they don't get mistaken for the closing
//! brace of a placeholder that happens to wrap one.

/// One `${...}` occurrence found by [`find_leaf_regions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRegion {
    /// Byte offset of the `$`.
    pub start: usize,
    /// Byte offset one past the closing `}`.
    pub end: usize,
    /// The text between `${` and the matching `}`, unparsed.
    pub inner_key: String,
}

/// Scan `value` for leaf `${...}` regions, left to right.
///
/// Regions are returned in the order their closing `}` was found,
/// which for leaf regions is always left-to-right encounter order.
/// Callers that substitute regions back into the string must do so in
/// REVERSE of this order, so that substituting one region does not
/// shift the byte offsets of the others.
pub fn find_leaf_regions(value: &str) -> Vec<PlaceholderRegion> {
    let chars: Vec<(usize, char)> = value.char_indices().collect();
    let mut regions = Vec::new();
    let mut placeholder_start: Option<usize> = None;
    let mut bracket_depth: i32 = 0;
    let mut i = 0;

    while i < chars.len() {
        let (idx, c) = chars[i];

        if c == '$' && matches!(chars.get(i + 1), Some(&(_, '{'))) {
            // A new `${` resets tracking to this (innermost-so-far)
            // placeholder. When one was already open, its own closing
            // `}` is deliberately left unmatched in this pass — it is
            // not a leaf, so it is the caller's job to re-scan the
            // string once this inner region has been resolved and
            // substituted.
            bracket_depth = if placeholder_start.is_some() { -1 } else { 0 };
            placeholder_start = Some(idx);
            i += 2;
            continue;
        }

        match c {
            '{' if placeholder_start.is_some() => bracket_depth += 1,
            '}' => {
                if let Some(start) = placeholder_start {
                    if bracket_depth > 0 {
                        bracket_depth -= 1;
                    } else {
                        let inner_key = value[start + 2..idx].to_string();
                        regions.push(PlaceholderRegion {
                            start,
                            end: idx + 1,
                            inner_key,
                        });
                        placeholder_start = None;
                        bracket_depth = 0;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    regions
}
