//! The single-pass state-machine tokenizer that turns a property key
//! string into a [`PartTree`].

use crate::error::{ParseError, ParseErrorKind};
use crate::tree::{Part, PartKind, PartTree};

/// One entry in the part-building stack. Invariant: the stack always
/// alternates `Whole`, then zero or more `(Wrapper, Whole)` pairs on
/// top of it — the top of the stack at the start of processing any
/// character is always a `Whole`.
enum Frame {
    Whole {
        start: usize,
        children: Vec<Part>,
        /// Byte offset where an in-progress literal began, if any.
        literal_start: Option<usize>,
        /// True when the next non-whitespace input must begin a new
        /// part: at the very start of this whole, and immediately
        /// after consuming a `.` separator.
        awaiting_part: bool,
    },
    Wrapper {
        kind: PartKind,
        start: usize,
    },
}

impl Frame {
    fn new_whole(start: usize) -> Self {
        Frame::Whole {
            start,
            children: Vec::new(),
            literal_start: None,
            awaiting_part: true,
        }
    }
}

/// Parse a property key string into its [`PartTree`].
///
/// See the module-level grammar description for the accepted syntax:
/// dot-separated literal parts, `{...}` overrides, and `${...}`
/// placeholders, each of which may nest recursively.
pub fn parse(key: &str) -> Result<PartTree, ParseError> {
    let chars: Vec<(usize, char)> = key.char_indices().collect();
    let eof_index = key.len();
    let mut stack: Vec<Frame> = vec![Frame::new_whole(0)];
    let mut pos = 0usize;
    let mut last_progress: Option<(usize, usize, bool, bool)> = None;

    loop {
        let marker = progress_marker(pos, &stack);
        if last_progress == Some(marker) {
            let at = chars.get(pos).map(|&(i, _)| i).unwrap_or(eof_index);
            return Err(ParseError::new(at, ParseErrorKind::InternalLoop));
        }
        last_progress = Some(marker);

        let Some(&(idx, c)) = chars.get(pos) else {
            return finish(stack, key, eof_index);
        };

        match c {
            '$' => {
                if matches!(chars.get(pos + 1), Some(&(_, '{'))) {
                    close_literal(&mut stack, key, idx)?;
                    mark_part_started(&mut stack);
                    stack.push(Frame::Wrapper {
                        kind: PartKind::Placeholder,
                        start: idx,
                    });
                    stack.push(Frame::new_whole(idx + 2));
                    pos += 2;
                } else {
                    return Err(ParseError::new(idx, ParseErrorKind::DollarWithoutBrace));
                }
            }
            '{' => {
                close_literal(&mut stack, key, idx)?;
                mark_part_started(&mut stack);
                stack.push(Frame::Wrapper {
                    kind: PartKind::Override,
                    start: idx,
                });
                stack.push(Frame::new_whole(idx + 1));
                pos += 1;
            }
            '}' => {
                close_literal(&mut stack, key, idx)?;
                close_wrapper(&mut stack, key, idx)?;
                pos += 1;
            }
            '.' => {
                let awaiting = match stack.last() {
                    Some(Frame::Whole { awaiting_part, .. }) => *awaiting_part,
                    _ => unreachable!("stack top is always a Whole between characters"),
                };
                if awaiting {
                    return Err(ParseError::new(idx, ParseErrorKind::UnexpectedPartBoundary));
                }
                close_literal(&mut stack, key, idx)?;
                if let Some(Frame::Whole {
                    literal_start,
                    awaiting_part,
                    ..
                }) = stack.last_mut()
                {
                    *literal_start = None;
                    *awaiting_part = true;
                }
                pos += 1;
            }
            c if c.is_ascii_alphanumeric() => {
                match stack.last_mut() {
                    Some(Frame::Whole {
                        literal_start: literal_start @ None,
                        awaiting_part,
                        ..
                    }) => {
                        *literal_start = Some(idx);
                        *awaiting_part = false;
                    }
                    Some(Frame::Whole { .. }) => {}
                    _ => unreachable!(),
                }
                pos += 1;
            }
            '-' | '_' => {
                let prev_alnum = idx > 0 && key[..idx].chars().next_back().is_some_and(|p| p.is_ascii_alphanumeric());
                let next_alnum = chars
                    .get(pos + 1)
                    .is_some_and(|&(_, n)| n.is_ascii_alphanumeric());
                let literal_open = matches!(
                    stack.last(),
                    Some(Frame::Whole { literal_start: Some(_), .. })
                );
                if literal_open && prev_alnum && next_alnum {
                    pos += 1;
                } else {
                    let kind = if c == '-' {
                        ParseErrorKind::IllegalHyphen(c)
                    } else {
                        ParseErrorKind::IllegalUnderscore(c)
                    };
                    return Err(ParseError::new(idx, kind));
                }
            }
            other => {
                return Err(ParseError::new(idx, ParseErrorKind::UnsupportedCharacter(other)));
            }
        }
    }
}

fn progress_marker(pos: usize, stack: &[Frame]) -> (usize, usize, bool, bool) {
    match stack.last() {
        Some(Frame::Whole {
            literal_start,
            awaiting_part,
            ..
        }) => (pos, stack.len(), literal_start.is_some(), *awaiting_part),
        _ => (pos, stack.len(), false, false),
    }
}

fn mark_part_started(stack: &mut [Frame]) {
    if let Some(Frame::Whole { awaiting_part, .. }) = stack.last_mut() {
        *awaiting_part = false;
    }
}

/// Close any in-progress literal at the top of the stack, appending it
/// as a child of the enclosing whole.
fn close_literal(stack: &mut [Frame], key: &str, end: usize) -> Result<(), ParseError> {
    if let Some(Frame::Whole {
        children,
        literal_start,
        ..
    }) = stack.last_mut()
    {
        if let Some(start) = literal_start.take() {
            debug_assert!(start < end, "a literal frame is never created empty");
            children.push(Part::new(
                PartKind::Literal,
                start,
                end,
                key[start..end].to_string(),
            ));
        }
    }
    Ok(())
}

/// Pop the interior `Whole` and its `Wrapper`, attaching the completed
/// override/placeholder part to the now-top enclosing whole.
fn close_wrapper(stack: &mut Vec<Frame>, key: &str, close_idx: usize) -> Result<(), ParseError> {
    if stack.len() < 2 {
        return Err(ParseError::new(close_idx, ParseErrorKind::UnmatchedCloseBrace));
    }
    let inner = match stack.pop().unwrap() {
        Frame::Whole {
            start, children, ..
        } => {
            if children.is_empty() {
                return Err(ParseError::new(start, ParseErrorKind::BlankPart));
            }
            Part::new(PartKind::Whole, start, close_idx, key[start..close_idx].to_string())
                .with_children(children)
        }
        Frame::Wrapper { .. } => unreachable!("stack alternates Whole/Wrapper"),
    };
    match stack.pop().unwrap() {
        Frame::Wrapper { kind, start } => {
            let end = close_idx + 1;
            let part =
                Part::new(kind, start, end, key[start..end].to_string()).with_children(vec![inner]);
            match stack.last_mut() {
                Some(Frame::Whole { children, .. }) => children.push(part),
                _ => unreachable!("a Wrapper always sits directly atop an enclosing Whole"),
            }
        }
        Frame::Whole { .. } => unreachable!("stack alternates Whole/Wrapper"),
    }
    Ok(())
}

fn finish(mut stack: Vec<Frame>, key: &str, eof: usize) -> Result<PartTree, ParseError> {
    close_literal(&mut stack, key, eof)?;
    if stack.len() > 1 {
        // Report the position of the last character consumed, not one
        // past the end of the string — matches the cursor convention
        // the resolution engine's tests pin for end-of-input errors.
        let at = eof.saturating_sub(1);
        return Err(ParseError::new(at, ParseErrorKind::UnterminatedBrace));
    }
    let whole = match stack.pop().unwrap() {
        Frame::Whole {
            start, children, ..
        } => {
            if children.is_empty() {
                return Err(ParseError::new(0, ParseErrorKind::BlankPart));
            }
            Part::new(PartKind::Whole, start, eof, key[start..eof].to_string())
                .with_children(children)
        }
        Frame::Wrapper { .. } => unreachable!(),
    };
    let root = Part::new(PartKind::Root, 0, eof, key.to_string()).with_children(vec![whole]);
    Ok(PartTree { root })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::PartKind;
    use pretty_assertions::assert_eq;

    fn kinds(key: &str) -> Vec<PartKind> {
        parse(key)
            .unwrap()
            .root
            .children
            .first()
            .unwrap()
            .children
            .iter()
            .map(|p| p.kind)
            .collect()
    }

    #[test]
    fn literal_chain() {
        assert_eq!(
            kinds("persistence.db.username"),
            vec![PartKind::Literal, PartKind::Literal, PartKind::Literal]
        );
    }

    #[test]
    fn override_part() {
        let tree = parse("persistence.db.{username}").unwrap();
        let whole = &tree.root.children[0];
        assert_eq!(whole.children.len(), 3);
        assert_eq!(whole.children[2].kind, PartKind::Override);
        assert_eq!(whole.children[2].children[0].raw, "username");
    }

    #[test]
    fn placeholder_part() {
        let tree = parse("${expanded.second}").unwrap();
        let whole = &tree.root.children[0];
        assert_eq!(whole.children.len(), 1);
        assert_eq!(whole.children[0].kind, PartKind::Placeholder);
    }

    #[test]
    fn hyphen_and_underscore_allowed_between_alnum() {
        assert!(parse("my-service.feature_flag").is_ok());
    }

    #[test]
    fn unsupported_character() {
        let err = parse("my.@property.key").unwrap_err();
        assert_eq!(err.index, 3);
        assert_eq!(
            err.to_string(),
            "Unsupported character '@' in property key"
        );
    }

    #[test]
    fn leading_dot() {
        let err = parse(".my.property.key").unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.to_string(), "Unexpected end of property part");
    }

    #[test]
    fn unmatched_close_brace() {
        let err = parse("my.property.key}").unwrap_err();
        assert_eq!(err.index, 15);
        assert_eq!(err.to_string(), "Unexpected '}'");
    }

    #[test]
    fn unterminated_override() {
        let err = parse("{my.property.key").unwrap_err();
        assert_eq!(err.index, 15);
        assert_eq!(
            err.to_string(),
            "Unexpected end of property part, expected '}'"
        );
    }

    #[test]
    fn illegal_hyphen() {
        let err = parse("my.-property.key").unwrap_err();
        assert_eq!(err.index, 3);
        assert_eq!(err.to_string(), "Unexpected '-', illegal use of hyphen");
    }

    #[test]
    fn illegal_trailing_hyphen() {
        let err = parse("my.property-.key").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected '-', illegal use of hyphen");
    }

    #[test]
    fn blank_override_is_rejected() {
        assert!(parse("my.property.{}").is_err());
    }

    #[test]
    fn blank_placeholder_is_rejected() {
        assert!(parse("my.property.${}").is_err());
    }

    #[test]
    fn dollar_without_brace() {
        let err = parse("my.$property").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected '$', placeholders require brackets"
        );
    }

    #[test]
    fn nested_placeholder_inside_override() {
        let tree = parse("some.flag.for.{${found.key}}").unwrap();
        let whole = &tree.root.children[0];
        let over = whole.children.iter().find(|p| p.kind == PartKind::Override).unwrap();
        let inner_whole = &over.children[0];
        assert_eq!(inner_whole.children[0].kind, PartKind::Placeholder);
    }

    #[test]
    fn round_trip_preserves_non_override_characters() {
        for key in [
            "persistence.db.username",
            "some.flag.for.{kiwi}",
            "${expanded.second}",
            "a.b-c.d_e",
        ] {
            let tree = parse(key).unwrap();
            assert_eq!(tree.root.children[0].raw, key);
        }
    }
}
