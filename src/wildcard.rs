//! Wildcard term patterns.
//!
//! `*` matches any sequence, `?` matches exactly one code point and `\`
//! makes the next character literal. A trailing lone `\` is itself literal.

use crate::automaton::{concatenate_all, make_any_char, make_any_string, Automaton};

#[derive(Debug, PartialEq)]
enum WildcardSegment {
    Literal(Vec<u32>),
    AnyChar,
    Star,
}

/// Parse a wildcard pattern, handling `\` escapes.
fn parse_wildcard_pattern(pattern: &str) -> Vec<WildcardSegment> {
    let mut segments = Vec::new();
    let mut current_literal: Vec<u32> = Vec::new();
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        let wildcard = match c {
            '\\' => {
                // Escape: next char is literal, or the backslash itself at the end
                current_literal.push(u32::from(chars.next().unwrap_or('\\')));
                continue;
            }
            '*' => WildcardSegment::Star,
            '?' => WildcardSegment::AnyChar,
            _ => {
                current_literal.push(u32::from(c));
                continue;
            }
        };
        if !current_literal.is_empty() {
            segments.push(WildcardSegment::Literal(std::mem::take(&mut current_literal)));
        }
        // Consecutive stars collapse into one.
        if wildcard == WildcardSegment::Star && segments.last() == Some(&WildcardSegment::Star) {
            continue;
        }
        segments.push(wildcard);
    }

    if !current_literal.is_empty() {
        segments.push(WildcardSegment::Literal(current_literal));
    }

    segments
}

/// Compile a wildcard pattern to an automaton over code points.
///
/// A pattern without wildcards stays a literal automaton.
pub fn wildcard_to_automaton(pattern: &str) -> Automaton {
    let pieces: Vec<Automaton> = parse_wildcard_pattern(pattern)
        .into_iter()
        .map(|segment| match segment {
            WildcardSegment::Literal(labels) => Automaton::from_labels(labels),
            WildcardSegment::AnyChar => make_any_char(),
            WildcardSegment::Star => make_any_string(),
        })
        .collect();
    concatenate_all(&pieces)
}
