//! Primitive automaton constructors.
//!
//! This module contains the leaves every larger automaton is built from:
//! - `make_empty` / `make_empty_string`: the two degenerate languages
//! - `make_string` / `make_code_points`: literal (singleton) automata
//! - `make_char` / `make_char_range` / `make_any_char`: one-symbol languages
//! - `make_any_string`: every string
//! - `make_prefix`: a literal followed by anything
//! - `make_string_union`: minimal DFA for a sorted word list

use super::arena::{StateArena, MAX_CODE_POINT};
use super::fa::Automaton;
use super::operations::concatenate;
use super::string_union;
use crate::{AutomatonError, Result};

/// Accepts no strings at all.
pub fn make_empty() -> Automaton {
    Automaton::empty()
}

/// Accepts only the empty string.
pub fn make_empty_string() -> Automaton {
    Automaton::empty_string()
}

/// Accepts exactly `s`.
///
/// The result stays in the singleton form until an operation needs states.
pub fn make_string(s: &str) -> Automaton {
    Automaton::from_labels(s.chars().map(u32::from).collect())
}

/// Accepts exactly the given code-point sequence.
///
/// Unlike `&str`, this can express unpaired surrogates.
pub fn make_code_points(code_points: &[u32]) -> Result<Automaton> {
    if let Some(&bad) = code_points.iter().find(|&&cp| cp > MAX_CODE_POINT) {
        return Err(AutomatonError::InvalidCodePoint(bad));
    }
    Ok(Automaton::from_labels(code_points.to_vec()))
}

/// Accepts the single character `c`.
pub fn make_char(c: char) -> Automaton {
    single_transition(c as u32, c as u32)
}

/// Accepts any single code point in `[min, max]`.
///
/// An inverted range is the empty language.
pub fn make_char_range(min: u32, max: u32) -> Result<Automaton> {
    if max > MAX_CODE_POINT {
        return Err(AutomatonError::InvalidCodePoint(max));
    }
    if min > max {
        return Ok(make_empty());
    }
    Ok(single_transition(min, max))
}

/// Accepts any single code point.
pub fn make_any_char() -> Automaton {
    single_transition(0, MAX_CODE_POINT)
}

/// Accepts every string.
pub fn make_any_string() -> Automaton {
    let mut arena = StateArena::with_capacity(1);
    let s = arena.alloc_with_accept(true);
    arena.add_transition(s, 0, MAX_CODE_POINT, s);
    Automaton::with_graph(arena, s, true)
}

/// Accepts every string starting with `prefix`.
pub fn make_prefix(prefix: &str) -> Automaton {
    concatenate(&make_string(prefix), &make_any_string())
}

/// Minimal DFA accepting exactly `words`, which must be sorted and unique.
pub fn make_string_union(words: &[&str]) -> Result<Automaton> {
    string_union::build(words)
}

fn single_transition(min: u32, max: u32) -> Automaton {
    let mut arena = StateArena::with_capacity(2);
    let from = arena.alloc();
    let to = arena.alloc_with_accept(true);
    arena.add_transition(from, min, max, to);
    Automaton::with_graph(arena, from, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_string() {
        let a = make_string("héllo");
        assert!(a.is_singleton());
        assert!(a.run("héllo"));
        assert!(!a.run("hello"));
        assert_eq!(a.num_states(), 6);
    }

    #[test]
    fn test_make_code_points_rejects_out_of_range() {
        assert_eq!(
            make_code_points(&[0x61, 0x110000]).unwrap_err(),
            AutomatonError::InvalidCodePoint(0x110000)
        );
        let a = make_code_points(&[0xD800]).unwrap();
        assert!(a.run_code_points(&[0xD800]));
    }

    #[test]
    fn test_make_char_range() {
        let a = make_char_range('b' as u32, 'd' as u32).unwrap();
        assert!(a.run("b"));
        assert!(a.run("d"));
        assert!(!a.run("a"));
        assert!(!a.run("bb"));

        let inverted = make_char_range('d' as u32, 'b' as u32).unwrap();
        assert!(!inverted.run("c"));
        assert_eq!(inverted.num_states(), 1);

        assert!(make_char_range(0, 0x110000).is_err());
    }

    #[test]
    fn test_make_any_char_and_string() {
        let any_char = make_any_char();
        assert!(any_char.run("\u{10FFFF}"));
        assert!(!any_char.run(""));

        let any = make_any_string();
        assert!(any.run(""));
        assert!(any.run("anything at all"));
        assert_eq!(any.num_states(), 1);
    }

    #[test]
    fn test_make_prefix() {
        let a = make_prefix("foo");
        assert!(a.run("foo"));
        assert!(a.run("foobar"));
        assert!(!a.run("fo"));
        assert!(!a.run("xfoo"));
        assert!(a.is_deterministic(), "singleton prefix keeps determinism");
    }

    #[test]
    fn test_make_char() {
        let a = make_char('λ');
        assert!(a.run("λ"));
        assert!(!a.run("l"));
    }
}
