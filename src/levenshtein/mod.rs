//! Levenshtein automata: every string within edit distance `n` of a word.
//!
//! Construction instantiates a shared parametric table (see `parametric`)
//! against the concrete target:
//!
//! - A DFA state is a `(parametric state, base offset)` pair
//! - On each distinct character of the current target window, the
//!   characteristic vector selects the table entry
//! - Every other character shares the all-zero vector, so it becomes a
//!   handful of gap ranges to one target
//!
//! With transpositions enabled, swapping two adjacent characters counts as
//! one edit (restricted Damerau-Levenshtein).

mod parametric;

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::automaton::{concatenate, make_string, Automaton, StateArena, StateId, MAX_CODE_POINT};
use crate::{AutomatonError, Result};

use parametric::{table, ParametricTable, Step};

/// Largest edit distance `to_automaton` accepts.
pub const MAXIMUM_SUPPORTED_DISTANCE: u32 = 3;

/// Builds Levenshtein automata for one target word.
///
/// The builder itself only holds the word; the per-distance tables are
/// process-wide and built lazily.
#[derive(Clone, Debug)]
pub struct LevenshteinAutomata {
    word: Vec<u32>,
    transpositions: bool,
}

impl LevenshteinAutomata {
    pub fn new(target: &str, with_transpositions: bool) -> Self {
        Self::from_code_points(target.chars().map(u32::from).collect(), with_transpositions)
    }

    pub fn from_code_points(word: Vec<u32>, with_transpositions: bool) -> Self {
        Self {
            word,
            transpositions: with_transpositions,
        }
    }

    pub fn word(&self) -> &[u32] {
        &self.word
    }

    /// Accepts exactly the strings within distance `n` of the word.
    pub fn to_automaton(&self, n: u32) -> Result<Automaton> {
        if n > MAXIMUM_SUPPORTED_DISTANCE {
            return Err(AutomatonError::DistanceTooLarge {
                requested: n,
                max: MAXIMUM_SUPPORTED_DISTANCE,
            });
        }
        if n == 0 {
            return Ok(Automaton::from_labels(self.word.clone()));
        }
        Ok(self.instantiate(&table(n, self.transpositions)))
    }

    /// `prefix` followed by anything within distance `n` of the word.
    pub fn to_automaton_with_prefix(&self, n: u32, prefix: &str) -> Result<Automaton> {
        Ok(concatenate(&make_string(prefix), &self.to_automaton(n)?))
    }

    fn instantiate(&self, table: &ParametricTable) -> Automaton {
        let word_len = self.word.len();
        let mut arena = StateArena::new();
        let mut ids: FxHashMap<(u32, usize), StateId> = FxHashMap::default();
        let mut queue = VecDeque::new();

        let initial = arena.alloc();
        ids.insert((0, 0), initial);
        queue.push_back((0u32, 0usize, initial));

        let mut chars: Vec<u32> = Vec::with_capacity(table.window());
        while let Some((state, base, id)) = queue.pop_front() {
            arena[id].accept = table.is_accept(state, base, word_len);

            let len = table.window().min(word_len - base);
            let window = &self.word[base..base + len];
            chars.clear();
            chars.extend_from_slice(window);
            chars.sort_unstable();
            chars.dedup();

            let mut target = |step: Option<Step>,
                              arena: &mut StateArena,
                              queue: &mut VecDeque<(u32, usize, StateId)>| {
                step.map(|s| {
                    let key = (s.state, base + s.shift as usize);
                    *ids.entry(key).or_insert_with(|| {
                        let fresh = arena.alloc();
                        queue.push_back((key.0, key.1, fresh));
                        fresh
                    })
                })
            };

            for &c in &chars {
                let bits = window
                    .iter()
                    .enumerate()
                    .filter(|&(_, &w)| w == c)
                    .fold(0u32, |acc, (i, _)| acc | (1 << i));
                if let Some(to) = target(table.step(state, len, bits), &mut arena, &mut queue) {
                    arena.add_transition(id, c, c, to);
                }
            }

            // Every character outside the window behaves the same.
            if let Some(to) = target(table.step(state, len, 0), &mut arena, &mut queue) {
                let mut next = 0u32;
                for &c in &chars {
                    if c > next {
                        arena.add_transition(id, next, c - 1, to);
                    }
                    next = c + 1;
                }
                if next <= MAX_CODE_POINT {
                    arena.add_transition(id, next, MAX_CODE_POINT, to);
                }
            }
        }

        let mut a = Automaton::from_arena(arena, initial);
        a.reduce();
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{intersection, make_char, repeat, same_language, subset_of, union_all};

    fn lev(word: &str, n: u32) -> Automaton {
        LevenshteinAutomata::new(word, false).to_automaton(n).unwrap()
    }

    fn lev_t(word: &str, n: u32) -> Automaton {
        LevenshteinAutomata::new(word, true).to_automaton(n).unwrap()
    }

    /// Every single-edit variant of `word` over `alphabet`, plus the word.
    fn one_edit_union(word: &str, alphabet: &[char], transpositions: bool) -> Automaton {
        let chars: Vec<char> = word.chars().collect();
        let mut variants: Vec<String> = vec![word.to_string()];
        for i in 0..=chars.len() {
            for &c in alphabet {
                let mut inserted = chars.clone();
                inserted.insert(i, c);
                variants.push(inserted.into_iter().collect());
            }
        }
        for i in 0..chars.len() {
            let mut deleted = chars.clone();
            deleted.remove(i);
            variants.push(deleted.into_iter().collect());
            for &c in alphabet {
                let mut substituted = chars.clone();
                substituted[i] = c;
                variants.push(substituted.into_iter().collect());
            }
            if transpositions && i + 1 < chars.len() {
                let mut swapped = chars.clone();
                swapped.swap(i, i + 1);
                variants.push(swapped.into_iter().collect());
            }
        }
        union_all(&variants.iter().map(|v| make_string(v)).collect::<Vec<_>>())
    }

    #[test]
    fn test_distance_zero_is_literal() {
        let a = lev("foo", 0);
        assert!(a.is_singleton());
        assert!(a.run("foo"));
        assert!(!a.run("fo"));
    }

    #[test]
    fn test_distance_one() {
        let a = lev("cat", 1);
        assert!(a.is_deterministic());
        for s in ["cat", "at", "ct", "ca", "bat", "cot", "cab", "scat", "cart", "cats"] {
            assert!(a.run(s), "{s}");
        }
        for s in ["", "c", "dog", "tac", "cast!", "catss"] {
            assert!(!a.run(s), "{s}");
        }
        assert!(!a.run("act"), "a transposition costs two edits");
        assert!(lev_t("cat", 1).run("act"));
    }

    #[test]
    fn test_distance_one_matches_explicit_union() {
        // Outside the word's characters every code point behaves alike, so
        // an alphabet with one extra character covers all cases.
        let alphabet = ['a', 'b', 'x'];
        let sigma_star = repeat(&union_all(
            &alphabet.iter().map(|&c| make_char(c)).collect::<Vec<_>>(),
        ));
        for word in ["", "a", "ab", "aba", "abba"] {
            for transpositions in [false, true] {
                let expected = one_edit_union(word, &alphabet, transpositions);
                let a = LevenshteinAutomata::new(word, transpositions)
                    .to_automaton(1)
                    .unwrap();
                assert!(
                    same_language(&intersection(&a, &sigma_star), &expected),
                    "word {word:?}, transpositions {transpositions}"
                );
            }
        }
    }

    #[test]
    fn test_empty_word() {
        let a = lev("", 2);
        assert!(a.run(""));
        assert!(a.run("x"));
        assert!(a.run("xy"));
        assert!(!a.run("xyz"));
    }

    #[test]
    fn test_monotonic_and_transposition_superset() {
        for word in ["kitten", "aab", "ab"] {
            for n in 1..=MAXIMUM_SUPPORTED_DISTANCE {
                assert!(subset_of(&lev(word, n - 1), &lev(word, n)), "{word} n={n}");
                assert!(subset_of(&lev_t(word, n - 1), &lev_t(word, n)), "{word} n={n}");
                assert!(subset_of(&lev(word, n), &lev_t(word, n)), "{word} n={n}");
            }
        }
    }

    #[test]
    fn test_non_ascii() {
        let a = lev_t("naïve", 1);
        assert!(a.run("naive"));
        assert!(a.run("naïv"));
        assert!(!a.run("aïnve"));
        assert!(a.run("anïve"));
        let far = lev("😀😀", 1);
        assert!(far.run("😀"));
        assert!(far.run("😀x😀"));
    }

    #[test]
    fn test_with_prefix() {
        let lev = LevenshteinAutomata::new("bar", false);
        let a = lev.to_automaton_with_prefix(1, "foo").unwrap();
        assert!(a.run("foobar"));
        assert!(a.run("foobr"));
        assert!(a.run("foobaz"));
        assert!(!a.run("fobar"));
        assert!(!a.run("bar"));
    }

    #[test]
    fn test_distance_too_large() {
        let err = LevenshteinAutomata::new("abc", false)
            .to_automaton(MAXIMUM_SUPPORTED_DISTANCE + 1)
            .unwrap_err();
        assert_eq!(
            err,
            AutomatonError::DistanceTooLarge {
                requested: MAXIMUM_SUPPORTED_DISTANCE + 1,
                max: MAXIMUM_SUPPORTED_DISTANCE
            }
        );
    }
}
