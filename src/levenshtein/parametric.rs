//! Parametric Levenshtein tables.
//!
//! A parametric state is a set of NFA positions relative to a base offset
//! into the target word. Stepping on an input character only depends on the
//! characteristic vector of that character against the window of target
//! characters starting at the base, so the whole transition function can be
//! tabulated once per `(n, transpositions)` and reused for every word.
//!
//! Positions are `(offset, edits)` pairs. With transpositions enabled a
//! position may also be "transposed": the input just read matched
//! `target[offset + 1]`, and only `target[offset]` may follow.

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Position {
    pub offset: u32,
    pub edits: u32,
    pub transposed: bool,
}

impl Position {
    fn standard(offset: u32, edits: u32) -> Self {
        Self {
            offset,
            edits,
            transposed: false,
        }
    }

    /// `self` accepts a superset of what `other` accepts from here on.
    fn subsumes(&self, other: &Position) -> bool {
        !self.transposed
            && !other.transposed
            && other.edits >= self.edits + self.offset.abs_diff(other.offset)
    }
}

/// Next state and how far the base moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Step {
    pub state: u32,
    pub shift: u32,
}

#[derive(Debug)]
pub(crate) struct ParametricTable {
    n: u32,
    /// Normalized position sets; state 0 is `{(0, 0)}`.
    states: Vec<Vec<Position>>,
    /// `steps[state * slots + slot(len, bits)]`; `None` is the dead state.
    steps: Vec<Option<Step>>,
    slots: usize,
}

impl ParametricTable {
    /// Longest characteristic vector: every offset a live position can
    /// look at.
    pub fn window(&self) -> usize {
        2 * self.n as usize + 1
    }

    #[cfg(test)]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Step `state` with a characteristic vector of `len` bits, bit `i` set
    /// iff the input equals `target[base + i]`.
    #[inline]
    pub fn step(&self, state: u32, len: usize, bits: u32) -> Option<Step> {
        self.steps[state as usize * self.slots + slot(len, bits)]
    }

    /// True iff `state` at `base` accepts once the input ends, for a target
    /// of `word_len` code points.
    pub fn is_accept(&self, state: u32, base: usize, word_len: usize) -> bool {
        self.states[state as usize].iter().any(|p| {
            !p.transposed && word_len - (base + p.offset as usize) <= (self.n - p.edits) as usize
        })
    }

    fn build(n: u32, transpositions: bool) -> Self {
        let window = 2 * n as usize + 1;
        let slots = (1usize << (window + 1)) - 1;
        let initial = vec![Position::standard(0, 0)];

        let mut states = vec![initial.clone()];
        let mut ids: FxHashMap<Vec<Position>, u32> = FxHashMap::default();
        ids.insert(initial, 0);
        let mut steps: Vec<Option<Step>> = Vec::new();
        let mut queue = VecDeque::from([0u32]);

        while let Some(id) = queue.pop_front() {
            let base = steps.len();
            steps.resize(base + slots, None);
            for len in 0..=window {
                for bits in 0..(1u32 << len) {
                    let next = transition(&states[id as usize], n, transpositions, len, bits);
                    let Some((positions, shift)) = normalize(next) else {
                        continue;
                    };
                    let state = match ids.get(&positions) {
                        Some(&existing) => existing,
                        None => {
                            let fresh = states.len() as u32;
                            ids.insert(positions.clone(), fresh);
                            states.push(positions);
                            queue.push_back(fresh);
                            fresh
                        }
                    };
                    steps[base + slot(len, bits)] = Some(Step { state, shift });
                }
            }
        }

        Self {
            n,
            states,
            steps,
            slots,
        }
    }
}

#[inline]
fn slot(len: usize, bits: u32) -> usize {
    (1usize << len) - 1 + bits as usize
}

/// Positions reachable from `state` on one character with vector
/// `(len, bits)`, in the current base's coordinates.
fn transition(state: &[Position], n: u32, transpositions: bool, len: usize, bits: u32) -> Vec<Position> {
    let hit = |i: u32| (i as usize) < len && bits & (1 << i) != 0;
    let mut out = Vec::new();
    for p in state {
        if p.transposed {
            if hit(p.offset) {
                out.push(Position::standard(p.offset + 2, p.edits));
            }
            continue;
        }
        let (o, e) = (p.offset, p.edits);
        if e < n {
            // insertion
            out.push(Position::standard(o, e + 1));
            // substitution
            if (o as usize) < len {
                out.push(Position::standard(o + 1, e + 1));
            }
        }
        // match after skipping k target characters
        for k in 0..=n - e {
            if hit(o + k) {
                out.push(Position::standard(o + k + 1, e + k));
            }
        }
        if transpositions {
            for k in 0..n - e {
                if hit(o + k + 1) {
                    out.push(Position {
                        offset: o + k,
                        edits: e + k + 1,
                        transposed: true,
                    });
                }
            }
        }
    }
    out
}

/// Drop subsumed positions, rebase on the smallest offset and sort.
/// `None` when nothing is left.
fn normalize(mut positions: Vec<Position>) -> Option<(Vec<Position>, u32)> {
    positions.sort_unstable();
    positions.dedup();
    let kept: Vec<Position> = positions
        .iter()
        .filter(|p| !positions.iter().any(|q| q != *p && q.subsumes(p)))
        .copied()
        .collect();
    let shift = kept.iter().map(|p| p.offset).min()?;
    let rebased = kept
        .into_iter()
        .map(|p| Position {
            offset: p.offset - shift,
            ..p
        })
        .collect();
    Some((rebased, shift))
}

fn table_cache() -> &'static Mutex<FxHashMap<(u32, bool), Arc<ParametricTable>>> {
    static CACHE: OnceLock<Mutex<FxHashMap<(u32, bool), Arc<ParametricTable>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(FxHashMap::default()))
}

/// Shared table for `(n, transpositions)`, built on first use.
pub(crate) fn table(n: u32, transpositions: bool) -> Arc<ParametricTable> {
    let mut cache = table_cache().lock();
    cache
        .entry((n, transpositions))
        .or_insert_with(|| Arc::new(ParametricTable::build(n, transpositions)))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsumption() {
        let a = Position::standard(0, 0);
        let b = Position::standard(1, 1);
        let c = Position::standard(2, 1);
        assert!(a.subsumes(&b));
        assert!(!a.subsumes(&c));
        let t = Position {
            offset: 1,
            edits: 2,
            transposed: true,
        };
        assert!(!a.subsumes(&t));
    }

    #[test]
    fn test_normalize_rebases() {
        let (positions, shift) = normalize(vec![
            Position::standard(3, 1),
            Position::standard(2, 1),
            Position::standard(3, 2),
        ])
        .unwrap();
        assert_eq!(shift, 2);
        assert_eq!(positions, vec![Position::standard(0, 1), Position::standard(1, 1)]);
        assert!(normalize(Vec::new()).is_none());
    }

    #[test]
    fn test_distance_zero_table() {
        let t = ParametricTable::build(0, false);
        assert_eq!(t.window(), 1);
        assert_eq!(t.num_states(), 1);
        assert_eq!(t.step(0, 1, 1), Some(Step { state: 0, shift: 1 }));
        assert_eq!(t.step(0, 1, 0), None);
        assert_eq!(t.step(0, 0, 0), None);
    }

    #[test]
    fn test_distance_one_initial_steps() {
        let t = ParametricTable::build(1, false);
        // exact match keeps the error-free state and moves on
        let step = t.step(0, 3, 0b001).unwrap();
        assert_eq!(step, Step { state: 0, shift: 1 });
        // a mismatch spends the single edit
        let miss = t.step(0, 3, 0b000).unwrap();
        assert_ne!(miss.state, 0);
        assert!(t.step(miss.state, 3, 0b000).is_none());
    }

    #[test]
    fn test_transpositions_add_states() {
        let plain = ParametricTable::build(1, false);
        let swapped = ParametricTable::build(1, true);
        assert!(swapped.num_states() > plain.num_states());
    }

    #[test]
    fn test_cache_is_shared() {
        let a = table(2, true);
        let b = table(2, true);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &table(2, false)));
    }
}
