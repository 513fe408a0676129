//! Subset construction over range-labelled transitions.
//!
//! For each frontier set the outgoing ranges of all members are collated
//! into start and end events, then swept in label order. Between two
//! consecutive event points the set of "open" targets is constant, and that
//! set becomes one DFA transition. Sets are interned by value, so every
//! distinct subset maps to exactly one DFA state and the walk terminates.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::FxHashMap;

use super::arena::{StateArena, StateId};
use super::fa::Automaton;
use crate::{AutomatonError, Result};

/// Interns sorted NFA state sets as DFA states.
struct SubsetArena {
    map: FxHashMap<Vec<u32>, StateId>,
    states: StateArena,
}

impl SubsetArena {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            states: StateArena::new(),
        }
    }

    /// Returns the DFA state for `set` and whether it was newly created.
    fn intern(&mut self, set: &[u32], accept: bool) -> (StateId, bool) {
        if let Some(&id) = self.map.get(set) {
            debug_assert_eq!(self.states[id].accept, accept);
            return (id, false);
        }
        let id = self.states.alloc_with_accept(accept);
        self.map.insert(set.to_vec(), id);
        (id, true)
    }
}

/// One endpoint of a member transition during the sweep.
#[derive(Clone, Copy)]
struct Event {
    point: u32,
    start: bool,
    target: StateId,
}

/// Determinize in place without a state cap.
pub fn determinize(a: &mut Automaton) {
    if needs_subsets(a) {
        if let Some(dfa) = subset_construction(a, usize::MAX) {
            *a = dfa;
        }
    }
}

/// Determinize in place, failing with [`AutomatonError::TooComplex`] once the
/// DFA would exceed `limit` states. On failure `a` is left untouched.
pub fn determinize_with_limit(a: &mut Automaton, limit: Option<usize>) -> Result<()> {
    if !needs_subsets(a) {
        return Ok(());
    }
    match limit {
        None => determinize(a),
        Some(limit) => {
            *a = subset_construction(a, limit)
                .ok_or(AutomatonError::TooComplex { limit })?;
        }
    }
    Ok(())
}

fn needs_subsets(a: &Automaton) -> bool {
    !a.is_deterministic() && !a.is_singleton()
}

/// The subset DFA of `a`, or `None` once more than `max_states` states
/// would exist.
fn subset_construction(a: &Automaton, max_states: usize) -> Option<Automaton> {
    let (arena, initial) = a.graph();
    let mut subsets = SubsetArena::new();
    let mut worklist: VecDeque<(Vec<u32>, StateId)> = VecDeque::new();

    let start = vec![initial.index() as u32];
    let (dfa_initial, _) = subsets.intern(&start, arena[initial].accept);
    worklist.push_back((start, dfa_initial));

    let mut events: Vec<Event> = Vec::new();
    // Open targets and their multiplicity, ordered so keys form a sorted set.
    let mut open: BTreeMap<u32, u32> = BTreeMap::new();

    while let Some((set, from)) = worklist.pop_front() {
        events.clear();
        for &member in &set {
            for t in &arena[StateId::new(member as usize)].transitions {
                events.push(Event {
                    point: t.min,
                    start: true,
                    target: t.to,
                });
                events.push(Event {
                    point: t.max + 1,
                    start: false,
                    target: t.to,
                });
            }
        }
        if events.is_empty() {
            continue;
        }
        events.sort_unstable_by_key(|e| e.point);

        let mut last_point = 0u32;
        let mut i = 0;
        while i < events.len() {
            let point = events[i].point;
            if !open.is_empty() {
                let targets: Vec<u32> = open.keys().copied().collect();
                let accept = targets
                    .iter()
                    .any(|&s| arena[StateId::new(s as usize)].accept);
                let (to, created) = subsets.intern(&targets, accept);
                if created {
                    if subsets.states.len() > max_states {
                        return None;
                    }
                    worklist.push_back((targets, to));
                }
                subsets.states.add_transition(from, last_point, point - 1, to);
            }
            while i < events.len() && events[i].point == point {
                let event = events[i];
                let key = event.target.index() as u32;
                if event.start {
                    *open.entry(key).or_insert(0) += 1;
                } else if let Some(count) = open.get_mut(&key) {
                    *count -= 1;
                    if *count == 0 {
                        open.remove(&key);
                    }
                }
                i += 1;
            }
            last_point = point;
        }
        debug_assert!(open.is_empty(), "unbalanced sweep");
    }

    let mut dfa = Automaton::with_graph(subsets.states, dfa_initial, true);
    dfa.reduce();
    Some(dfa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::fa_builders::{make_any_string, make_char_range, make_string};
    use crate::automaton::operations::{concatenate, union};

    #[test]
    fn test_determinize_union_of_strings() {
        let mut a = union(&make_string("ab"), &make_string("ac"));
        assert!(!a.is_deterministic());
        determinize(&mut a);
        assert!(a.is_deterministic());
        assert!(a.check_deterministic());
        assert!(a.run("ab"));
        assert!(a.run("ac"));
        assert!(!a.run("a"));
        assert!(!a.run("ad"));
    }

    #[test]
    fn test_determinize_overlapping_ranges() {
        // [a-m] | [h-z]x : overlapping first ranges must split into classes
        let left = make_char_range('a' as u32, 'm' as u32).unwrap();
        let right = concatenate(
            &make_char_range('h' as u32, 'z' as u32).unwrap(),
            &make_string("x"),
        );
        let mut a = union(&left, &right);
        determinize(&mut a);
        assert!(a.check_deterministic());
        for (input, expected) in [
            ("a", true),
            ("m", true),
            ("hx", true),
            ("zx", true),
            ("ax", false),
            ("n", false),
            ("", false),
        ] {
            assert_eq!(a.run(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_determinize_limit() {
        // (.*a.{k}) explodes exponentially in k
        let mut a = concatenate(&make_any_string(), &make_string("a"));
        for _ in 0..8 {
            a = concatenate(&a, &make_char_range(0, 0x10FFFF).unwrap());
        }
        let mut copy = a.clone();
        let err = determinize_with_limit(&mut copy, Some(16)).unwrap_err();
        assert_eq!(err, AutomatonError::TooComplex { limit: 16 });
        assert!(!copy.is_deterministic(), "failed run must not replace input");

        determinize_with_limit(&mut a, Some(1 << 12)).unwrap();
        assert!(a.is_deterministic());
        assert!(a.run("zza12345678"));
        assert!(!a.run("zzb12345678"));
    }

    #[test]
    fn test_capped_and_uncapped_agree() {
        let nfa = union(&make_string("abc"), &concatenate(&make_string("ab"), &make_any_string()));
        let mut plain = nfa.clone();
        determinize(&mut plain);
        let mut unbounded = nfa.clone();
        determinize_with_limit(&mut unbounded, None).unwrap();
        let mut roomy = nfa.clone();
        determinize_with_limit(&mut roomy, Some(64)).unwrap();

        for dfa in [&plain, &unbounded, &roomy] {
            assert!(dfa.is_deterministic());
            assert_eq!(dfa.num_states(), plain.num_states());
            assert_eq!(dfa.num_transitions(), plain.num_transitions());
            assert!(dfa.run("abc"));
            assert!(dfa.run("abz"));
            assert!(!dfa.run("a"));
        }
    }

    #[test]
    fn test_determinize_singleton_is_noop() {
        let mut a = make_string("abc");
        determinize(&mut a);
        assert!(a.is_singleton());
    }
}
