//! Language algebra over automata.
//!
//! Every function here takes its operands by reference and returns a new
//! automaton; inputs are never mutated. Epsilon edges are emulated by
//! copying transitions (see [`StateArena::add_epsilon`]), so results of
//! `union`, `optional`, `repeat` and general `concatenate` are usually
//! nondeterministic until determinized.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use super::arena::{StateArena, StateId, MAX_CODE_POINT};
use super::determinize::determinize;
use super::fa::{reachable, Automaton};

/// Accepts `x + y` for every `x` in `a` and `y` in `b`.
///
/// A literal `a` in front of a deterministic `b` stays deterministic: the
/// literal chain is laid directly in front of `b`'s initial state.
pub fn concatenate(a: &Automaton, b: &Automaton) -> Automaton {
    if let (Some(x), Some(y)) = (a.singleton(), b.singleton()) {
        let mut labels = Vec::with_capacity(x.len() + y.len());
        labels.extend_from_slice(x);
        labels.extend_from_slice(y);
        return Automaton::from_labels(labels);
    }
    if is_empty(a) || is_empty(b) {
        return Automaton::empty();
    }
    if a.singleton().is_some_and(<[u32]>::is_empty) {
        return b.clone();
    }
    if b.singleton().is_some_and(<[u32]>::is_empty) {
        return a.clone();
    }

    if let Some(prefix) = a.singleton() {
        let (tail, tail_initial) = b.graph();
        let mut arena = StateArena::with_capacity(prefix.len() + tail.len());
        let head = arena.alloc();
        let offset = arena.append(&tail);
        let target = StateId::new(tail_initial.index() + offset as usize);
        let mut state = head;
        for (i, &label) in prefix.iter().enumerate() {
            let next = if i + 1 == prefix.len() {
                target
            } else {
                arena.alloc()
            };
            arena.add_transition(state, label, label, next);
            state = next;
        }
        let mut out = Automaton::with_graph(arena, head, b.is_deterministic());
        out.compact();
        return out;
    }

    let (left, left_initial) = a.graph();
    let (right, right_initial) = b.graph();
    let mut arena = left.into_owned();
    let accepts: Vec<StateId> = reachable(&arena, left_initial)
        .into_iter()
        .filter(|&id| arena[id].accept)
        .collect();
    let offset = arena.append(&right);
    let target = StateId::new(right_initial.index() + offset as usize);
    for s in accepts {
        arena[s].accept = false;
        arena.add_epsilon(s, target);
    }
    let mut out = Automaton::with_graph(arena, left_initial, false);
    out.compact();
    out
}

/// Concatenation of a whole list; an empty list is the empty string.
pub fn concatenate_all(list: &[Automaton]) -> Automaton {
    if list.iter().all(Automaton::is_singleton) {
        let labels = list
            .iter()
            .flat_map(|a| a.singleton().unwrap_or_default().iter().copied())
            .collect();
        return Automaton::from_labels(labels);
    }
    if list.iter().any(is_empty) {
        return Automaton::empty();
    }
    let mut iter = list.iter();
    let Some(first) = iter.next() else {
        return Automaton::empty_string();
    };
    iter.fold(first.clone(), |acc, next| concatenate(&acc, next))
}

/// Accepts the strings of `a` or of `b`.
pub fn union(a: &Automaton, b: &Automaton) -> Automaton {
    if let (Some(x), Some(y)) = (a.singleton(), b.singleton()) {
        if x == y {
            return a.clone();
        }
    }
    union_all(&[a.clone(), b.clone()])
}

/// Accepts the strings of any automaton in `list`; an empty list accepts
/// nothing.
pub fn union_all(list: &[Automaton]) -> Automaton {
    let mut arena = StateArena::new();
    let initial = arena.alloc();
    for a in list {
        let (graph, graph_initial) = a.graph();
        let offset = arena.append(&graph);
        arena.add_epsilon(initial, StateId::new(graph_initial.index() + offset as usize));
    }
    let deterministic = list.len() <= 1 && list.iter().all(Automaton::is_deterministic);
    let mut out = Automaton::with_graph(arena, initial, deterministic);
    out.compact();
    out
}

/// Accepts the empty string plus the strings of `a`.
pub fn optional(a: &Automaton) -> Automaton {
    if a.singleton().is_some_and(<[u32]>::is_empty) {
        return a.clone();
    }
    let (graph, graph_initial) = a.graph();
    let mut arena = StateArena::with_capacity(graph.len() + 1);
    let initial = arena.alloc_with_accept(true);
    let offset = arena.append(&graph);
    arena.add_epsilon(initial, StateId::new(graph_initial.index() + offset as usize));
    let mut out = Automaton::with_graph(arena, initial, false);
    out.compact();
    out
}

/// Kleene star: zero or more concatenated strings of `a`.
pub fn repeat(a: &Automaton) -> Automaton {
    let (graph, graph_initial) = a.graph();
    let mut arena = graph.into_owned();
    let accepts: Vec<StateId> = reachable(&arena, graph_initial)
        .into_iter()
        .filter(|&id| arena[id].accept)
        .collect();
    let star = arena.alloc_with_accept(true);
    arena.add_epsilon(star, graph_initial);
    for p in accepts {
        arena.add_epsilon(p, star);
    }
    let mut out = Automaton::with_graph(arena, star, false);
    out.compact();
    out
}

/// `min` or more concatenated strings of `a`.
pub fn repeat_min(a: &Automaton, min: usize) -> Automaton {
    if min == 0 {
        return repeat(a);
    }
    let mut parts = vec![a.clone(); min];
    parts.push(repeat(a));
    concatenate_all(&parts)
}

/// Between `min` and `max` (inclusive) concatenated strings of `a`.
pub fn repeat_range(a: &Automaton, min: usize, max: usize) -> Automaton {
    if min > max {
        return Automaton::empty();
    }
    let head = if min == 0 {
        Automaton::empty_string()
    } else {
        concatenate_all(&vec![a.clone(); min])
    };
    let optional_count = max - min;
    if optional_count == 0 {
        return head;
    }
    // tail_k = a (epsilon | tail_{k-1}), nested so each optional copy can only
    // follow a completed one.
    let mut tail = a.clone();
    for _ in 1..optional_count {
        tail = append_optional(a, &tail);
    }
    append_optional(&head, &tail)
}

/// `base` followed optionally by `tail`: accept states of `base` stay
/// accepting and also continue into `tail`.
fn append_optional(base: &Automaton, tail: &Automaton) -> Automaton {
    let (graph, initial) = base.graph();
    let mut arena = graph.into_owned();
    let accepts: Vec<StateId> = reachable(&arena, initial)
        .into_iter()
        .filter(|&id| arena[id].accept)
        .collect();
    let (tail_graph, tail_initial) = tail.graph();
    let offset = arena.append(&tail_graph);
    let target = StateId::new(tail_initial.index() + offset as usize);
    for p in accepts {
        arena.add_epsilon(p, target);
    }
    let mut out = Automaton::with_graph(arena, initial, false);
    out.compact();
    out
}

/// Accepts every string `a` rejects.
///
/// Any input is determinized and totalized first, so nondeterministic
/// operands are accepted.
pub fn complement(a: &Automaton) -> Automaton {
    let mut out = a.clone_expanded();
    determinize(&mut out);
    out.totalize(MAX_CODE_POINT);
    let (arena, _) = out.graph_mut();
    for state in arena.states_mut() {
        state.accept = !state.accept;
    }
    out.set_deterministic(true);
    out.remove_dead_transitions();
    out
}

/// Strings of `a` that `b` rejects.
pub fn minus(a: &Automaton, b: &Automaton) -> Automaton {
    if is_empty(a) {
        return Automaton::empty();
    }
    if is_empty(b) {
        return a.clone();
    }
    if let Some(literal) = a.singleton() {
        return if b.run_code_points(literal) {
            Automaton::empty()
        } else {
            a.clone()
        };
    }
    intersection(a, &complement(b))
}

/// Strings accepted by both `a` and `b`.
///
/// Product construction over reachable state pairs. Works on NFAs too; the
/// result is deterministic iff both operands are.
pub fn intersection(a: &Automaton, b: &Automaton) -> Automaton {
    if let Some(literal) = a.singleton() {
        return if b.run_code_points(literal) {
            a.clone()
        } else {
            Automaton::empty()
        };
    }
    if let Some(literal) = b.singleton() {
        return if a.run_code_points(literal) {
            b.clone()
        } else {
            Automaton::empty()
        };
    }
    let (left, left_initial) = a.graph();
    let (right, right_initial) = b.graph();
    let left_ts = a.sorted_transitions();
    let right_ts = b.sorted_transitions();

    let mut arena = StateArena::new();
    let mut pairs: FxHashMap<(StateId, StateId), StateId> = FxHashMap::default();
    let mut worklist = VecDeque::new();

    let initial = arena.alloc();
    pairs.insert((left_initial, right_initial), initial);
    worklist.push_back((left_initial, right_initial, initial));

    while let Some((p1, p2, from)) = worklist.pop_front() {
        arena[from].accept = left[p1].accept && right[p2].accept;
        let t1 = &left_ts[p1.index()];
        let t2 = &right_ts[p2.index()];
        let mut b2 = 0;
        for x in t1 {
            while b2 < t2.len() && t2[b2].max < x.min {
                b2 += 1;
            }
            for y in t2[b2..].iter().take_while(|y| x.max >= y.min) {
                if y.max < x.min {
                    continue;
                }
                let to = *pairs.entry((x.to, y.to)).or_insert_with(|| {
                    let id = arena.alloc();
                    worklist.push_back((x.to, y.to, id));
                    id
                });
                arena.add_transition(from, x.min.max(y.min), x.max.min(y.max), to);
            }
        }
    }
    let mut out = Automaton::with_graph(
        arena,
        initial,
        a.is_deterministic() && b.is_deterministic(),
    );
    out.remove_dead_transitions();
    out
}

/// True iff every string of `a` is accepted by `b`.
pub fn subset_of(a: &Automaton, b: &Automaton) -> bool {
    if let Some(literal) = a.singleton() {
        return match b.singleton() {
            Some(other) => literal == other,
            None => b.run_code_points(literal),
        };
    }
    let mut sub = a.clone();
    sub.remove_dead_transitions();
    let mut sup = b.clone_expanded();
    determinize(&mut sup);

    let (left, left_initial) = sub.graph();
    let (right, right_initial) = sup.graph();
    let left_ts = sub.sorted_transitions();
    let right_ts = sup.sorted_transitions();

    let mut visited: FxHashSet<(StateId, StateId)> = FxHashSet::default();
    let mut worklist = VecDeque::new();
    visited.insert((left_initial, right_initial));
    worklist.push_back((left_initial, right_initial));

    while let Some((p1, p2)) = worklist.pop_front() {
        if left[p1].accept && !right[p2].accept {
            return false;
        }
        let t1 = &left_ts[p1.index()];
        let t2 = &right_ts[p2.index()];
        let mut b2 = 0;
        for x in t1 {
            while b2 < t2.len() && t2[b2].max < x.min {
                b2 += 1;
            }
            // `uncovered` is the lowest label of x not yet matched by t2.
            let mut uncovered = Some(x.min);
            for y in t2[b2..].iter().take_while(|y| x.max >= y.min) {
                match uncovered {
                    Some(low) if y.min > low => return false,
                    _ => {}
                }
                uncovered = if y.max < x.max { Some(y.max + 1) } else { None };
                if visited.insert((x.to, y.to)) {
                    worklist.push_back((x.to, y.to));
                }
                if uncovered.is_none() {
                    break;
                }
            }
            if uncovered.is_some() {
                return false;
            }
        }
    }
    true
}

/// True iff `a` and `b` accept exactly the same strings.
pub fn same_language(a: &Automaton, b: &Automaton) -> bool {
    if let (Some(x), Some(y)) = (a.singleton(), b.singleton()) {
        return x == y;
    }
    subset_of(a, b) && subset_of(b, a)
}

/// True iff no accepting state is reachable.
pub fn is_empty(a: &Automaton) -> bool {
    if a.is_singleton() {
        return false;
    }
    let (arena, initial) = a.graph();
    !reachable(&arena, initial)
        .into_iter()
        .any(|id| arena[id].accept)
}

/// True iff `a` accepts the empty string and nothing else.
pub fn is_empty_string(a: &Automaton) -> bool {
    if let Some(literal) = a.singleton() {
        return literal.is_empty();
    }
    let mut live = a.clone();
    live.remove_dead_transitions();
    let (arena, initial) = live.graph();
    arena[initial].accept && arena[initial].transitions.is_empty()
}

/// True iff `a` accepts every string.
pub fn is_total(a: &Automaton) -> bool {
    if a.is_singleton() {
        return false;
    }
    let (arena, initial) = a.graph();
    let state = &arena[initial];
    if state.accept
        && state
            .transitions
            .iter()
            .any(|t| t.to == initial && t.min == 0 && t.max == MAX_CODE_POINT)
    {
        return true;
    }
    is_empty(&complement(a))
}

/// Accepts `s`.
pub fn run(a: &Automaton, s: &str) -> bool {
    a.run(s)
}
