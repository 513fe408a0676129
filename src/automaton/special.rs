//! Operations on the shape of a language rather than its algebra:
//! reversal, finiteness, enumeration and common affixes.

use rustc_hash::FxHashSet;

use super::arena::{StateArena, StateId};
use super::determinize::determinize;
use super::fa::{live_mask, reachable, Automaton};
use crate::{AutomatonError, Result};

/// Accepts the reverse of every string of `a`.
pub fn reverse(a: &Automaton) -> Automaton {
    if let Some(labels) = a.singleton() {
        return Automaton::from_labels(labels.iter().rev().copied().collect());
    }
    let (graph, initial) = a.graph();
    let order = reachable(&graph, initial);
    let mut arena = StateArena::with_capacity(graph.len() + 1);
    for _ in 0..graph.len() {
        arena.alloc();
    }
    for &id in &order {
        for t in &graph[id].transitions {
            arena.add_transition(t.to, t.min, t.max, id);
        }
    }
    arena[initial].accept = true;
    let start = arena.alloc();
    for &id in &order {
        if graph[id].accept {
            arena.add_epsilon(start, id);
        }
    }
    let mut out = Automaton::with_graph(arena, start, false);
    out.compact();
    out
}

/// True iff `a` accepts finitely many strings: no live state lies on a
/// cycle.
pub fn is_finite(a: &Automaton) -> bool {
    if a.is_singleton() {
        return true;
    }
    let (graph, initial) = a.graph();
    let live = live_mask(&graph, initial);
    if !live[initial.index()] {
        return true;
    }
    // 0 = unvisited, 1 = on the DFS path, 2 = finished
    let mut color = vec![0u8; graph.len()];
    let mut stack: Vec<(StateId, usize)> = vec![(initial, 0)];
    color[initial.index()] = 1;
    while let Some((id, next)) = stack.pop() {
        let transitions = &graph[id].transitions;
        match transitions[next..].iter().position(|t| live[t.to.index()]) {
            Some(offset) => {
                let pos = next + offset;
                stack.push((id, pos + 1));
                let to = transitions[pos].to;
                match color[to.index()] {
                    1 => return false,
                    0 => {
                        color[to.index()] = 1;
                        stack.push((to, 0));
                    }
                    _ => {}
                }
            }
            None => color[id.index()] = 2,
        }
    }
    true
}

/// Every accepted string, in lexicographic label order.
///
/// Enumeration stops after `limit` strings when a limit is given. An
/// infinite language is an error either way.
pub fn finite_strings(a: &Automaton, limit: Option<usize>) -> Result<Vec<Vec<u32>>> {
    if let Some(labels) = a.singleton() {
        return Ok(if limit == Some(0) {
            Vec::new()
        } else {
            vec![labels.to_vec()]
        });
    }
    if !is_finite(a) {
        return Err(AutomatonError::InfiniteLanguage);
    }
    let mut dfa = a.clone();
    determinize(&mut dfa);
    dfa.remove_dead_transitions();
    let (graph, initial) = dfa.graph();
    let sorted = dfa.sorted_transitions();
    let limit = limit.unwrap_or(usize::MAX);

    let mut out = Vec::new();
    let mut path: Vec<u32> = Vec::new();
    if limit > 0 && graph[initial].accept {
        out.push(Vec::new());
    }
    // (state, transition index, next label within that transition)
    let mut stack: Vec<(StateId, usize, u32)> = vec![(initial, 0, 0)];
    while let Some(frame) = stack.last_mut() {
        if out.len() >= limit {
            break;
        }
        let (id, ti, label) = *frame;
        let ts = &sorted[id.index()];
        if ti >= ts.len() {
            stack.pop();
            path.pop();
            continue;
        }
        let t = ts[ti];
        let current = label.max(t.min);
        if current >= t.max {
            *frame = (id, ti + 1, 0);
        } else {
            *frame = (id, ti, current + 1);
        }
        path.push(current);
        if graph[t.to].accept {
            out.push(path.clone());
        }
        stack.push((t.to, 0, 0));
    }
    Ok(out)
}

/// Longest string every accepted string starts with.
pub fn common_prefix(a: &Automaton) -> Vec<u32> {
    if let Some(labels) = a.singleton() {
        return labels.to_vec();
    }
    let mut dfa = a.clone();
    determinize(&mut dfa);
    dfa.remove_dead_transitions();
    let (graph, initial) = dfa.graph();
    let mut visited = FxHashSet::default();
    let mut prefix = Vec::new();
    let mut state = initial;
    while !graph[state].accept && graph[state].transitions.len() == 1 && visited.insert(state) {
        let t = graph[state].transitions[0];
        if t.min != t.max {
            break;
        }
        prefix.push(t.min);
        state = t.to;
    }
    prefix
}

/// Longest string every accepted string ends with.
pub fn common_suffix(a: &Automaton) -> Vec<u32> {
    let mut suffix = common_prefix(&reverse(a));
    suffix.reverse();
    suffix
}
