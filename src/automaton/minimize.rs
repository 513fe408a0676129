//! DFA minimization.
//!
//! Two algorithms that must agree on state and transition counts:
//! - `minimize_hopcroft`: partition refinement over interval classes
//! - `minimize_brzozowski`: double reversal, kept as an independent oracle
//!
//! Both finish with `reduce` and dead-state removal, so the result is the
//! canonical minimal DFA: no dead sink, maximal ranges per target.

use super::arena::{StateArena, StateId, MAX_CODE_POINT};
use super::determinize::{determinize, determinize_with_limit};
use super::fa::Automaton;
use super::special::reverse;
use crate::config::{AutomatonConfig, Minimization};
use crate::Result;

/// Minimize in place with Hopcroft's algorithm and no state cap.
pub fn minimize(a: &mut Automaton) {
    if a.is_singleton() {
        return;
    }
    let mut work = a.clone();
    determinize(&mut work);
    *a = hopcroft(work);
}

/// Minimize according to `config`: algorithm choice and determinization cap.
pub fn minimize_with(a: &mut Automaton, config: &AutomatonConfig) -> Result<()> {
    match config.minimization {
        Minimization::Hopcroft => minimize_hopcroft(a, config.state_limit()),
        Minimization::Brzozowski => minimize_brzozowski(a, config.state_limit()),
    }
}

/// Hopcroft partition refinement.
///
/// Determinizes and totalizes first, refines `{accept}` / `{reject}` against
/// every interval class until stable, then rebuilds one state per block.
pub fn minimize_hopcroft(a: &mut Automaton, limit: Option<usize>) -> Result<()> {
    if a.is_singleton() {
        return Ok(());
    }
    let mut work = a.clone();
    determinize_with_limit(&mut work, limit)?;
    *a = hopcroft(work);
    Ok(())
}

/// Refine a deterministic automaton and rebuild one state per block.
fn hopcroft(mut dfa: Automaton) -> Automaton {
    dfa.totalize(MAX_CODE_POINT);
    let (arena, initial) = dfa.graph();
    let class = hopcroft_classes(&arena);
    let mut rebuilt = rebuild(&arena, initial, &class);
    rebuilt.remove_dead_transitions();
    rebuilt
}

/// Brzozowski: `determinize(reverse(determinize(reverse(a))))`.
pub fn minimize_brzozowski(a: &mut Automaton, limit: Option<usize>) -> Result<()> {
    if a.is_singleton() {
        return Ok(());
    }
    let mut once = reverse(a);
    determinize_with_limit(&mut once, limit)?;
    let mut twice = reverse(&once);
    determinize_with_limit(&mut twice, limit)?;
    twice.reduce();
    twice.remove_dead_transitions();
    *a = twice;
    Ok(())
}

/// Block index of every state after refinement. `arena` must be total and
/// deterministic.
fn hopcroft_classes(arena: &StateArena) -> Vec<u32> {
    let n = arena.len();
    let mut points: Vec<u32> = vec![0];
    for (_, state) in arena.iter() {
        for t in &state.transitions {
            points.push(t.min);
            if t.max < MAX_CODE_POINT {
                points.push(t.max + 1);
            }
        }
    }
    points.sort_unstable();
    points.dedup();
    let k = points.len();

    // inv[target * k + class] = states that step into `target` on `class`
    let mut inv: Vec<Vec<u32>> = vec![Vec::new(); n * k];
    for (id, state) in arena.iter() {
        for t in &state.transitions {
            let first = points.partition_point(|&p| p < t.min);
            for c in first..k {
                if points[c] > t.max {
                    break;
                }
                inv[t.to.index() * k + c].push(id.index() as u32);
            }
        }
    }

    let mut blocks: Vec<Vec<u32>> = Vec::new();
    let mut find: Vec<u32> = vec![0; n];
    let mut in_worklist: Vec<bool> = Vec::new();
    let mut worklist: Vec<u32> = Vec::new();

    let (accepting, rejecting): (Vec<u32>, Vec<u32>) =
        (0..n as u32).partition(|&s| arena[StateId::new(s as usize)].accept);
    for block in [accepting, rejecting] {
        if block.is_empty() {
            continue;
        }
        let id = blocks.len() as u32;
        for &s in &block {
            find[s as usize] = id;
        }
        blocks.push(block);
        in_worklist.push(true);
        worklist.push(id);
    }

    let mut marked = vec![false; n];
    let mut counts: Vec<usize> = vec![0; n];
    let mut touched: Vec<u32> = Vec::new();

    while let Some(splitter_id) = worklist.pop() {
        in_worklist[splitter_id as usize] = false;
        let splitter = blocks[splitter_id as usize].clone();

        for c in 0..k {
            touched.clear();
            for &j in &splitter {
                for &i in &inv[j as usize * k + c] {
                    if !marked[i as usize] {
                        marked[i as usize] = true;
                        let block = find[i as usize];
                        if counts[block as usize] == 0 {
                            touched.push(block);
                        }
                        counts[block as usize] += 1;
                    }
                }
            }

            for &block in &touched {
                let hit = std::mem::take(&mut counts[block as usize]);
                if hit == blocks[block as usize].len() {
                    continue;
                }
                let (inside, outside): (Vec<u32>, Vec<u32>) = blocks[block as usize]
                    .iter()
                    .partition(|&&s| marked[s as usize]);
                blocks[block as usize] = inside;
                let new_id = blocks.len() as u32;
                for &s in &outside {
                    find[s as usize] = new_id;
                }
                blocks.push(outside);
                in_worklist.push(false);

                // Only the smaller half needs to split further, unless the
                // old block was still pending.
                let keep_len = blocks[block as usize].len();
                let new_len = blocks[new_id as usize].len();
                let next = if in_worklist[block as usize] || new_len < keep_len {
                    new_id
                } else {
                    block
                };
                in_worklist[next as usize] = true;
                worklist.push(next);
            }

            for &j in &splitter {
                for &i in &inv[j as usize * k + c] {
                    marked[i as usize] = false;
                }
            }
        }
    }
    find
}

/// One state per block, transitions taken from each block's first member.
fn rebuild(arena: &StateArena, initial: StateId, class: &[u32]) -> Automaton {
    let count = class.iter().map(|&c| c as usize + 1).max().unwrap_or(1);
    let mut out = StateArena::with_capacity(count);
    for _ in 0..count {
        out.alloc();
    }
    let mut done = vec![false; count];
    for (id, state) in arena.iter() {
        let block = class[id.index()] as usize;
        if std::mem::replace(&mut done[block], true) {
            continue;
        }
        let target = StateId::new(block);
        out[target].accept = state.accept;
        for t in &state.transitions {
            out.add_transition(target, t.min, t.max, StateId::new(class[t.to.index()] as usize));
        }
    }
    let mut minimized = Automaton::with_graph(
        out,
        StateId::new(class[initial.index()] as usize),
        true,
    );
    minimized.reduce();
    minimized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::fa_builders::{
        make_any_string, make_char_range, make_empty, make_empty_string, make_string,
    };
    use crate::automaton::operations::{
        concatenate, optional, repeat, same_language, union, union_all,
    };

    fn both(a: &Automaton) -> (Automaton, Automaton) {
        let mut h = a.clone();
        minimize_hopcroft(&mut h, None).unwrap();
        let mut b = a.clone();
        minimize_brzozowski(&mut b, None).unwrap();
        (h, b)
    }

    fn assert_agree(a: &Automaton) {
        let (h, b) = both(a);
        assert_eq!(h.num_states(), b.num_states(), "state counts differ for\n{a}");
        assert_eq!(
            h.num_transitions(),
            b.num_transitions(),
            "transition counts differ for\n{a}"
        );
        assert!(same_language(&h, a));
        assert!(same_language(&b, a));
    }

    #[test]
    fn test_minimize_empty() {
        let mut a = make_empty();
        minimize(&mut a);
        assert_eq!(a.num_states(), 1);
        assert_eq!(a.num_transitions(), 0);
        assert_agree(&make_empty());
    }

    #[test]
    fn test_minimize_empty_string() {
        let mut a = optional(&make_empty()).clone_expanded();
        minimize(&mut a);
        assert_eq!(a.num_states(), 1);
        assert_eq!(a.num_transitions(), 0);
        assert!(a.run(""));
        assert!(make_empty_string().run(""));
    }

    #[test]
    fn test_minimize_merges_equivalent_suffixes() {
        // {ac, bc}: the two middle states are equivalent
        let a = union(&make_string("ac"), &make_string("bc"));
        let mut m = a.clone();
        minimize(&mut m);
        assert_eq!(m.num_states(), 3);
        assert_eq!(m.num_transitions(), 2, "a and b merge into one range");
        assert_agree(&a);
    }

    #[test]
    fn test_minimize_any_string() {
        let a = union(&make_any_string(), &make_string("abc"));
        let mut m = a.clone();
        minimize(&mut m);
        assert_eq!(m.num_states(), 1);
        assert_eq!(m.num_transitions(), 1);
        assert_agree(&a);
    }

    #[test]
    fn test_minimize_star_loop() {
        // (ab)* | (ab)*ab
        let ab = make_string("ab");
        let a = union(&repeat(&ab), &concatenate(&repeat(&ab), &ab));
        let mut m = a.clone();
        minimize(&mut m);
        assert_eq!(m.num_states(), 2);
        assert_agree(&a);
    }

    #[test]
    fn test_minimize_ranges() {
        let a = union_all(&[
            make_char_range('a' as u32, 'f' as u32).unwrap(),
            make_char_range('d' as u32, 'k' as u32).unwrap(),
            concatenate(&make_string("x"), &make_char_range('0' as u32, '9' as u32).unwrap()),
        ]);
        assert_agree(&a);
        let mut m = a.clone();
        minimize(&mut m);
        assert!(m.run("e"));
        assert!(m.run("x7"));
        assert!(!m.run("x"));
    }

    #[test]
    fn test_minimize_with_limit() {
        let a = union(&make_string("ab"), &make_string("ac"));
        let mut m = a.clone();
        let config = AutomatonConfig::default().with_minimization(Minimization::Brzozowski);
        minimize_with(&mut m, &config).unwrap();
        assert!(same_language(&m, &a));
    }

    #[test]
    fn test_minimize_matches_capped_hopcroft() {
        let a = union_all(&[
            repeat(&make_string("ab")),
            make_string("abc"),
            concatenate(&make_char_range('x' as u32, 'z' as u32).unwrap(), &make_any_string()),
        ]);
        let mut plain = a.clone();
        minimize(&mut plain);
        let mut capped = a.clone();
        minimize_hopcroft(&mut capped, Some(1_000)).unwrap();
        assert_eq!(plain.num_states(), capped.num_states());
        assert_eq!(plain.num_transitions(), capped.num_transitions());
        assert!(same_language(&plain, &a));

        let mut starved = a.clone();
        assert!(minimize_hopcroft(&mut starved, Some(1)).is_err());
    }

    #[test]
    fn test_minimize_singleton_untouched() {
        let mut a = make_string("hello");
        minimize(&mut a);
        assert!(a.is_singleton());
        assert_eq!(a.num_states(), 6);

        let mut expanded = make_string("hello").clone_expanded();
        minimize(&mut expanded);
        assert_eq!(expanded.num_states(), 6);
        assert_eq!(expanded.num_transitions(), 5);
    }
}
