//! The `Automaton` type: a literal fast path or an arena graph.
//!
//! Automata built from one string stay in the `Literal` form until an
//! operation needs states; [`Automaton::expand_singleton`] materializes the
//! linear chain on demand. Everything else is a `Graph` over a
//! [`StateArena`] with an explicit initial state.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

use super::arena::{StateArena, StateId, Transition, MAX_CODE_POINT};
use super::sparse_set::StepSets;
use super::{determinize, minimize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Repr {
    /// Accepts exactly one string, stored as labels.
    Literal(Vec<u32>),
    Graph {
        arena: StateArena,
        initial: StateId,
    },
}

/// A finite-state automaton over code points (or bytes, once compiled).
///
/// Operations in [`super::operations`] never mutate their inputs. The
/// in-place methods here (`determinize`, `minimize`, `reduce`, ...) are the
/// explicit finalization steps; clone first when the original is still
/// needed.
#[derive(Clone, Debug)]
pub struct Automaton {
    pub(crate) repr: Repr,
    pub(crate) deterministic: bool,
}

impl Automaton {
    /// The automaton accepting nothing: one non-accepting state.
    pub fn empty() -> Self {
        let mut arena = StateArena::with_capacity(1);
        let initial = arena.alloc();
        Self::with_graph(arena, initial, true)
    }

    /// The automaton accepting only "".
    pub fn empty_string() -> Self {
        Self::from_labels(Vec::new())
    }

    /// A literal automaton over raw labels.
    pub fn from_labels(labels: Vec<u32>) -> Self {
        Self {
            repr: Repr::Literal(labels),
            deterministic: true,
        }
    }

    /// Wrap a hand-built arena. Determinism is checked structurally.
    pub fn from_arena(arena: StateArena, initial: StateId) -> Self {
        let mut a = Self::with_graph(arena, initial, false);
        a.compact();
        a.deterministic = a.check_deterministic();
        a
    }

    pub(crate) fn with_graph(arena: StateArena, initial: StateId, deterministic: bool) -> Self {
        Self {
            repr: Repr::Graph { arena, initial },
            deterministic,
        }
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        matches!(self.repr, Repr::Literal(_))
    }

    /// The literal labels, while still in the singleton form.
    pub fn singleton(&self) -> Option<&[u32]> {
        match &self.repr {
            Repr::Literal(labels) => Some(labels),
            Repr::Graph { .. } => None,
        }
    }

    /// The literal as a string, when every label is a valid `char`.
    pub fn singleton_string(&self) -> Option<String> {
        self.singleton()?
            .iter()
            .map(|&cp| char::from_u32(cp))
            .collect()
    }

    #[inline]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub(crate) fn set_deterministic(&mut self, deterministic: bool) {
        self.deterministic = deterministic;
    }

    /// Initial state id. Literals expand with the initial state at 0.
    pub fn initial_state(&self) -> StateId {
        match &self.repr {
            Repr::Literal(_) => StateId::new(0),
            Repr::Graph { initial, .. } => *initial,
        }
    }

    /// Borrow the graph, expanding a literal into a temporary one.
    pub(crate) fn graph(&self) -> (Cow<'_, StateArena>, StateId) {
        match &self.repr {
            Repr::Literal(labels) => (Cow::Owned(literal_arena(labels)), StateId::new(0)),
            Repr::Graph { arena, initial } => (Cow::Borrowed(arena), *initial),
        }
    }

    /// Mutable graph access, materializing a literal first.
    pub(crate) fn graph_mut(&mut self) -> (&mut StateArena, StateId) {
        self.expand_singleton();
        match &mut self.repr {
            Repr::Graph { arena, initial } => (arena, *initial),
            Repr::Literal(_) => unreachable!("expand_singleton leaves a graph"),
        }
    }

    /// Replace a literal with its linear chain of states.
    pub fn expand_singleton(&mut self) {
        if let Repr::Literal(labels) = &self.repr {
            let arena = literal_arena(labels);
            self.repr = Repr::Graph {
                arena,
                initial: StateId::new(0),
            };
        }
    }

    /// Deep copy with the singleton form materialized.
    pub fn clone_expanded(&self) -> Automaton {
        let mut copy = self.clone();
        copy.expand_singleton();
        copy
    }

    /// Number of states reachable from the initial state.
    pub fn num_states(&self) -> usize {
        match &self.repr {
            Repr::Literal(labels) => labels.len() + 1,
            Repr::Graph { arena, initial } => reachable(arena, *initial).len(),
        }
    }

    /// Number of transitions leaving reachable states.
    pub fn num_transitions(&self) -> usize {
        match &self.repr {
            Repr::Literal(labels) => labels.len(),
            Repr::Graph { arena, initial } => reachable(arena, *initial)
                .iter()
                .map(|&id| arena[id].transitions.len())
                .sum(),
        }
    }

    /// Renumber reachable states in breadth-first order, initial first,
    /// dropping everything unreachable.
    pub fn compact(&mut self) {
        let Repr::Graph { arena, initial } = &mut self.repr else {
            return;
        };
        let order = reachable(arena, *initial);
        if order.len() == arena.len() && initial.index() == 0 && is_identity(&order) {
            return;
        }
        let mut remap = vec![StateId::NONE; arena.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.index()] = StateId::new(new);
        }
        let mut compacted = StateArena::with_capacity(order.len());
        for &old in &order {
            let id = compacted.alloc_with_accept(arena[old].accept);
            compacted[id].transitions = arena[old]
                .transitions
                .iter()
                .map(|t| Transition::new(t.min, t.max, remap[t.to.index()]))
                .collect();
        }
        *arena = compacted;
        *initial = StateId::new(0);
    }

    /// Ids of all reachable accepting states.
    pub fn accept_states(&self) -> Vec<StateId> {
        let (arena, initial) = self.graph();
        reachable(&arena, initial)
            .into_iter()
            .filter(|&id| arena[id].accept)
            .collect()
    }

    /// Reachable states from which some accepting state is reachable.
    pub fn live_states(&self) -> Vec<StateId> {
        let (arena, initial) = self.graph();
        let live = live_mask(&arena, initial);
        reachable(&arena, initial)
            .into_iter()
            .filter(|id| live[id.index()])
            .collect()
    }

    /// Sorted interval-class boundaries: every label at which some
    /// transition starts or stops, plus 0.
    pub fn start_points(&self) -> Vec<u32> {
        let (arena, initial) = self.graph();
        let mut points = vec![0];
        for id in reachable(&arena, initial) {
            for t in &arena[id].transitions {
                points.push(t.min);
                if t.max < MAX_CODE_POINT {
                    points.push(t.max + 1);
                }
            }
        }
        points.sort_unstable();
        points.dedup();
        points
    }

    /// Per-state transitions in canonical order, indexed by state id.
    pub fn sorted_transitions(&self) -> Vec<Vec<Transition>> {
        let (arena, _) = self.graph();
        arena
            .iter()
            .map(|(_, s)| {
                let mut ts = s.transitions.clone();
                ts.sort_unstable_by_key(|t| (t.min, t.max, t.to));
                ts
            })
            .collect()
    }

    /// Merge adjacent ranges with a shared target on every state.
    pub fn reduce(&mut self) {
        if let Repr::Graph { arena, .. } = &mut self.repr {
            for state in arena.states_mut() {
                state.reduce();
            }
        }
    }

    /// Drop states that cannot reach an accepting state, then compact and
    /// reduce. A dead initial state becomes the one-state empty form.
    pub fn remove_dead_transitions(&mut self) {
        let Repr::Graph { arena, initial } = &mut self.repr else {
            return;
        };
        let live = live_mask(arena, *initial);
        if !live[initial.index()] {
            *self = Automaton::empty();
            return;
        }
        for state in arena.states_mut() {
            state.transitions.retain(|t| live[t.to.index()]);
        }
        self.compact();
        self.reduce();
    }

    /// Add a dead sink so every state covers `[0, max_label]`.
    pub(crate) fn totalize(&mut self, max_label: u32) {
        let (arena, _) = self.graph_mut();
        let dead = arena.alloc();
        arena.add_transition(dead, 0, max_label, dead);
        let ids: Vec<StateId> = arena.ids().filter(|&id| id != dead).collect();
        for id in ids {
            let state = &mut arena[id];
            state.sort_transitions();
            let mut gaps = Vec::new();
            let mut next = 0u32;
            let mut covered_all = false;
            for t in &state.transitions {
                if t.min > next {
                    gaps.push(Transition::new(next, t.min - 1, dead));
                }
                if t.max >= max_label {
                    covered_all = true;
                    break;
                }
                next = next.max(t.max + 1);
            }
            if !covered_all {
                gaps.push(Transition::new(next, max_label, dead));
            }
            state.transitions.extend(gaps);
            state.sort_transitions();
        }
        self.compact();
    }

    /// Subset construction in place; see [`super::determinize`].
    pub fn determinize(&mut self) {
        determinize::determinize(self);
    }

    /// Replace with the minimal DFA (Hopcroft).
    pub fn minimize(&mut self) {
        minimize::minimize(self);
    }

    /// True iff no state has two overlapping outgoing ranges.
    pub fn check_deterministic(&self) -> bool {
        let (arena, initial) = self.graph();
        reachable(&arena, initial).into_iter().all(|id| {
            let mut ts = arena[id].transitions.clone();
            ts.sort_unstable_by_key(|t| (t.min, t.max));
            ts.windows(2).all(|w| w[0].max < w[1].min)
        })
    }

    /// Accepts `s`, walking its code points.
    pub fn run(&self, s: &str) -> bool {
        self.run_labels(s.chars().map(u32::from))
    }

    /// Accepts an explicit code-point (or byte) sequence.
    pub fn run_code_points(&self, labels: &[u32]) -> bool {
        self.run_labels(labels.iter().copied())
    }

    /// Accepts raw bytes; meant for byte-level automata.
    pub fn run_bytes(&self, bytes: &[u8]) -> bool {
        self.run_labels(bytes.iter().map(|&b| u32::from(b)))
    }

    pub(crate) fn run_labels<I>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = u32>,
    {
        match &self.repr {
            Repr::Literal(literal) => labels.into_iter().eq(literal.iter().copied()),
            Repr::Graph { arena, initial } if self.deterministic => {
                let mut state = *initial;
                for label in labels {
                    match arena[state].step(label) {
                        Some(next) => state = next,
                        None => return false,
                    }
                }
                arena[state].accept
            }
            Repr::Graph { arena, initial } => run_nfa(arena, *initial, labels),
        }
    }

    /// Graphviz rendering of the reachable graph.
    pub fn to_dot(&self) -> String {
        let (arena, initial) = self.graph();
        let order = reachable(&arena, initial);
        let mut out = String::from("digraph Automaton {\n  rankdir = LR;\n");
        out.push_str("  initial [shape=plaintext,label=\"\"];\n");
        out.push_str(&format!("  initial -> {}\n", initial));
        for &id in &order {
            let state = &arena[id];
            let shape = if state.accept { "doublecircle" } else { "circle" };
            out.push_str(&format!("  {id} [shape={shape},label=\"{id}\"];\n"));
            for t in &state.transitions {
                out.push_str(&format!(
                    "  {id} -> {} [label=\"{}\"]\n",
                    t.to,
                    format_range(t.min, t.max).replace('"', "\\\"")
                ));
            }
        }
        out.push_str("}\n");
        out
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Repr::Literal(labels) = &self.repr {
            write!(f, "singleton: ")?;
            for &label in labels {
                write!(f, "{}", format_label(label))?;
            }
            return writeln!(f);
        }
        let (arena, initial) = self.graph();
        writeln!(f, "initial state: {initial}")?;
        for id in reachable(&arena, initial) {
            let state = &arena[id];
            let accept = if state.accept { " [accept]" } else { " [reject]" };
            writeln!(f, "state {id}{accept}:")?;
            for t in &state.transitions {
                writeln!(f, "  {} -> {}", format_range(t.min, t.max), t.to)?;
            }
        }
        Ok(())
    }
}

fn format_label(label: u32) -> String {
    match char::from_u32(label) {
        Some(c) if c.is_ascii_graphic() => c.to_string(),
        _ => format!("\\u{{{label:x}}}"),
    }
}

fn format_range(min: u32, max: u32) -> String {
    if min == max {
        format_label(min)
    } else {
        format!("{}-{}", format_label(min), format_label(max))
    }
}

fn is_identity(order: &[StateId]) -> bool {
    order.iter().enumerate().all(|(i, id)| id.index() == i)
}

/// Linear chain accepting exactly `labels`.
pub(crate) fn literal_arena(labels: &[u32]) -> StateArena {
    let mut arena = StateArena::with_capacity(labels.len() + 1);
    let mut state = arena.alloc();
    for &label in labels {
        let next = arena.alloc();
        arena.add_transition(state, label, label, next);
        state = next;
    }
    arena[state].accept = true;
    arena
}

/// Breadth-first order of the states reachable from `initial`.
pub(crate) fn reachable(arena: &StateArena, initial: StateId) -> Vec<StateId> {
    let mut seen = vec![false; arena.len()];
    let mut order = Vec::with_capacity(arena.len());
    let mut queue = VecDeque::new();
    seen[initial.index()] = true;
    queue.push_back(initial);
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for t in &arena[id].transitions {
            if !seen[t.to.index()] {
                seen[t.to.index()] = true;
                queue.push_back(t.to);
            }
        }
    }
    order
}

/// `live[i]` is true iff state `i` is reachable and reaches an accept state.
pub(crate) fn live_mask(arena: &StateArena, initial: StateId) -> Vec<bool> {
    let order = reachable(arena, initial);
    let mut incoming: Vec<Vec<StateId>> = vec![Vec::new(); arena.len()];
    for &id in &order {
        for t in &arena[id].transitions {
            incoming[t.to.index()].push(id);
        }
    }
    let mut live = vec![false; arena.len()];
    let mut stack: Vec<StateId> = order
        .iter()
        .copied()
        .filter(|&id| arena[id].accept)
        .collect();
    for id in &stack {
        live[id.index()] = true;
    }
    while let Some(id) = stack.pop() {
        for &from in &incoming[id.index()] {
            if !live[from.index()] {
                live[from.index()] = true;
                stack.push(from);
            }
        }
    }
    live
}

fn run_nfa<I>(arena: &StateArena, initial: StateId, labels: I) -> bool
where
    I: IntoIterator<Item = u32>,
{
    let mut sets = StepSets::new(arena.len(), initial);
    let mut targets = Vec::new();
    for label in labels {
        for id in sets.current.iter() {
            targets.clear();
            arena[id].step_all(label, &mut targets);
            for &to in &targets {
                sets.next.insert(to);
            }
        }
        sets.advance();
        if sets.current.is_empty() {
            return false;
        }
    }
    let accepted = sets.current.iter().any(|id| arena[id].accept);
    accepted
}
