//! Arena-based state allocation for cyclic automata.
//!
//! States live contiguously in a `Vec` and refer to each other through
//! `StateId` indices, so `*` loops and other back edges never need shared
//! ownership.
//!
//! ## Example: [a-z]* with a true cycle
//!
//! ```text
//! s0 (accept) --[a-z]--> s0
//! ```
//!
//! One state, one transition. Combining automata copies arenas into a fresh
//! one with shifted ids (see [`StateArena::append`]), so no two automata ever
//! alias each other's states.

use std::fmt;

/// Largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Largest label of a byte-level automaton.
pub const MAX_BYTE: u32 = 0xFF;

/// Index of a state inside a `StateArena`.
///
/// Ids are `Copy`, so loops and back edges need no shared ownership.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(u32);

impl StateId {
    /// Sentinel for a missing target.
    pub const NONE: StateId = StateId(u32::MAX);

    #[inline]
    pub const fn new(index: usize) -> Self {
        StateId(index as u32)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inclusive label range `[min, max]` leading to `to`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Transition {
    pub min: u32,
    pub max: u32,
    pub to: StateId,
}

impl Transition {
    #[inline]
    pub fn new(min: u32, max: u32, to: StateId) -> Self {
        debug_assert!(min <= max, "inverted transition range {min}..={max}");
        Self { min, max, to }
    }

    #[inline]
    pub fn single(label: u32, to: StateId) -> Self {
        Self::new(label, label, to)
    }

    #[inline]
    pub fn contains(&self, label: u32) -> bool {
        self.min <= label && label <= self.max
    }
}

/// A state in the arena: an accept flag plus its outgoing transitions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
    pub accept: bool,
    pub transitions: Vec<Transition>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting() -> Self {
        Self {
            accept: true,
            transitions: Vec::new(),
        }
    }

    /// First transition covering `label`, assuming at most one does.
    #[inline]
    pub fn step(&self, label: u32) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|t| t.contains(label))
            .map(|t| t.to)
    }

    /// Push every target reachable on `label` into `out`.
    #[inline]
    pub fn step_all(&self, label: u32, out: &mut Vec<StateId>) {
        out.extend(
            self.transitions
                .iter()
                .filter(|t| t.contains(label))
                .map(|t| t.to),
        );
    }

    /// Sort by `(min, max, to)`, the canonical order.
    pub fn sort_transitions(&mut self) {
        self.transitions
            .sort_unstable_by_key(|t| (t.min, t.max, t.to));
    }

    /// Merge overlapping or adjacent ranges that lead to the same target,
    /// then restore canonical order.
    pub fn reduce(&mut self) {
        if self.transitions.len() <= 1 {
            return;
        }
        self.transitions
            .sort_unstable_by_key(|t| (t.to, t.min, t.max));
        let mut merged: Vec<Transition> = Vec::with_capacity(self.transitions.len());
        for t in self.transitions.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.to == t.to && t.min <= last.max.saturating_add(1) {
                    last.max = last.max.max(t.max);
                    continue;
                }
            }
            merged.push(t);
        }
        self.transitions = merged;
        self.sort_transitions();
    }
}

/// Arena owning every state of one automaton.
///
/// States live in one vector and refer to each other by `StateId`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StateArena {
    states: Vec<State>,
}

impl fmt::Debug for StateArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateArena")
            .field("states_count", &self.states.len())
            .field("transitions_count", &self.num_transitions())
            .finish()
    }
}

impl StateArena {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a new non-accepting state, returning its ID.
    pub fn alloc(&mut self) -> StateId {
        let id = StateId::new(self.states.len());
        self.states.push(State::default());
        id
    }

    /// Allocate a new state with the given accept flag.
    pub fn alloc_with_accept(&mut self, accept: bool) -> StateId {
        let id = self.alloc();
        self.states[id.index()].accept = accept;
        id
    }

    /// The state behind `id`, or `None` for the sentinel or an id past the end.
    #[inline]
    pub fn get(&self, id: StateId) -> Option<&State> {
        if id.is_none() {
            None
        } else {
            self.states.get(id.index())
        }
    }

    /// Mutable access to `id`, or `None` for the sentinel or an id past the end.
    #[inline]
    pub fn get_mut(&mut self, id: StateId) -> Option<&mut State> {
        if id.is_none() {
            None
        } else {
            self.states.get_mut(id.index())
        }
    }

    /// Allocated state count, reachable or not.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no state has been allocated.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    #[inline]
    pub fn add_transition(&mut self, from: StateId, min: u32, max: u32, to: StateId) {
        self.states[from.index()]
            .transitions
            .push(Transition::new(min, max, to));
    }

    /// Checked `add_transition` for ranges that come from callers.
    pub fn try_add_transition(
        &mut self,
        from: StateId,
        min: u32,
        max: u32,
        to: StateId,
    ) -> crate::Result<()> {
        if min > max {
            return Err(crate::AutomatonError::InvalidRange { min, max });
        }
        if max > MAX_CODE_POINT {
            return Err(crate::AutomatonError::InvalidCodePoint(max));
        }
        self.add_transition(from, min, max, to);
        Ok(())
    }

    /// Emulate an epsilon edge `from -> to` by copying `to`'s transitions
    /// and accept flag onto `from`.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        if from == to {
            return;
        }
        let (accept, copied) = {
            let target = &self.states[to.index()];
            (target.accept, target.transitions.clone())
        };
        let source = &mut self.states[from.index()];
        source.accept |= accept;
        source.transitions.extend(copied);
    }

    /// Copy every state of `other` into this arena, returning the offset
    /// that maps an id of `other` to its id here.
    pub fn append(&mut self, other: &StateArena) -> u32 {
        let offset = self.states.len() as u32;
        self.states.extend(other.states.iter().map(|s| State {
            accept: s.accept,
            transitions: s
                .transitions
                .iter()
                .map(|t| Transition::new(t.min, t.max, StateId(t.to.0 + offset)))
                .collect(),
        }));
        offset
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &State)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId::new(i), s))
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId::new)
    }

    pub fn states_mut(&mut self) -> impl Iterator<Item = &mut State> + '_ {
        self.states.iter_mut()
    }
}

impl std::ops::Index<StateId> for StateArena {
    type Output = State;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        &self.states[id.index()]
    }
}

impl std::ops::IndexMut<StateId> for StateArena {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut Self::Output {
        &mut self.states[id.index()]
    }
}
