//! State sets for stepping an NFA one label at a time.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! Clearing is a length reset and iteration follows insertion order, so a
//! simulation visits states in a stable order without hashing.

use super::arena::StateId;

/// Set of `StateId`s below a fixed capacity.
#[derive(Clone, Debug)]
pub struct SparseSet {
    len: usize,
    // Members in insertion order; only the first `len` slots are live.
    members: Vec<StateId>,
    // position[id] indexes `members` when id is present.
    position: Vec<usize>,
}

impl SparseSet {
    pub fn new(capacity: usize) -> Self {
        SparseSet {
            len: 0,
            members: vec![StateId::NONE; capacity],
            position: vec![0; capacity],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add `id`, returning false if it was already present.
    ///
    /// Panics if `id` is not below the capacity.
    #[inline]
    pub fn insert(&mut self, id: StateId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.members[self.len] = id;
        self.position[id.index()] = self.len;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        let at = self.position[id.index()];
        at < self.len && self.members[at] == id
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.members[..self.len].iter().copied()
    }
}

/// The active states before and after one label.
#[derive(Clone, Debug)]
pub struct StepSets {
    pub current: SparseSet,
    pub next: SparseSet,
}

impl StepSets {
    pub fn new(capacity: usize, initial: StateId) -> Self {
        let mut current = SparseSet::new(capacity);
        current.insert(initial);
        StepSets {
            current,
            next: SparseSet::new(capacity),
        }
    }

    /// Make `next` current and empty the other set for the following step.
    #[inline]
    pub fn advance(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();
    }
}
