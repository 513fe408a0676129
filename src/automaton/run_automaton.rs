//! Dense table-driven execution of a deterministic automaton.
//!
//! The label space is cut into interval classes at the automaton's start
//! points; the table then has one row per state and one column per class:
//!
//! ```text
//! points:      [0,   'a', 'c', 'g']
//! state 0 row: [-,   1,   1,   -  ]
//! state 1 row: [-,   -,   1,   1  ]
//! ```
//!
//! Byte-level tables also keep a 256-entry class map so a step is two array
//! reads.

use std::ops::Deref;

use super::arena::{MAX_BYTE, MAX_CODE_POINT};
use super::fa::Automaton;
use super::utf8::utf32_to_utf8;
use crate::{AutomatonError, Result};

/// Marks a missing transition in the table.
const NO_STATE: u32 = u32::MAX;

/// Table form of a DFA over an alphabet `0..=max_label`.
#[derive(Clone, Debug)]
pub struct RunAutomaton {
    max_label: u32,
    initial: u32,
    accept: Vec<bool>,
    /// Sorted class start labels; `points[0] == 0`.
    points: Vec<u32>,
    /// `transitions[state * points.len() + class]`
    transitions: Vec<u32>,
    classmap: Option<Box<[u32; 256]>>,
}

impl RunAutomaton {
    /// Build the table. `a` must be deterministic and use labels no larger
    /// than `max_label`.
    pub fn new(a: &Automaton, max_label: u32) -> Result<Self> {
        if !a.is_deterministic() {
            return Err(AutomatonError::NotDeterministic);
        }
        let mut compacted = a.clone_expanded();
        compacted.compact();
        let points: Vec<u32> = compacted
            .start_points()
            .into_iter()
            .filter(|&p| p <= max_label)
            .collect();
        let (arena, initial) = compacted.graph();
        let size = arena.len();
        let k = points.len();

        let mut accept = Vec::with_capacity(size);
        let mut transitions = vec![NO_STATE; size * k];
        for (id, state) in arena.iter() {
            accept.push(state.accept);
            for t in &state.transitions {
                if t.min > max_label {
                    continue;
                }
                let first = points.partition_point(|&p| p < t.min);
                for class in first..k {
                    if points[class] > t.max {
                        break;
                    }
                    transitions[id.index() * k + class] = t.to.index() as u32;
                }
            }
        }

        let classmap = (max_label <= MAX_BYTE).then(|| {
            let mut map = Box::new([0u32; 256]);
            let mut class = 0usize;
            for (label, slot) in map.iter_mut().enumerate() {
                while class + 1 < k && points[class + 1] as usize <= label {
                    class += 1;
                }
                *slot = class as u32;
            }
            map
        });

        Ok(Self {
            max_label,
            initial: initial.index() as u32,
            accept,
            points,
            transitions,
            classmap,
        })
    }

    #[inline]
    pub fn initial(&self) -> usize {
        self.initial as usize
    }

    /// Number of states.
    #[inline]
    pub fn size(&self) -> usize {
        self.accept.len()
    }

    #[inline]
    pub fn is_accept(&self, state: usize) -> bool {
        self.accept[state]
    }

    /// Class start labels.
    pub fn char_intervals(&self) -> &[u32] {
        &self.points
    }

    #[inline]
    fn class_of(&self, label: u32) -> usize {
        match &self.classmap {
            Some(map) if label <= MAX_BYTE => map[label as usize] as usize,
            _ => self.points.partition_point(|&p| p <= label) - 1,
        }
    }

    /// Destination of `state` on `label`, if any.
    #[inline]
    pub fn step(&self, state: usize, label: u32) -> Option<usize> {
        if label > self.max_label {
            return None;
        }
        let next = self.transitions[state * self.points.len() + self.class_of(label)];
        (next != NO_STATE).then_some(next as usize)
    }

    /// Run from the initial state over `labels`.
    pub fn run_labels<I>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = u32>,
    {
        let mut state = self.initial();
        for label in labels {
            match self.step(state, label) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accept(state)
    }
}

/// Run table over UTF-8 bytes.
#[derive(Clone, Debug)]
pub struct ByteRunAutomaton(RunAutomaton);

impl ByteRunAutomaton {
    /// Wrap an automaton that is already byte-level and deterministic.
    pub fn new(utf8: &Automaton) -> Result<Self> {
        RunAutomaton::new(utf8, MAX_BYTE).map(Self)
    }

    /// Compile a code-point automaton to UTF-8, determinize, and tabulate.
    pub fn from_code_points(a: &Automaton) -> Result<Self> {
        let mut utf8 = utf32_to_utf8(a)?;
        utf8.determinize();
        Self::new(&utf8)
    }

    pub fn run(&self, bytes: &[u8]) -> bool {
        self.0.run_labels(bytes.iter().map(|&b| u32::from(b)))
    }
}

impl Deref for ByteRunAutomaton {
    type Target = RunAutomaton;

    fn deref(&self) -> &RunAutomaton {
        &self.0
    }
}

/// Run table over code points.
#[derive(Clone, Debug)]
pub struct CharRunAutomaton(RunAutomaton);

impl CharRunAutomaton {
    pub fn new(a: &Automaton) -> Result<Self> {
        RunAutomaton::new(a, MAX_CODE_POINT).map(Self)
    }

    pub fn run(&self, s: &str) -> bool {
        self.0.run_labels(s.chars().map(u32::from))
    }

    pub fn run_code_points(&self, labels: &[u32]) -> bool {
        self.0.run_labels(labels.iter().copied())
    }
}

impl Deref for CharRunAutomaton {
    type Target = RunAutomaton;

    fn deref(&self) -> &RunAutomaton {
        &self.0
    }
}
