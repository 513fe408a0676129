//! Finalized automata for term-dictionary access.
//!
//! A `CompiledAutomaton` is built once per query and then shared read-only
//! across searcher threads. Nothing inside it is mutated after
//! construction, so it is `Send + Sync` without locks:
//!
//! - `MatchesNone` / `MatchesAll` / `MatchesOneString` short-circuit the
//!   term dictionary entirely
//! - `Normal` carries the minimal UTF-8 DFA, its run table and per-state
//!   sorted transitions for seeking

use super::arena::Transition;
use super::fa::Automaton;
use super::minimize::minimize_with;
use super::operations::{is_empty, is_total};
use super::run_automaton::ByteRunAutomaton;
use super::special::{common_suffix, finite_strings, is_finite};
use super::utf8::utf32_to_utf8;
use crate::config::AutomatonConfig;
use crate::{AutomatonError, Result};

/// Coarse shape of a compiled automaton's language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutomatonKind {
    /// Accepts nothing.
    MatchesNone,
    /// Accepts every string.
    MatchesAll,
    /// Accepts exactly [`CompiledAutomaton::term`].
    MatchesOneString,
    /// Anything else; use the run table.
    Normal,
}

/// A deterministic, minimal, byte-level automaton ready for matching and
/// floor-seeking against UTF-8 terms.
#[derive(Clone, Debug)]
pub struct CompiledAutomaton {
    kind: AutomatonKind,
    term: Option<Vec<u8>>,
    finite: bool,
    utf8: Option<Automaton>,
    run_automaton: Option<ByteRunAutomaton>,
    sorted_transitions: Vec<Vec<Transition>>,
    common_suffix: Vec<u8>,
}

impl CompiledAutomaton {
    /// Compile `a` with the default configuration.
    pub fn new(a: &Automaton) -> Result<Self> {
        Self::with_config(a, &AutomatonConfig::default())
    }

    pub fn with_config(a: &Automaton, config: &AutomatonConfig) -> Result<Self> {
        let mut minimal = a.clone();
        minimize_with(&mut minimal, config)?;

        if config.simplify {
            if is_empty(&minimal) {
                return Ok(Self::simple(AutomatonKind::MatchesNone, None, true));
            }
            if is_total(&minimal) {
                return Ok(Self::simple(AutomatonKind::MatchesAll, None, false));
            }
            if let Some(labels) = single_string(&minimal)? {
                // A lone string that is not valid text can never match a term.
                return Ok(match encode_term(&labels) {
                    Some(term) => Self::simple(AutomatonKind::MatchesOneString, Some(term), true),
                    None => Self::simple(AutomatonKind::MatchesNone, None, true),
                });
            }
        }

        let finite = is_finite(&minimal);
        let mut utf8 = utf32_to_utf8(&minimal)?;
        minimize_with(&mut utf8, config)?;
        utf8.expand_singleton();
        utf8.compact();

        let common_suffix = if finite {
            Vec::new()
        } else {
            common_suffix(&utf8).into_iter().map(|b| b as u8).collect()
        };
        let run_automaton = ByteRunAutomaton::new(&utf8)?;
        let sorted_transitions = utf8.sorted_transitions();

        Ok(Self {
            kind: AutomatonKind::Normal,
            term: None,
            finite,
            utf8: Some(utf8),
            run_automaton: Some(run_automaton),
            sorted_transitions,
            common_suffix,
        })
    }

    fn simple(kind: AutomatonKind, term: Option<Vec<u8>>, finite: bool) -> Self {
        Self {
            kind,
            term,
            finite,
            utf8: None,
            run_automaton: None,
            sorted_transitions: Vec::new(),
            common_suffix: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> AutomatonKind {
        self.kind
    }

    /// The single accepted term, for `MatchesOneString`.
    pub fn term(&self) -> Option<&[u8]> {
        self.term.as_deref()
    }

    /// True iff the language is finite.
    #[inline]
    pub fn finite(&self) -> bool {
        self.finite
    }

    /// Bytes every accepted term ends with. Only computed for infinite
    /// `Normal` languages; empty otherwise.
    pub fn common_suffix(&self) -> &[u8] {
        &self.common_suffix
    }

    /// The minimal UTF-8 DFA, for `Normal`.
    pub fn automaton(&self) -> Option<&Automaton> {
        self.utf8.as_ref()
    }

    pub fn run_automaton(&self) -> Option<&ByteRunAutomaton> {
        self.run_automaton.as_ref()
    }

    /// Per-state transitions of the UTF-8 DFA sorted by label, indexed like
    /// the run table's states. Empty unless `Normal`.
    pub fn sorted_transitions(&self) -> &[Vec<Transition>] {
        &self.sorted_transitions
    }

    /// Accepts the UTF-8 encoded `term`.
    pub fn run(&self, term: &[u8]) -> bool {
        match self.kind {
            AutomatonKind::MatchesNone => false,
            AutomatonKind::MatchesAll => true,
            AutomatonKind::MatchesOneString => self.term.as_deref() == Some(term),
            AutomatonKind::Normal => self
                .run_automaton
                .as_ref()
                .is_some_and(|run| run.run(term)),
        }
    }

    pub fn run_str(&self, term: &str) -> bool {
        self.run(term.as_bytes())
    }

    /// Greatest accepted term that sorts at or before `input`, or `None`
    /// when every accepted term sorts after it.
    ///
    /// Terms compare as unsigned bytes. Infinite `Normal` languages have no
    /// well-defined enumeration to seek in and return `InfiniteLanguage`.
    pub fn floor(&self, input: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.kind {
            AutomatonKind::MatchesNone => Ok(None),
            AutomatonKind::MatchesAll => Ok(Some(input.to_vec())),
            AutomatonKind::MatchesOneString => Ok(self
                .term
                .as_ref()
                .filter(|term| term.as_slice() <= input)
                .cloned()),
            AutomatonKind::Normal if !self.finite => Err(AutomatonError::InfiniteLanguage),
            AutomatonKind::Normal => Ok(self.floor_normal(input)),
        }
    }

    fn floor_normal(&self, input: &[u8]) -> Option<Vec<u8>> {
        let run = self.run_automaton.as_ref()?;

        // states[i] is the state after input[..i]
        let mut states = vec![run.initial()];
        for &b in input {
            match states.last().and_then(|&s| run.step(s, u32::from(b))) {
                Some(next) => states.push(next),
                None => break,
            }
        }
        let matched = states.len() - 1;
        if matched == input.len() && run.is_accept(states[matched]) {
            return Some(input.to_vec());
        }

        for depth in (0..=matched).rev() {
            // Any extension of the whole input sorts after it.
            if depth == input.len() {
                continue;
            }
            let state = states[depth];
            let limit = u32::from(input[depth]);
            // Diverging below input[depth] beats stopping at the prefix.
            if let Some(t) = self.sorted_transitions[state].iter().rev().find(|t| t.min < limit) {
                let mut out = input[..depth].to_vec();
                out.push(t.max.min(limit - 1) as u8);
                self.push_greatest(t.to.index(), &mut out);
                return Some(out);
            }
            if run.is_accept(state) {
                return Some(input[..depth].to_vec());
            }
        }
        None
    }

    /// Append the greatest string accepted from `state`. Every state is live
    /// and the language finite, so always taking the largest label ends on
    /// an accepting leaf.
    fn push_greatest(&self, mut state: usize, out: &mut Vec<u8>) {
        while let Some(t) = self.sorted_transitions[state].last() {
            out.push(t.max as u8);
            state = t.to.index();
        }
    }
}

/// The one accepted string of `a`, if it accepts exactly one.
fn single_string(a: &Automaton) -> Result<Option<Vec<u32>>> {
    if let Some(labels) = a.singleton() {
        return Ok(Some(labels.to_vec()));
    }
    if !is_finite(a) {
        return Ok(None);
    }
    let mut found = finite_strings(a, Some(2))?;
    Ok(if found.len() == 1 { found.pop() } else { None })
}

fn encode_term(labels: &[u32]) -> Option<Vec<u8>> {
    let text: String = labels
        .iter()
        .map(|&cp| char::from_u32(cp))
        .collect::<Option<String>>()?;
    Some(text.into_bytes())
}
