//! Finite-state automata over Unicode code points and UTF-8 bytes.
//!
//! The data flow of a pattern query runs through this module top to bottom:
//! primitive builders, algebra, determinization, minimization, UTF-8
//! compilation and finally a `CompiledAutomaton` for the term dictionary.
//!
//! # Module Organization
//!
//! - `arena`: `StateArena`, `State`, `Transition` and `StateId`
//! - `fa`: the `Automaton` type (literal fast path or arena graph)
//! - `fa_builders`: primitive constructors (`make_*`)
//! - `operations`: concatenation, union, repetition, complement, product
//!   construction and language comparisons
//! - `determinize`: subset construction with an optional state cap
//! - `minimize`: Hopcroft and Brzozowski minimization
//! - `special`: reversal, finiteness, enumeration, common affixes
//! - `utf8`: code-point to UTF-8 byte compilation
//! - `run_automaton`: dense transition tables for fast execution
//! - `compiled`: `CompiledAutomaton` with classification and floor-seek
//! - `string_union`: minimal DFA straight from a sorted word list
//! - `sparse_set`: state sets for NFA simulation

mod arena;
mod compiled;
mod determinize;
mod fa;
mod fa_builders;
mod minimize;
mod operations;
mod run_automaton;
mod sparse_set;
mod special;
mod string_union;
mod utf8;

// Re-export from arena
pub use arena::{State, StateArena, StateId, Transition, MAX_BYTE, MAX_CODE_POINT};

// Re-export from fa
pub use fa::Automaton;

// Re-export from fa_builders
pub use fa_builders::{
    make_any_char, make_any_string, make_char, make_char_range, make_code_points, make_empty,
    make_empty_string, make_prefix, make_string, make_string_union,
};

// Re-export from operations
pub use operations::{
    complement, concatenate, concatenate_all, intersection, is_empty, is_empty_string, is_total,
    minus, optional, repeat, repeat_min, repeat_range, run, same_language, subset_of, union,
    union_all,
};

// Re-export from determinize and minimize
pub use determinize::{determinize, determinize_with_limit};
pub use minimize::{minimize, minimize_brzozowski, minimize_hopcroft, minimize_with};

// Re-export from special
pub use special::{common_prefix, common_suffix, finite_strings, is_finite, reverse};

// Re-export from utf8
pub use utf8::utf32_to_utf8;

// Re-export from run_automaton and compiled
pub use compiled::{AutomatonKind, CompiledAutomaton};
pub use run_automaton::{ByteRunAutomaton, CharRunAutomaton, RunAutomaton};

pub use string_union::MAX_TERM_LENGTH;
