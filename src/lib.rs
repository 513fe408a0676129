//! termfa: finite-state automata for term-dictionary queries
//!
//! Wildcard, regular-expression and fuzzy queries all become automata over
//! Unicode code points. This crate builds and combines them, determinizes
//! and minimizes the result, compiles it to UTF-8 bytes and wraps it in a
//! [`CompiledAutomaton`] that can run terms and seek a sorted dictionary:
//!
//! ```
//! use termfa::{wildcard_to_automaton, AutomatonKind, CompiledAutomaton};
//!
//! let compiled = CompiledAutomaton::new(&wildcard_to_automaton("fo?*")).unwrap();
//! assert_eq!(compiled.kind(), AutomatonKind::Normal);
//! assert!(compiled.run("foobar".as_bytes()));
//! assert!(!compiled.run("fo".as_bytes()));
//! ```
//!
//! Fuzzy matching goes through [`LevenshteinAutomata`]:
//!
//! ```
//! use termfa::LevenshteinAutomata;
//!
//! let lev = LevenshteinAutomata::new("kitten", true).to_automaton(2).unwrap();
//! assert!(!lev.run("sitting"));
//! assert!(lev.run("sittin"));
//! assert!(lev.run("iktten"));
//! ```

pub mod automaton;
pub mod config;
pub mod levenshtein;
pub mod wildcard;

use thiserror::Error;

pub use automaton::{Automaton, AutomatonKind, CompiledAutomaton};
pub use config::{AutomatonConfig, Minimization};
pub use levenshtein::{LevenshteinAutomata, MAXIMUM_SUPPORTED_DISTANCE};
pub use wildcard::wildcard_to_automaton;

/// Errors raised while building or compiling automata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    /// A structure that needs a DFA was handed an NFA.
    #[error("automaton is not deterministic")]
    NotDeterministic,

    /// Subset construction exceeded the configured state cap.
    #[error("determinization would exceed {limit} states")]
    TooComplex { limit: usize },

    /// A label above U+10FFFF.
    #[error("invalid code point {0:#x}")]
    InvalidCodePoint(u32),

    #[error("invalid range {min:#x}..={max:#x}")]
    InvalidRange { min: u32, max: u32 },

    #[error("edit distance {requested} exceeds the supported maximum {max}")]
    DistanceTooLarge { requested: u32, max: u32 },

    /// String-union input must be sorted by code point.
    #[error("input is not sorted")]
    UnsortedInput,

    #[error("input contains a duplicate")]
    DuplicateInput,

    #[error("term of {len} code points exceeds the maximum {max}")]
    TermTooLong { len: usize, max: usize },

    /// Floor-seek and unbounded enumeration need a finite language.
    #[error("language is infinite")]
    InfiniteLanguage,
}

/// A specialized `Result` type for automaton operations.
pub type Result<T> = std::result::Result<T, AutomatonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AutomatonError::TooComplex { limit: 10 }.to_string(),
            "determinization would exceed 10 states"
        );
        assert_eq!(
            AutomatonError::InvalidCodePoint(0x110000).to_string(),
            "invalid code point 0x110000"
        );
        assert_eq!(
            AutomatonError::DistanceTooLarge {
                requested: 4,
                max: 3
            }
            .to_string(),
            "edit distance 4 exceeds the supported maximum 3"
        );
    }

    #[test]
    fn test_pipeline() {
        let a = automaton::union(
            &wildcard_to_automaton("ab*"),
            &LevenshteinAutomata::new("xyz", false).to_automaton(1).unwrap(),
        );
        let compiled = CompiledAutomaton::new(&a).unwrap();
        let cases = [
            ("ab", true),
            ("abc", true),
            ("xz", true),
            ("xyzw", true),
            ("a", false),
            ("zzz", false),
        ];
        for (term, expected) in cases {
            assert_eq!(compiled.run(term.as_bytes()), expected, "{term}");
        }
    }
}
