//! Property tests for the automaton algebra.
//!
//! Random regular expressions over a tiny alphabet are built with the
//! public constructors; every law is checked both through
//! `same_language` and by running sample strings. UTF-8 compilation gets
//! its own expressions whose ranges span every encoded length.

use proptest::prelude::*;
use termfa::automaton::{
    complement, concatenate, finite_strings, intersection, is_empty, make_any_char,
    make_char_range, make_empty_string, make_string, make_string_union, minimize_brzozowski,
    minimize_hopcroft, minus, optional, repeat, repeat_range, reverse, same_language, union,
    union_all, utf32_to_utf8, Automaton, ByteRunAutomaton,
};
use termfa::{CompiledAutomaton, LevenshteinAutomata};

#[derive(Debug, Clone)]
enum Expr {
    Word(String),
    Range(u32, u32),
    Any,
    Union(Box<Expr>, Box<Expr>),
    Concat(Box<Expr>, Box<Expr>),
    Star(Box<Expr>),
    Optional(Box<Expr>),
}

impl Expr {
    fn build(&self) -> Automaton {
        match self {
            Expr::Word(w) => make_string(w),
            Expr::Range(lo, hi) => make_char_range(*lo, *hi).unwrap(),
            Expr::Any => make_any_char(),
            Expr::Union(a, b) => union(&a.build(), &b.build()),
            Expr::Concat(a, b) => concatenate(&a.build(), &b.build()),
            Expr::Star(a) => repeat(&a.build()),
            Expr::Optional(a) => optional(&a.build()),
        }
    }

    /// Valid characters sitting on some range boundary.
    fn boundary_chars(&self, out: &mut Vec<char>) {
        match self {
            Expr::Range(lo, hi) => {
                out.extend([*lo, *hi].into_iter().filter_map(char::from_u32));
            }
            Expr::Union(a, b) | Expr::Concat(a, b) => {
                a.boundary_chars(out);
                b.boundary_chars(out);
            }
            Expr::Star(a) | Expr::Optional(a) => a.boundary_chars(out),
            Expr::Word(_) | Expr::Any => {}
        }
    }
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        "[abc]{0,3}".prop_map(Expr::Word),
        (0u8..3, 0u8..3).prop_map(|(x, y)| {
            let (lo, hi) = (x.min(y), x.max(y));
            Expr::Range(u32::from(b'a' + lo), u32::from(b'a' + hi))
        }),
        Just(Expr::Any),
    ];
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::Union(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::Concat(Box::new(a), Box::new(b))),
            inner.clone().prop_map(|a| Expr::Star(Box::new(a))),
            inner.prop_map(|a| Expr::Optional(Box::new(a))),
        ]
    })
}

/// Range expressions whose endpoints fall in every UTF-8 length class,
/// including spans that touch the surrogate block.
fn wide_expr_strategy() -> impl Strategy<Value = Expr> {
    let start = prop_oneof![
        0u32..0x80,
        0x70u32..0x800,
        0x7F0u32..0x1_0000,
        0xD7F0u32..0xE010,
        0xFFF0u32..0x11_0000,
    ];
    let leaf = (start, 0u32..0x180)
        .prop_map(|(lo, span)| Expr::Range(lo, (lo + span).min(0x10_FFFF)));
    leaf.prop_recursive(3, 10, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::Union(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::Concat(Box::new(a), Box::new(b))),
            inner.clone().prop_map(|a| Expr::Star(Box::new(a))),
            inner.prop_map(|a| Expr::Optional(Box::new(a))),
        ]
    })
}

fn probes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[abcd]{0,6}", 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_double_complement(e in expr_strategy(), probes in probes()) {
        let a = e.build();
        let back = complement(&complement(&a));
        prop_assert!(same_language(&back, &a));
        for s in &probes {
            prop_assert_eq!(back.run(s), a.run(s));
        }
    }

    #[test]
    fn prop_idempotent_operations(e in expr_strategy()) {
        let a = e.build();
        prop_assert!(same_language(&union(&a, &a), &a));
        prop_assert!(same_language(&intersection(&a, &a), &a));
        prop_assert!(is_empty(&minus(&a, &a)));
    }

    #[test]
    fn prop_optional_minus_empty_string(e in expr_strategy()) {
        let a = e.build();
        let back = minus(&optional(&a), &make_empty_string());
        let expected = minus(&a, &make_empty_string());
        prop_assert!(same_language(&back, &expected));
    }

    #[test]
    fn prop_binary_operations_pointwise(
        x in expr_strategy(),
        y in expr_strategy(),
        probes in probes(),
    ) {
        let (a, b) = (x.build(), y.build());
        let (u, i, m) = (union(&a, &b), intersection(&a, &b), minus(&a, &b));
        for s in &probes {
            let (in_a, in_b) = (a.run(s), b.run(s));
            prop_assert_eq!(u.run(s), in_a || in_b);
            prop_assert_eq!(i.run(s), in_a && in_b);
            prop_assert_eq!(m.run(s), in_a && !in_b);
        }
    }

    #[test]
    fn prop_minimize_preserves_language(e in expr_strategy(), probes in probes()) {
        let a = e.build();
        let mut m = a.clone();
        m.minimize();
        prop_assert!(m.is_deterministic());
        prop_assert!(same_language(&m, &a));
        for s in &probes {
            prop_assert_eq!(m.run(s), a.run(s));
        }
    }

    #[test]
    fn prop_hopcroft_matches_brzozowski(e in expr_strategy()) {
        let a = e.build();
        let mut h = a.clone();
        minimize_hopcroft(&mut h, None).unwrap();
        let mut b = a.clone();
        minimize_brzozowski(&mut b, None).unwrap();
        prop_assert_eq!(h.num_states(), b.num_states());
        prop_assert_eq!(h.num_transitions(), b.num_transitions());

        // A second round trip through reversal lands on the same minimal DFA.
        let mut rr = reverse(&reverse(&a));
        rr.minimize();
        prop_assert_eq!(rr.num_states(), h.num_states());
    }

    #[test]
    fn prop_utf8_compile_preserves_language(
        e in wide_expr_strategy(),
        picks in prop::collection::vec(
            prop::collection::vec(
                (any::<prop::sample::Index>(), any::<bool>(), any::<char>()),
                0..=5,
            ),
            0..16,
        ),
    ) {
        let a = e.build();
        let mut utf8 = utf32_to_utf8(&a).unwrap();
        utf8.determinize();
        let run = ByteRunAutomaton::new(&utf8).unwrap();

        // Strings of up to five characters, mostly built from range
        // boundaries so they land on both sides of each byte split.
        let mut pool = Vec::new();
        e.boundary_chars(&mut pool);
        let mut samples: Vec<String> = picks
            .iter()
            .map(|chars| {
                chars
                    .iter()
                    .map(|(index, from_pool, c)| {
                        if *from_pool && !pool.is_empty() {
                            *index.get(&pool)
                        } else {
                            *c
                        }
                    })
                    .collect()
            })
            .collect();

        // Accepted strings, so every test also walks multi-step byte chains
        // that must end in an accept state.
        let short = intersection(&a, &repeat_range(&make_any_char(), 0, 5));
        let accepted = finite_strings(&short, Some(8)).unwrap();
        samples.extend(accepted.into_iter().filter_map(|cps| {
            cps.into_iter().map(char::from_u32).collect::<Option<String>>()
        }));

        for s in &samples {
            prop_assert_eq!(run.run(s.as_bytes()), a.run(s), "{:?}", s);
        }
    }

    #[test]
    fn prop_string_union_is_minimal(words in prop::collection::btree_set("[abc]{0,5}", 0..24)) {
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let direct = make_string_union(&words).unwrap();
        let mut naive = union_all(&words.iter().map(|w| make_string(w)).collect::<Vec<_>>());
        naive.minimize();
        prop_assert!(same_language(&direct, &naive));
        prop_assert_eq!(direct.num_states(), naive.num_states());
        prop_assert_eq!(direct.num_transitions(), naive.num_transitions());
    }

    #[test]
    fn prop_levenshtein_monotone(word in "[abc]{0,4}", transpositions in any::<bool>()) {
        let lev = LevenshteinAutomata::new(&word, transpositions);
        let mut previous = lev.to_automaton(0).unwrap();
        for n in 1..=2 {
            let next = lev.to_automaton(n).unwrap();
            prop_assert!(same_language(&intersection(&previous, &next), &previous));
            previous = next;
        }
    }

    #[test]
    fn prop_floor_matches_sorted_scan(
        words in prop::collection::btree_set("[abé]{0,4}", 2..16),
        probes in prop::collection::vec("[abcé]{0,5}", 1..16),
    ) {
        let list: Vec<&str> = words.iter().map(String::as_str).collect();
        let compiled = CompiledAutomaton::new(&make_string_union(&list).unwrap()).unwrap();
        let mut sorted: Vec<&[u8]> = list.iter().map(|w| w.as_bytes()).collect();
        sorted.sort();
        for probe in &probes {
            let expected = sorted
                .iter()
                .rev()
                .find(|w| **w <= probe.as_bytes())
                .map(|w| w.to_vec());
            prop_assert_eq!(compiled.floor(probe.as_bytes()).unwrap(), expected, "{:?}", probe);
        }
    }
}
