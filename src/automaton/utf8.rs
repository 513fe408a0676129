//! Code-point to UTF-8 byte automaton compilation.
//!
//! Every code-point range `[lo, hi]` is split at the UTF-8 length
//! boundaries (0x7F, 0x7FF, 0xFFFF) with the surrogate block clipped out,
//! and each same-length piece becomes a set of byte-range chains:
//!
//! ```text
//! [U+0800, U+FFFF]  =>  E0 [A0-BF] [80-BF]
//!                       [E1-EF] [80-BF] [80-BF]   (minus ED A0..ED BF)
//! ```
//!
//! Chains of pure continuation bytes `[80-BF]{k}` leading to the same
//! destination are shared.

use rustc_hash::FxHashMap;

use super::arena::{StateArena, StateId, MAX_CODE_POINT};
use super::fa::{reachable, Automaton};
use crate::{AutomatonError, Result};

// UTF-8 encoding boundaries
const UTF8_1BYTE_MAX: u32 = 0x7F;
const UTF8_2BYTE_MAX: u32 = 0x7FF;
const UTF8_3BYTE_MAX: u32 = 0xFFFF;
const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;

const CONT_MIN: u8 = 0x80;
const CONT_MAX: u8 = 0xBF;

/// Compile a code-point automaton into an equivalent UTF-8 byte automaton.
///
/// Surrogate code points are not encodable, so they are dropped from every
/// range; a literal containing one becomes the empty automaton. Labels above
/// U+10FFFF are rejected.
pub fn utf32_to_utf8(a: &Automaton) -> Result<Automaton> {
    if let Some(labels) = a.singleton() {
        let mut bytes = Vec::with_capacity(labels.len());
        for &cp in labels {
            if cp > MAX_CODE_POINT {
                return Err(AutomatonError::InvalidCodePoint(cp));
            }
            if (SURROGATE_START..=SURROGATE_END).contains(&cp) {
                return Ok(Automaton::empty());
            }
            let mut buf = [0u8; 4];
            let len = encode(cp, &mut buf);
            bytes.extend(buf[..len].iter().map(|&b| u32::from(b)));
        }
        return Ok(Automaton::from_labels(bytes));
    }

    let (graph, initial) = a.graph();
    let mut builder = Utf8Builder::new(graph.len());
    for id in reachable(&graph, initial) {
        builder.arena[id].accept = graph[id].accept;
        for t in &graph[id].transitions {
            if t.max > MAX_CODE_POINT {
                return Err(AutomatonError::InvalidCodePoint(t.max));
            }
            builder.add_code_point_range(id, t.min, t.max, t.to);
        }
    }
    let mut out = Automaton::with_graph(builder.arena, initial, false);
    out.compact();
    let deterministic = out.check_deterministic();
    out.set_deterministic(deterministic);
    Ok(out)
}

/// Encode a scalar into `buf`, returning the byte count.
fn encode(cp: u32, buf: &mut [u8; 4]) -> usize {
    if cp <= UTF8_1BYTE_MAX {
        buf[0] = cp as u8;
        1
    } else if cp <= UTF8_2BYTE_MAX {
        buf[0] = 0xC0 | (cp >> 6) as u8;
        buf[1] = 0x80 | (cp & 0x3F) as u8;
        2
    } else if cp <= UTF8_3BYTE_MAX {
        buf[0] = 0xE0 | (cp >> 12) as u8;
        buf[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[2] = 0x80 | (cp & 0x3F) as u8;
        3
    } else {
        buf[0] = 0xF0 | (cp >> 18) as u8;
        buf[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
        buf[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[3] = 0x80 | (cp & 0x3F) as u8;
        4
    }
}

struct Utf8Builder {
    arena: StateArena,
    /// (destination, k) -> state that reads k continuation bytes then
    /// lands on destination.
    tails: FxHashMap<(StateId, usize), StateId>,
}

impl Utf8Builder {
    /// The first `states` ids mirror the code-point automaton's ids.
    fn new(states: usize) -> Self {
        let mut arena = StateArena::with_capacity(states * 2);
        for _ in 0..states {
            arena.alloc();
        }
        Self {
            arena,
            tails: FxHashMap::default(),
        }
    }

    /// Add `[lo, hi]` without iterating through each code point.
    fn add_code_point_range(&mut self, from: StateId, lo: u32, hi: u32, dest: StateId) {
        let boundaries = [UTF8_1BYTE_MAX, UTF8_2BYTE_MAX, UTF8_3BYTE_MAX, MAX_CODE_POINT];

        let mut current = lo;
        for &boundary in &boundaries {
            if current > hi {
                break;
            }
            if boundary < current {
                continue;
            }
            let segment_end = hi.min(boundary);

            if current <= SURROGATE_END && segment_end >= SURROGATE_START {
                if current < SURROGATE_START {
                    self.add_same_length(from, current, SURROGATE_START - 1, dest);
                }
                if segment_end > SURROGATE_END {
                    self.add_same_length(from, SURROGATE_END + 1, segment_end, dest);
                }
            } else {
                self.add_same_length(from, current, segment_end, dest);
            }

            current = segment_end + 1;
        }
    }

    /// `lo` and `hi` encode to the same number of bytes.
    fn add_same_length(&mut self, from: StateId, lo: u32, hi: u32, dest: StateId) {
        let mut lo_buf = [0u8; 4];
        let mut hi_buf = [0u8; 4];
        let len = encode(lo, &mut lo_buf);
        let hi_len = encode(hi, &mut hi_buf);
        debug_assert_eq!(len, hi_len, "lo and hi must have same UTF-8 length");
        self.add_byte_range(from, &lo_buf[..len], &hi_buf[..len], 0, dest);
    }

    #[inline]
    fn add(&mut self, from: StateId, lo: u8, hi: u8, to: StateId) {
        self.arena.add_transition(from, u32::from(lo), u32::from(hi), to);
    }

    /// State reading `depth` arbitrary continuation bytes into `dest`.
    fn tail(&mut self, dest: StateId, depth: usize) -> StateId {
        if depth == 0 {
            return dest;
        }
        if let Some(&state) = self.tails.get(&(dest, depth)) {
            return state;
        }
        let next = self.tail(dest, depth - 1);
        let state = self.arena.alloc();
        self.add(state, CONT_MIN, CONT_MAX, next);
        self.tails.insert((dest, depth), state);
        state
    }

    /// All sequences between `lo[idx..]` and `hi[idx..]`, which share
    /// `lo[..idx]`.
    fn add_byte_range(&mut self, from: StateId, lo: &[u8], hi: &[u8], idx: usize, dest: StateId) {
        let last = lo.len() - 1;
        if idx == last {
            self.add(from, lo[idx], hi[idx], dest);
            return;
        }
        if lo[idx] == hi[idx] {
            let next = self.arena.alloc();
            self.add(from, lo[idx], lo[idx], next);
            self.add_byte_range(next, lo, hi, idx + 1, dest);
            return;
        }

        // Split into three parts: lo-to-max, middle, min-to-hi. An edge whose
        // remaining bytes already span the whole continuation range folds
        // into the middle.
        let depth = last - idx;
        let lo_full = lo[idx + 1..].iter().all(|&b| b == CONT_MIN);
        let hi_full = hi[idx + 1..].iter().all(|&b| b == CONT_MAX);
        let middle_lo = if lo_full { lo[idx] } else { lo[idx] + 1 };
        let middle_hi = if hi_full { hi[idx] } else { hi[idx] - 1 };

        if !lo_full {
            let low = self.arena.alloc();
            self.add(from, lo[idx], lo[idx], low);
            self.add_low(low, lo, idx + 1, dest);
        }
        if middle_lo <= middle_hi {
            let tail = self.tail(dest, depth);
            self.add(from, middle_lo, middle_hi, tail);
        }
        if !hi_full {
            let high = self.arena.alloc();
            self.add(from, hi[idx], hi[idx], high);
            self.add_high(high, hi, idx + 1, dest);
        }
    }

    /// Sequences from `lo[idx..]` up to all-`0xBF`.
    fn add_low(&mut self, from: StateId, lo: &[u8], idx: usize, dest: StateId) {
        let last = lo.len() - 1;
        if idx == last {
            self.add(from, lo[idx], CONT_MAX, dest);
            return;
        }
        let depth = last - idx;
        if lo[idx + 1..].iter().all(|&b| b == CONT_MIN) {
            let tail = self.tail(dest, depth);
            self.add(from, lo[idx], CONT_MAX, tail);
            return;
        }
        let next = self.arena.alloc();
        self.add(from, lo[idx], lo[idx], next);
        self.add_low(next, lo, idx + 1, dest);
        if lo[idx] < CONT_MAX {
            let tail = self.tail(dest, depth);
            self.add(from, lo[idx] + 1, CONT_MAX, tail);
        }
    }

    /// Sequences from all-`0x80` up to `hi[idx..]`.
    fn add_high(&mut self, from: StateId, hi: &[u8], idx: usize, dest: StateId) {
        let last = hi.len() - 1;
        if idx == last {
            self.add(from, CONT_MIN, hi[idx], dest);
            return;
        }
        let depth = last - idx;
        if hi[idx + 1..].iter().all(|&b| b == CONT_MAX) {
            let tail = self.tail(dest, depth);
            self.add(from, CONT_MIN, hi[idx], tail);
            return;
        }
        if hi[idx] > CONT_MIN {
            let tail = self.tail(dest, depth);
            self.add(from, CONT_MIN, hi[idx] - 1, tail);
        }
        let next = self.arena.alloc();
        self.add(from, hi[idx], hi[idx], next);
        self.add_high(next, hi, idx + 1, dest);
    }
}
