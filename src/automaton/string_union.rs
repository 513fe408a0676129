//! Minimal DFA construction straight from a sorted word list.
//!
//! Incremental Daciuk-Mihov: words arrive in code-point order, so once a new
//! word diverges from the previous one, every node below the divergence
//! point is final and can be merged with an equivalent registered node.
//! The automaton is minimal after the last word with no separate
//! minimization pass.
//!
//! ## Key details:
//! - Arena allocation: nodes live in a Vec and refer to each other by index
//! - Children are (label, index) pairs in label order, usually only a few
//! - The register maps a node's (accept, children) signature to its canonical
//!   index, which works because children are canonical before their parent

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::arena::{StateArena, StateId};
use super::fa::Automaton;
use crate::{AutomatonError, Result};

/// Longest accepted word, in code points.
pub const MAX_TERM_LENGTH: usize = 1000;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
struct NodeIdx(u32);

impl NodeIdx {
    fn get(self) -> usize {
        self.0 as usize
    }
}

type Children = SmallVec<[(u32, NodeIdx); 4]>;

#[derive(Default)]
struct Node {
    accept: bool,
    /// Sorted by label; only the last child can still change.
    children: Children,
}

struct StringUnionBuilder {
    nodes: Vec<Node>,
    register: FxHashMap<(bool, Children), NodeIdx>,
    /// Nodes along the previous word; `path[0]` is the root.
    path: Vec<NodeIdx>,
    previous: Option<Vec<u32>>,
}

impl StringUnionBuilder {
    fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(Node::default());
        Self {
            nodes,
            register: FxHashMap::default(),
            path: vec![NodeIdx(0)],
            previous: None,
        }
    }

    fn alloc(&mut self) -> NodeIdx {
        let idx = self.nodes.len();
        self.nodes.push(Node::default());
        NodeIdx(idx as u32)
    }

    fn add(&mut self, word: &str) -> Result<()> {
        let current: Vec<u32> = word.chars().map(u32::from).collect();
        if current.len() > MAX_TERM_LENGTH {
            return Err(AutomatonError::TermTooLong {
                len: current.len(),
                max: MAX_TERM_LENGTH,
            });
        }
        let shared = match &self.previous {
            Some(previous) => {
                match previous.as_slice().cmp(current.as_slice()) {
                    std::cmp::Ordering::Greater => return Err(AutomatonError::UnsortedInput),
                    std::cmp::Ordering::Equal => return Err(AutomatonError::DuplicateInput),
                    std::cmp::Ordering::Less => {}
                }
                previous
                    .iter()
                    .zip(&current)
                    .take_while(|(a, b)| a == b)
                    .count()
            }
            None => 0,
        };

        // Everything deeper than the shared prefix is finished.
        self.freeze_down_to(shared);

        let mut node = self.path[shared];
        for &label in &current[shared..] {
            let child = self.alloc();
            self.nodes[node.get()].children.push((label, child));
            self.path.push(child);
            node = child;
        }
        self.nodes[node.get()].accept = true;
        self.previous = Some(current);
        Ok(())
    }

    /// Replace-or-register every path node below `depth`, deepest first,
    /// then cut the path back to `depth`.
    fn freeze_down_to(&mut self, depth: usize) {
        for i in (depth + 1..self.path.len()).rev() {
            let node = self.path[i];
            let canonical = self.replace_or_register(node);
            if canonical != node {
                let parent = self.path[i - 1];
                if let Some(last) = self.nodes[parent.get()].children.last_mut() {
                    last.1 = canonical;
                }
            }
        }
        self.path.truncate(depth + 1);
    }

    fn replace_or_register(&mut self, node: NodeIdx) -> NodeIdx {
        let n = &self.nodes[node.get()];
        let key = (n.accept, n.children.clone());
        *self.register.entry(key).or_insert(node)
    }

    fn finish(mut self) -> Automaton {
        if self.previous.is_none() {
            return Automaton::empty();
        }
        self.freeze_down_to(0);

        let mut arena = StateArena::with_capacity(self.nodes.len());
        for node in &self.nodes {
            arena.alloc_with_accept(node.accept);
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            let from = StateId::new(idx);
            for &(label, child) in &node.children {
                arena.add_transition(from, label, label, StateId::new(child.get()));
            }
        }
        // Replaced nodes are unreachable; compaction drops them.
        let mut a = Automaton::with_graph(arena, StateId::new(0), true);
        a.compact();
        a.reduce();
        a
    }
}

/// Minimal automaton accepting exactly `words`.
///
/// Words must be sorted by code point (equivalently by UTF-8 bytes) and
/// unique.
pub(crate) fn build(words: &[&str]) -> Result<Automaton> {
    let mut builder = StringUnionBuilder::new();
    for word in words {
        builder.add(word)?;
    }
    Ok(builder.finish())
}
