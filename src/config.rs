//! Build-time knobs for compiling automata.

/// Minimization algorithm used when finalizing an automaton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Minimization {
    /// Partition refinement over interval classes.
    #[default]
    Hopcroft,
    /// Double reversal. Slower, kept as an independent oracle.
    Brzozowski,
}

#[derive(Debug, Clone)]
pub struct AutomatonConfig {
    /// Cap on states created by subset construction; 0 disables the cap.
    pub max_determinized_states: usize,
    pub minimization: Minimization,
    /// Detect the all/none/single-string shortcuts when compiling.
    pub simplify: bool,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            max_determinized_states: 10_000,
            minimization: Minimization::default(),
            simplify: true,
        }
    }
}

impl AutomatonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_determinized_states(mut self, max: usize) -> Self {
        self.max_determinized_states = max;
        self
    }

    pub fn with_minimization(mut self, minimization: Minimization) -> Self {
        self.minimization = minimization;
        self
    }

    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    /// The cap as an `Option`, `None` meaning unbounded.
    pub(crate) fn state_limit(&self) -> Option<usize> {
        (self.max_determinized_states > 0).then_some(self.max_determinized_states)
    }
}
