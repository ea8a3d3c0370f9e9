//! Run configuration

/// Default limit on nested block execution
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Settings for one interpreter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum nesting of block re-entry before a recursion error
    pub max_depth: usize,
    /// Fixed seed for `rand`; seeded from the clock when unset
    pub seed: Option<u64>,
    /// Whether piped standard input becomes the initial string
    pub read_stdin: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
            read_stdin: true,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Fix the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn read_stdin(mut self, read: bool) -> Self {
        self.read_stdin = read;
        self
    }
}
