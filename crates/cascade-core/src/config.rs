//! Cascade engine configuration.

/// How sibling relation branches are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOut {
    /// Poll all branches together and settle them as a group.
    #[default]
    Concurrent,
    /// Await each branch before starting the next.
    Sequential,
}

/// Cascade engine configuration.
#[derive(Debug, Clone, Default)]
pub struct CascadeConfig {
    /// Dispatch mode for per-relation fan-out.
    pub fan_out: FanOut,

    /// Emit a debug record for every created row and its matched input.
    pub log_matches: bool,
}

impl CascadeConfig {
    /// Create the default configuration (concurrent fan-out, no match logging).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fan-out mode.
    pub fn with_fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Dispatch relation branches one after another.
    pub fn sequential(self) -> Self {
        self.with_fan_out(FanOut::Sequential)
    }

    /// Enable per-row match logging.
    pub fn with_match_logging(mut self) -> Self {
        self.log_matches = true;
        self
    }

    /// Check if relation branches run concurrently.
    pub fn is_concurrent(&self) -> bool {
        self.fan_out == FanOut::Concurrent
    }
}
