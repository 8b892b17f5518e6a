//! Interpreter limits.

/// Bounds on one top-level evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CtfeConfig {
    /// Nested interpreted calls allowed before evaluation gives up.
    pub max_recursion_depth: usize,
    /// Expressions and statements evaluated before evaluation fails.
    pub step_budget: u64,
}

impl Default for CtfeConfig {
    fn default() -> Self {
        CtfeConfig {
            max_recursion_depth: 1000,
            step_budget: 10_000_000,
        }
    }
}

impl CtfeConfig {
    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    #[must_use]
    pub fn with_step_budget(mut self, budget: u64) -> Self {
        self.step_budget = budget;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = CtfeConfig::default().with_max_recursion_depth(8).with_step_budget(64);
        assert_eq!(config.max_recursion_depth, 8);
        assert_eq!(config.step_budget, 64);
        assert_eq!(CtfeConfig::default().max_recursion_depth, 1000);
    }
}
