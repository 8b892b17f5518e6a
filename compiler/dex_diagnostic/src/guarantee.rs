//! Type-level proof that an error was reported.

/// Only constructible by emitting an error (or observing that one was).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// `Some` when `count` errors have been reported and `count > 0`.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_nonzero_counts_guarantee() {
        assert!(ErrorGuaranteed::from_error_count(0).is_none());
        assert!(ErrorGuaranteed::from_error_count(3).is_some());
    }
}
