//! Invariant checks for the parser's progress guarantees.

use super::core::Parser;

impl Parser<'_> {
    /// Lookahead backstop: a bounded number of reads may happen between two
    /// cursor advances. Trips when recovery code spins in place.
    #[inline]
    pub(crate) fn ensure_progress(&self) {
        debug_assert!(
            self.debug_fuel.get() != 0,
            "parser is stuck: too many lookaheads without consuming"
        );
        self.debug_fuel
            .set(self.debug_fuel.get().saturating_sub(1));
    }

    #[inline]
    pub(crate) fn reset_debug_fuel(&self) {
        self.debug_fuel.set(256);
    }
}
