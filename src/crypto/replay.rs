//! Anti-replay sequence guard.
//!
//! Strictly monotonic: a sequence number is admitted only if it exceeds
//! every previously accepted one. There is no reordering window, so a
//! delayed-but-honest packet arriving after a later one is rejected the
//! same as a replay. The transport rides a single UDP flow, where
//! in-order delivery is the overwhelmingly common case; the trade buys
//! a guard that is one integer compare.

/// Tracks the highest accepted inbound sequence number.
///
/// # Limitations
/// The counter does not wrap. Once `u32::MAX` has been accepted (about
/// 4 billion packets), no further traffic is admitted and the session
/// must be rebuilt. Left unhandled on purpose; see DESIGN.md.
#[derive(Debug, Default)]
pub struct ReplayGuard {
    highest: u32,
}

impl ReplayGuard {
    /// Create a guard with no packets seen (high-water mark 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `seq` if it is strictly greater than the high-water mark.
    ///
    /// On admission the mark advances to `seq`; on rejection the guard
    /// is left unchanged.
    pub fn accept(&mut self, seq: u32) -> bool {
        if seq > self.highest {
            self.highest = seq;
            true
        } else {
            false
        }
    }

    /// The highest sequence number accepted so far.
    pub fn highest(&self) -> u32 {
        self.highest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_enforcement() {
        let mut guard = ReplayGuard::new();

        assert!(guard.accept(5));
        assert_eq!(guard.highest(), 5);

        // Exact replay.
        assert!(!guard.accept(5));
        assert_eq!(guard.highest(), 5);

        assert!(guard.accept(10));
        assert_eq!(guard.highest(), 10);

        // Late packet below the mark, even though never seen.
        assert!(!guard.accept(7));
        assert_eq!(guard.highest(), 10);
    }

    #[test]
    fn test_zero_never_accepted() {
        // send_seq starts at 1, so 0 can only be forged or replayed.
        let mut guard = ReplayGuard::new();
        assert!(!guard.accept(0));
    }

    #[test]
    fn test_rejection_leaves_state_unchanged() {
        let mut guard = ReplayGuard::new();
        assert!(guard.accept(100));

        for seq in [0, 1, 99, 100] {
            assert!(!guard.accept(seq));
            assert_eq!(guard.highest(), 100);
        }
    }

    #[test]
    fn test_saturation_at_max() {
        let mut guard = ReplayGuard::new();
        assert!(guard.accept(u32::MAX));
        // Nothing is above the mark any more; the session is done.
        assert!(!guard.accept(u32::MAX));
        assert!(!guard.accept(1));
    }
}
