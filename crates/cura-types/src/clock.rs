use serde::{Deserialize, Serialize};

/// Virtual block counter.
///
/// Time is logical: the counter only moves when the driving harness calls
/// [`Clock::sleep`] or [`Clock::step`]. Heights never decrease.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    block_height: u64,
}

impl Clock {
    /// Create a clock starting at the given height.
    pub const fn new(initial_height: u64) -> Self {
        Self {
            block_height: initial_height,
        }
    }

    /// Current block height.
    pub const fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Advance the clock by `blocks`.
    pub fn sleep(&mut self, blocks: u64) {
        self.block_height = self.block_height.saturating_add(blocks);
    }

    /// Advance the clock by a single block.
    pub fn step(&mut self) {
        self.sleep(1);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn starts_at_initial_height() {
        assert_eq!(Clock::default().block_height(), 0);
        assert_eq!(Clock::new(42).block_height(), 42);
    }

    #[test]
    fn sleep_and_step() {
        let mut clock = Clock::new(10);
        clock.sleep(100);
        assert_eq!(clock.block_height(), 110);
        clock.step();
        assert_eq!(clock.block_height(), 111);
        clock.sleep(0);
        assert_eq!(clock.block_height(), 111);
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let mut clock = Clock::new(u64::MAX - 1);
        clock.sleep(5);
        assert_eq!(clock.block_height(), u64::MAX);
    }

    proptest! {
        #[test]
        fn height_is_monotonic(steps in proptest::collection::vec(0u64..10_000, 0..64)) {
            let mut clock = Clock::default();
            let mut last = clock.block_height();
            for blocks in steps {
                clock.sleep(blocks);
                prop_assert!(clock.block_height() >= last);
                last = clock.block_height();
            }
        }
    }
}
