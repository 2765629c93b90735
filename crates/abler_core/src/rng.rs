//! Deterministic random numbers for the few random choices combat makes.

/// Linear congruential generator owned by one board.
///
/// Never shared across boards and never seeded from the clock, so a
/// combat replays identically from the same seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatRng {
    state: u64,
}

impl CombatRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        // Low bits of an LCG cycle quickly; hand out the high half.
        self.state >> 16
    }

    /// Uniform index in `0..bound`. Returns 0 when `bound` is 0.
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }

    /// Pick one element, or `None` from an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_below(items.len());
        items.get(index)
    }

    /// Raw internal state, folded into board hashes.
    #[must_use]
    pub fn state(&self) -> u64 {
        self.state
    }
}
