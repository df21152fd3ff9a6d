//! RNG module - seeded draw-without-replacement card selection
//!
//! A round presents every card exactly once, like dealing from a shuffled
//! deck: pick an index uniformly among the remaining cards and swap-remove
//! it. The pool shrinks monotonically and never regrows within a round.
//!
//! The simple LCG keeps rounds deterministic under a seed for testing.

use litter_panda_types::{EmptyPoolError, ItemId};

use crate::catalog;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Current generator state (for continuing a sequence across rounds).
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Mutable set of not-yet-drawn cards for one round.
#[derive(Debug, Clone)]
pub struct DrawPool {
    remaining: Vec<ItemId>,
    rng: SimpleRng,
}

impl DrawPool {
    /// Create a pool over the full compiled-in catalog.
    pub fn new(seed: u32) -> Self {
        let items: Vec<ItemId> = catalog::all_ids().collect();
        Self::with_items(seed, &items)
    }

    /// Create a pool over an explicit item set.
    pub fn with_items(seed: u32, items: &[ItemId]) -> Self {
        Self {
            remaining: items.to_vec(),
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw one card uniformly at random among the remaining ones.
    pub fn draw_random(&mut self) -> Result<ItemId, EmptyPoolError> {
        if self.remaining.is_empty() {
            return Err(EmptyPoolError);
        }
        let index = self.rng.next_range(self.remaining.len() as u32) as usize;
        Ok(self.remaining.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.remaining.contains(&id)
    }

    /// Get the current RNG state (for restarting a round with a continued sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for DrawPool {
    fn default() -> Self {
        Self::new(1)
    }
}
