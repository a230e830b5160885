//! RNG module - color selection for spawned pieces
//!
//! The engine draws spawn colors through [`RandomSource`] so hosts can swap in
//! a seeded or scripted source. [`SimpleRng`] is a small LCG that keeps whole
//! sessions reproducible from a seed; [`SequenceRng`] replays a fixed list of
//! indices for hand-built scenarios.

/// Source of uniformly distributed indices.
pub trait RandomSource {
    /// Return a value in `[0, len)`. `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;
}

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
        // Low bits of an LCG have short periods.
        (self.next_u32() >> 16) % max.max(1)
    }

    /// Current RNG state (for restarting a session with the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RandomSource for SimpleRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.next_range(len as u32) as usize
    }
}

/// Replays a fixed list of indices, cycling when exhausted.
///
/// Indices are reduced modulo `len`, so a script written for a six-color
/// palette still works against a smaller one.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<usize>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceRng {
    fn next_index(&mut self, len: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v % len.max(1)
    }
}
