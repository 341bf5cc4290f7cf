//! Seedable PCG32 generator used for shuffling and win-animation jitter

use rand::{RngCore, SeedableRng};

const MULTIPLIER: u64 = 6364136223846793005;
const INCREMENT: u64 = 1442695040888963407;
const DEFAULT_STATE: u64 = 0x4d595df4d0f33173;

/// Permuted congruential generator with 64 bits of state and 32 bits of output.
///
/// The same seed always yields the same sequence, so a deal can be replayed
/// from its seed alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pcg32 {
    state: u64
}

impl Default for Pcg32 {
    fn default() -> Self {
        Pcg32 { state: DEFAULT_STATE }
    }
}

impl Pcg32 {
    pub fn new(seed: u64) -> Pcg32 {
        let mut rng = Pcg32::default();
        rng.seed(seed);
        rng
    }

    pub fn seed(&mut self, seed: u64) {
        self.state = seed.wrapping_add(INCREMENT);
        self.next();
    }

    fn next(&mut self) -> u32 {
        let x = self.state;
        let count = (x >> 59) as u32;
        self.state = x.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        let x = x ^ (x >> 18);
        ((x >> 27) as u32).rotate_right(count)
    }

    /// Uniform over `[min, max]`, both inclusive.
    pub fn range(&mut self, min: u32, max: u32) -> u32 {
        debug_assert!(min <= max);
        let span = u64::from(max - min) + 1;
        min + (u64::from(self.next()) % span) as u32
    }

    /// Uniform over `[0, 1)`.
    pub fn next_float(&mut self) -> f32 {
        // Division in f64 then narrowing can round up to exactly 1.0
        let value = (f64::from(self.next()) / (f64::from(u32::MAX) + 1.0)) as f32;
        value.min(1.0 - f32::EPSILON)
    }
}

impl RngCore for Pcg32 {
    fn next_u32(&mut self) -> u32 {
        self.next()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next());
        let high = u64::from(self.next());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Pcg32 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Pcg32::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Pcg32::new(state)
    }
}
