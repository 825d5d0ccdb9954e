use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skylark_shared::KeypointFrame;

use crate::sources::MotionSource;

/// Wraps another source and randomly swallows frames, reproducing a lossy
/// detector. Draws exactly one random number per cycle.
pub struct DropoutSource {
    inner: Box<dyn MotionSource>,
    rate: f32,
    rng: StdRng,
    name: String,
}

impl DropoutSource {
    pub fn new(inner: Box<dyn MotionSource>, rate: f32, seed: u64) -> Self {
        let name = format!("{}+dropout", inner.name());
        Self {
            inner,
            rate: rate.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
            name,
        }
    }
}

impl MotionSource for DropoutSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_frame(&mut self, cycle: u32) -> Option<KeypointFrame> {
        let roll: f32 = self.rng.gen();
        let frame = self.inner.next_frame(cycle);
        if roll < self.rate {
            None
        } else {
            frame
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::GliderSource;

    fn drop_pattern(seed: u64, rate: f32, cycles: u32) -> Vec<bool> {
        let mut source = DropoutSource::new(Box::new(GliderSource), rate, seed);
        (0..cycles)
            .map(|c| source.next_frame(c).is_none())
            .collect()
    }

    #[test]
    fn test_same_seed_same_gaps() {
        assert_eq!(drop_pattern(7, 0.3, 200), drop_pattern(7, 0.3, 200));
    }

    #[test]
    fn test_different_seeds_diverge() {
        assert_ne!(drop_pattern(7, 0.3, 200), drop_pattern(8, 0.3, 200));
    }

    #[test]
    fn test_zero_rate_never_drops() {
        assert!(drop_pattern(7, 0.0, 200).iter().all(|dropped| !dropped));
    }

    #[test]
    fn test_rate_roughly_holds() {
        let dropped = drop_pattern(42, 0.3, 1000).iter().filter(|d| **d).count();
        assert!(
            (200..400).contains(&dropped),
            "30% dropout over 1000 cycles should land near 300, got {dropped}"
        );
    }
}
