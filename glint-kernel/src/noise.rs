use glam::{vec2, UVec2, Vec2};

use crate::Frame;

/// Per-pixel stream of uniform random numbers.
///
/// Each pixel gets its own, deterministic stream for each frame; the state is
/// passed around explicitly (and copied, if a stage needs to peek ahead without
/// consuming numbers).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WhiteNoise {
    state: u32,
}

impl WhiteNoise {
    pub fn new(seed: u32, frame: Frame, id: UVec2) -> Self {
        let mut this = Self {
            state: seed
                ^ frame.get().wrapping_mul(0x9e37_79b9)
                ^ id.x.wrapping_mul(48619)
                ^ id.y.wrapping_mul(95461),
        };

        // Scramble the initial state, so that neighbouring pixels don't start
        // with almost-identical streams
        this.sample_int();
        this
    }

    /// Generates a uniform sample in range `<0.0, 1.0)`.
    pub fn sample(&mut self) -> f32 {
        ((self.sample_int() >> 8) as f32) / ((1u32 << 24) as f32)
    }

    /// Generates a uniform sample in range `<0.0, 1.0)²`.
    pub fn sample_vec2(&mut self) -> Vec2 {
        let x = self.sample();
        let y = self.sample();

        vec2(x, y)
    }

    /// Generates a uniform sample in range `<0, u32::MAX>`.
    pub fn sample_int(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(747796405)
            .wrapping_add(2891336453);

        let word = ((self.state >> ((self.state >> 28) + 4)) ^ self.state)
            .wrapping_mul(277803737);

        (word >> 22) ^ word
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn determinism() {
        let mut a = WhiteNoise::new(123, Frame::new(4), uvec2(10, 20));
        let mut b = WhiteNoise::new(123, Frame::new(4), uvec2(10, 20));

        for _ in 0..32 {
            assert_eq!(a.sample_int(), b.sample_int());
        }
    }

    #[test]
    fn streams_differ() {
        let mut a = WhiteNoise::new(123, Frame::new(4), uvec2(10, 20));
        let mut b = WhiteNoise::new(123, Frame::new(5), uvec2(10, 20));
        let mut c = WhiteNoise::new(123, Frame::new(4), uvec2(11, 20));

        let a = [a.sample_int(), a.sample_int(), a.sample_int()];
        let b = [b.sample_int(), b.sample_int(), b.sample_int()];
        let c = [c.sample_int(), c.sample_int(), c.sample_int()];

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn range() {
        let mut target = WhiteNoise::new(0, Frame::new(0), uvec2(0, 0));
        let mut sum = 0.0;

        for _ in 0..10_000 {
            let x = target.sample();

            assert!(x >= 0.0 && x < 1.0);
            sum += x;
        }

        let mean = sum / 10_000.0;

        assert!((mean - 0.5).abs() < 0.02, "mean={mean}");
    }
}
