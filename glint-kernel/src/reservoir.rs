mod di;
mod mis;

pub use self::di::*;
pub use self::mis::*;
use crate::WhiteNoise;

/// Weighted reservoir; `w` holds the sum of weights while accumulating and
/// the resampling weight (`W`) once normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reservoir<T> {
    pub sample: T,
    pub m: u32,
    pub w: f32,
}

impl<T> Reservoir<T>
where
    T: Clone + Copy,
{
    /// Streams a single candidate into this reservoir.
    pub fn update(
        &mut self,
        wnoise: &mut WhiteNoise,
        sample: T,
        weight: f32,
    ) -> bool {
        self.merge(wnoise, sample, weight, 1)
    }

    /// Streams a candidate that summarizes `m` candidates into this
    /// reservoir; returns whether the candidate has been selected.
    ///
    /// Always consumes exactly one random number.
    pub fn merge(
        &mut self,
        wnoise: &mut WhiteNoise,
        sample: T,
        weight: f32,
        m: u32,
    ) -> bool {
        let r = wnoise.sample();

        self.m = self.m.saturating_add(m);

        if !(weight > 0.0) {
            return false;
        }

        self.w += weight;

        if r * self.w < weight {
            self.sample = sample;
            true
        } else {
            false
        }
    }

    /// Turns sum of weights into the resampling weight, using the MIS-like
    /// normalization `W = (w_sum * num) / (pdf * denom)`.
    pub fn normalize_ex(&mut self, pdf: f32, norm_num: f32, norm_denom: f32) {
        let denom = pdf * norm_denom;

        self.w = if denom > 1e-6 {
            (self.w * norm_num) / denom
        } else {
            0.0
        };
    }

    pub fn clamp_m(&mut self, max: u32) {
        self.m = self.m.min(max);
    }

    pub fn clamp_w(&mut self, max: f32) {
        if max > 0.0 {
            self.w = self.w.min(max);
        }
    }
}
