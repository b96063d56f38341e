use glam::Vec3;

use crate::DiReservoir;

/// Where the selected sample of a combined reservoir came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiSource {
    Candidates,
    Temporal,
    Spatial,
}

/// Helper for bias correction of a reservoir combined from many sources.
///
/// Every source that's been merged contributes `p_hat * m` to the
/// normalization term, no matter whether its sample has been selected; the
/// target function of reused samples is evaluated at the current surface,
/// which is only an approximation of their source-surface probability (one
/// that holds as long as reuse is restricted to similar surfaces).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiMis {
    /// Number of candidates drawn for the current pixel
    pub m_current: u32,

    /// Sum of `p_hat * m` over all reused reservoirs
    pub reused_pi_sum: f32,

    /// Sum of `m` over all reused reservoirs
    pub reused_m: u32,

    /// Source of the currently selected sample
    pub source: Option<DiSource>,

    /// Resampling weight the selected sample has been merged with
    pub selected_weight: f32,

    /// Geometric normal of the surface the selected sample has been reused
    /// from
    pub source_geo_normal: Vec3,
}

impl DiMis {
    pub fn add_candidates(&mut self, m: u32, weight: f32, selected: bool) {
        self.m_current += m;

        if selected {
            self.source = Some(DiSource::Candidates);
            self.selected_weight = weight;
        }
    }

    pub fn add_reused(
        &mut self,
        source: DiSource,
        p_hat: f32,
        m: u32,
        weight: f32,
        geo_normal: Vec3,
        selected: bool,
    ) {
        self.reused_pi_sum += p_hat * m as f32;
        self.reused_m += m;

        if selected {
            self.source = Some(source);
            self.selected_weight = weight;
            self.source_geo_normal = geo_normal;
        }
    }

    pub fn is_reused(&self) -> bool {
        matches!(self.source, Some(DiSource::Temporal | DiSource::Spatial))
    }

    pub fn pi_sum(&self, selected_p_hat: f32) -> f32 {
        selected_p_hat * self.m_current as f32 + self.reused_pi_sum
    }

    /// Turns reservoir's sum of weights into its resampling weight.
    ///
    /// `source_visible` tells whether the selected sample would've been valid
    /// on the surface it's been reused from; it's ignored for samples drawn
    /// at the current pixel.
    pub fn normalize(&self, reservoir: &mut DiReservoir, source_visible: bool) {
        let p_hat = reservoir.sample.p_hat;

        let pi = if source_visible || !self.is_reused() {
            p_hat
        } else {
            0.0
        };

        reservoir.normalize_ex(p_hat, pi, self.pi_sum(p_hat));
    }
}
