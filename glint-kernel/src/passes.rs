use bytemuck::{Pod, Zeroable};
use glam::UVec2;

use crate::{FieldLayout, Frame, Reprojection, M_CLAMP};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DiPassParams {
    pub seed: u32,
    pub frame: u32,
    pub curr_size: UVec2,
    pub prev_size: UVec2,

    /// Number of candidates drawn per pixel
    pub candidates: u32,

    /// Number of neighbours considered during spatial reuse
    pub spatial_neighbours: u32,

    /// Maximum `M` a reservoir may carry into the next frame
    pub m_clamp: u32,

    /// Upper bound for `W`; zero (or less) disables it
    pub max_w: f32,

    /// See `Self::FLAG_*`
    pub flags: u32,
}

impl DiPassParams {
    pub const FLAG_TEMPORAL: u32 = 1;
    pub const FLAG_SPATIAL: u32 = 1 << 1;
    pub const FLAG_SUN_CANDIDATE: u32 = 1 << 2;
    pub const FLAG_CHECKERBOARD: u32 = 1 << 3;

    pub const MAX_CANDIDATES: u32 = 32;
    pub const MAX_SPATIAL_NEIGHBOURS: u32 = 16;

    pub fn frame(&self) -> Frame {
        Frame::new(self.frame)
    }

    pub fn candidates(&self) -> u32 {
        self.candidates.clamp(1, Self::MAX_CANDIDATES)
    }

    pub fn spatial_neighbours(&self) -> u32 {
        self.spatial_neighbours.min(Self::MAX_SPATIAL_NEIGHBOURS)
    }

    pub fn m_clamp(&self) -> u32 {
        self.m_clamp.max(1)
    }

    pub fn temporal_enabled(&self) -> bool {
        self.flags & Self::FLAG_TEMPORAL != 0
    }

    pub fn spatial_enabled(&self) -> bool {
        self.flags & Self::FLAG_SPATIAL != 0
    }

    pub fn sun_candidate_enabled(&self) -> bool {
        self.flags & Self::FLAG_SUN_CANDIDATE != 0
    }

    pub fn layout(&self) -> FieldLayout {
        if self.flags & Self::FLAG_CHECKERBOARD != 0 {
            FieldLayout::Checkerboard
        } else {
            FieldLayout::Flat
        }
    }

    pub fn reprojection(&self) -> Reprojection {
        Reprojection {
            curr_size: self.curr_size,
            prev_size: self.prev_size,
            layout: self.layout(),
        }
    }
}

impl Default for DiPassParams {
    fn default() -> Self {
        Self {
            seed: 0,
            frame: 0,
            curr_size: UVec2::ZERO,
            prev_size: UVec2::ZERO,
            candidates: 8,
            spatial_neighbours: 4,
            m_clamp: M_CLAMP,
            max_w: 64.0,
            flags: Self::FLAG_TEMPORAL | Self::FLAG_SPATIAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps() {
        let target = DiPassParams {
            candidates: 0,
            spatial_neighbours: 100,
            m_clamp: 0,
            ..Default::default()
        };

        assert_eq!(1, target.candidates());
        assert_eq!(16, target.spatial_neighbours());
        assert_eq!(1, target.m_clamp());

        let target = DiPassParams {
            candidates: 64,
            ..Default::default()
        };

        assert_eq!(32, target.candidates());
    }

    #[test]
    fn flags() {
        let target = DiPassParams {
            flags: DiPassParams::FLAG_SPATIAL | DiPassParams::FLAG_CHECKERBOARD,
            ..Default::default()
        };

        assert!(!target.temporal_enabled());
        assert!(target.spatial_enabled());
        assert!(!target.sun_candidate_enabled());
        assert_eq!(FieldLayout::Checkerboard, target.layout());
    }
}
