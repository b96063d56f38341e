use std::fmt;

use glint_kernel::DiSource;
use glint_passes::di::DiOutput;

/// Counters describing how a single frame went.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Pixels that hit something
    pub pixels: u32,

    /// Pixels that merged their temporal reservoir
    pub temporal_hits: u32,

    /// Spatial reservoirs merged, over all pixels
    pub spatial_merges: u32,

    /// Pixels per origin of their selected sample (candidates, temporal
    /// reuse, spatial reuse)
    pub selected: [u32; 3],

    /// Pixels whose selected sample turned out to be occluded
    pub occluded: u32,

    /// Pixels that stored a non-empty reservoir
    pub stored: u32,

    /// Sum of `M` over all pixels, before clamping
    pub m_sum: u64,
}

impl FrameStats {
    pub fn from_output(output: &DiOutput) -> Self {
        let debug = &output.debug;

        if debug.m == 0 {
            return Default::default();
        }

        let mut selected = [0; 3];

        match debug.source {
            Some(DiSource::Candidates) => selected[0] = 1,
            Some(DiSource::Temporal) => selected[1] = 1,
            Some(DiSource::Spatial) => selected[2] = 1,
            None => (),
        }

        Self {
            pixels: 1,
            temporal_hits: debug.temporal_merged as u32,
            spatial_merges: debug.spatial_merged,
            selected,
            occluded: debug.occluded as u32,
            stored: (output.reservoir.id != 0) as u32,
            m_sum: debug.m as u64,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            pixels: self.pixels + other.pixels,
            temporal_hits: self.temporal_hits + other.temporal_hits,
            spatial_merges: self.spatial_merges + other.spatial_merges,
            selected: [
                self.selected[0] + other.selected[0],
                self.selected[1] + other.selected[1],
                self.selected[2] + other.selected[2],
            ],
            occluded: self.occluded + other.occluded,
            stored: self.stored + other.stored,
            m_sum: self.m_sum + other.m_sum,
        }
    }

    /// Returns the average `M` of a pixel that hit something.
    pub fn avg_m(&self) -> f32 {
        if self.pixels == 0 {
            0.0
        } else {
            self.m_sum as f32 / self.pixels as f32
        }
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pixels={}, temporal-hits={}, spatial-merges={}, \
             selected={}/{}/{}, occluded={}, stored={}, avg-m={:.2}",
            self.pixels,
            self.temporal_hits,
            self.spatial_merges,
            self.selected[0],
            self.selected[1],
            self.selected[2],
            self.occluded,
            self.stored,
            self.avg_m(),
        )
    }
}
