use std::fs;
use std::path::Path;

use glint_kernel::{DiPassParams, DiReservoir, FieldLayout, M_CLAMP};
use serde::{Deserialize, Serialize};

/// Tunables of direct lighting.
///
/// Every field has a default, so a config file only needs to mention what it
/// wants to change:
///
/// ```toml
/// candidates = 4
/// spatial = false
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiConfig {
    /// Number of candidates drawn per pixel; clamped to `1..=32`
    pub candidates: u32,

    pub temporal: bool,
    pub spatial: bool,

    /// Number of neighbours visited during spatial reuse; clamped to `0..=16`
    pub spatial_neighbours: u32,

    /// Maximum `M` a reservoir may carry into the next frame; clamped to
    /// `1..=2048`
    pub m_clamp: u32,

    /// Upper bound for `W`; zero disables it
    pub max_w: f32,

    /// Whether the sun competes with polygon lights as an extra candidate
    pub sun_candidate: bool,

    /// Whether the viewport is rendered as two side-by-side checkerboard
    /// fields
    pub checkerboard: bool,

    /// Seed for the per-pixel noise; drawn anew each frame if missing
    pub seed: Option<u32>,
}

impl DiConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let this: Self = toml::from_str(s)?;

        Ok(this.sanitize())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Brings every value into its supported range.
    pub fn sanitize(mut self) -> Self {
        self.candidates =
            self.candidates.clamp(1, DiPassParams::MAX_CANDIDATES);

        self.spatial_neighbours = self
            .spatial_neighbours
            .min(DiPassParams::MAX_SPATIAL_NEIGHBOURS);

        self.m_clamp = self.m_clamp.clamp(1, DiReservoir::MAX_PACKED_M);

        if !self.max_w.is_finite() || self.max_w < 0.0 {
            self.max_w = 0.0;
        }

        self
    }

    pub fn layout(&self) -> FieldLayout {
        if self.checkerboard {
            FieldLayout::Checkerboard
        } else {
            FieldLayout::Flat
        }
    }

    pub(crate) fn flags(&self) -> u32 {
        let mut flags = 0;

        if self.temporal {
            flags |= DiPassParams::FLAG_TEMPORAL;
        }

        if self.spatial {
            flags |= DiPassParams::FLAG_SPATIAL;
        }

        if self.sun_candidate {
            flags |= DiPassParams::FLAG_SUN_CANDIDATE;
        }

        if self.checkerboard {
            flags |= DiPassParams::FLAG_CHECKERBOARD;
        }

        flags
    }
}

impl Default for DiConfig {
    fn default() -> Self {
        Self {
            candidates: 8,
            temporal: true,
            spatial: true,
            spatial_neighbours: 4,
            m_clamp: M_CLAMP,
            max_w: 64.0,
            sun_candidate: false,
            checkerboard: false,
            seed: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couldn't read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
