//! Common structs, algorithms etc. used by Glint's passes and renderer.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod brdf;
mod frame;
mod gbuffer;
mod light;
mod lights;
mod noise;
mod passes;
mod ray;
mod reprojection;
mod reservoir;
mod surface;
mod utils;

pub use self::brdf::*;
pub use self::frame::*;
pub use self::gbuffer::*;
pub use self::light::*;
pub use self::lights::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::ray::*;
pub use self::reprojection::*;
pub use self::reservoir::*;
pub use self::surface::*;
pub use self::utils::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use glam::*;

    pub use crate::*;
}

/// Maximum number of candidates a stored reservoir may summarize.
///
/// Applied when a reservoir is written into history (and when a loaded
/// reservoir gets merged), never while accumulating.
pub const M_CLAMP: u32 = 8;

/// Upper bound for each channel of the radiance we produce.
pub const MAX_OUTPUT_VALUE: f32 = 1000.0;

/// Contributions with luminance above this are treated as corrupted.
pub const MAX_CONTRIBUTION_LUMA: f32 = 1e6;

/// Spatial candidates whose target function is below this are not merged;
/// they are barely relevant to the current surface and only bleed color.
pub const MIN_SPATIAL_P_HAT: f32 = 1e-4;

/// Neighbourhood of 8-connected offsets used for spatial reuse.
pub const SPATIAL_KERNEL: [[i32; 2]; 8] = [
    [1, 0],
    [-1, 0],
    [0, 1],
    [0, -1],
    [1, 1],
    [-1, 1],
    [1, -1],
    [-1, -1],
];
