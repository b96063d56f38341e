use glam::{IVec2, UVec2, Vec2, Vec3};

use crate::ClusterId;

/// Per-pixel data we keep around so that the next frame is able to tell
/// whether it's looking at the same surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Surface {
    /// View-space depth; zero if nothing has been hit
    pub depth: f32,

    pub geo_normal: Vec3,

    /// Stable identifier of the primitive (instance + triangle)
    pub prim_id: UVec2,

    /// Barycentric coordinates of the hit point on that primitive
    pub bary: Vec2,

    pub cluster: ClusterId,
}

impl Surface {
    /// Maximum relative depth difference of two surfaces deemed similar.
    pub const MAX_DEPTH_DIFFERENCE: f32 = 0.05;

    /// Minimum dot product of normals of two surfaces deemed similar.
    pub const MIN_NORMAL_DOT: f32 = 0.95;

    pub fn is_some(&self) -> bool {
        self.depth != 0.0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Returns relative depth difference between this (current) surface and
    /// `other` (previous one), compensating for the depth change predicted
    /// by motion vectors.
    pub fn depth_difference(&self, other: &Self, depth_motion: f32) -> f32 {
        let diff = (self.depth - other.depth + depth_motion).abs()
            / self.depth.abs().max(1e-3);

        if self.depth < 0.0 {
            diff * 0.25
        } else {
            diff
        }
    }

    /// Checks depth, normal and cluster similarity, returning a score in
    /// `<0.0, 1.0>` for surfaces that pass.
    pub fn similarity_to(
        &self,
        other: &Self,
        depth_motion: f32,
    ) -> Option<f32> {
        if self.cluster != other.cluster {
            return None;
        }

        let depth_diff = self.depth_difference(other, depth_motion);
        let normal_dot = self.geo_normal.dot(other.geo_normal);

        // Written so that NaNs get rejected as well
        if !(depth_diff <= Self::MAX_DEPTH_DIFFERENCE)
            || !(normal_dot >= Self::MIN_NORMAL_DOT)
        {
            return None;
        }

        let score = (1.0 - (depth_diff / 0.1).clamp(0.0, 1.0))
            * normal_dot.clamp(0.0, 1.0);

        Some(score)
    }
}

/// One generation of per-pixel surfaces.
#[derive(Clone, Copy)]
pub struct SurfaceMap<'a> {
    items: &'a [Surface],
    size: UVec2,
}

impl<'a> SurfaceMap<'a> {
    pub fn new(items: &'a [Surface], size: UVec2) -> Self {
        Self { items, size }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn get(&self, screen_pos: IVec2) -> Option<Surface> {
        if screen_pos.x < 0
            || screen_pos.y < 0
            || screen_pos.x as u32 >= self.size.x
            || screen_pos.y as u32 >= self.size.y
        {
            return None;
        }

        let idx = screen_pos.y as usize * self.size.x as usize
            + screen_pos.x as usize;

        self.items.get(idx).copied()
    }
}
