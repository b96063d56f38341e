use core::f32::consts::{FRAC_PI_4, PI};

use glam::{vec2, Vec2};

pub trait Vec2Ext
where
    Self: Sized,
{
    /// Maps a point from the unit square onto the unit disk, preserving
    /// stratification (Shirley-Chiu concentric mapping).
    fn to_disk(self) -> Self;

    /// Returns whether this is a valid, finite point inside `<0.0, 1.0)²`.
    fn is_unit_square(self) -> bool;
}

impl Vec2Ext for Vec2 {
    fn to_disk(self) -> Self {
        let offset = 2.0 * self - Vec2::ONE;

        if offset.x == 0.0 && offset.y == 0.0 {
            return Vec2::ZERO;
        }

        let (r, theta) = if offset.x.abs() > offset.y.abs() {
            (offset.x, FRAC_PI_4 * (offset.y / offset.x))
        } else {
            (offset.y, 0.5 * PI - FRAC_PI_4 * (offset.x / offset.y))
        };

        r * vec2(theta.cos(), theta.sin())
    }

    fn is_unit_square(self) -> bool {
        self.is_finite()
            && self.x >= 0.0
            && self.y >= 0.0
            && self.x < 1.0
            && self.y < 1.0
    }
}
