use glam::{vec3, Vec3};

pub trait Vec3Ext
where
    Self: Sized,
{
    /// Returns luminance of this color-vector.
    fn luma(self) -> f32;

    /// Clamps this color-vector into `<0.0, max>` and zeroes it if it contains
    /// a NaN or an infinity.
    fn sanitize(self, max: f32) -> Self;
}

impl Vec3Ext for Vec3 {
    fn luma(self) -> f32 {
        self.dot(vec3(0.2126, 0.7152, 0.0722))
    }

    fn sanitize(self, max: f32) -> Self {
        if self.is_finite() {
            self.clamp(Vec3::ZERO, Vec3::splat(max))
        } else {
            Vec3::ZERO
        }
    }
}
