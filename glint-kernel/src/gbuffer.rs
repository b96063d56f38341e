use glam::Vec3;

/// Material inputs of a single pixel, as produced by the geometry pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GBufferEntry {
    pub base_color: Vec3,
    pub normal: Vec3,
    pub geo_normal: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub reflectance: f32,
    pub specular_factor: f32,

    /// Whether this surface moves together with the camera (e.g. a weapon
    /// model); such surfaces have no usable motion vectors and never reuse
    /// history.
    pub view_attached: bool,
}

impl GBufferEntry {
    pub fn clamped_roughness(&self) -> f32 {
        self.roughness.clamp(0.089 * 0.089, 1.0)
    }

    /// Returns reflectance at normal incidence.
    pub fn f0(&self) -> Vec3 {
        0.16 * self.reflectance * self.reflectance * (1.0 - self.metallic)
            + self.base_color * self.metallic
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hit {
    /// Hit point, in world-coordinates
    pub point: Vec3,

    /// Direction from the camera towards the hit point
    pub dir: Vec3,

    pub gbuffer: GBufferEntry,
}

impl Hit {
    /// How far to move a hit point back towards the camera to avoid
    /// self-intersection when casting shadow rays
    pub const NUDGE_OFFSET: f32 = 0.01;

    pub fn new(point: Vec3, dir: Vec3, gbuffer: GBufferEntry) -> Self {
        Self {
            point,
            dir,
            gbuffer,
        }
    }

    pub fn shadow_origin(&self) -> Vec3 {
        self.point - self.dir * Self::NUDGE_OFFSET
    }
}
