mod f32_ext;
mod vec2_ext;
mod vec3_ext;

pub use self::f32_ext::*;
pub use self::vec2_ext::*;
pub use self::vec3_ext::*;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
