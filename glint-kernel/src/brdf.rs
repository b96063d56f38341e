use core::f32::consts::PI;

use glam::Vec3;

use crate::{F32Ext, GBufferEntry};

#[derive(Clone, Copy)]
pub struct DiffuseBrdf;

impl DiffuseBrdf {
    /// Evaluates demodulated Lambertian reflectance (i.e. without albedo),
    /// leaving out the energy already reflected specularly.
    pub fn eval(n_o_l: f32, fresnel: Vec3) -> Vec3 {
        (Vec3::ONE - fresnel) * (n_o_l.max(0.0) / PI)
    }
}

#[derive(Clone, Copy)]
pub struct SpecularBrdf<'a> {
    gbuffer: &'a GBufferEntry,
}

impl<'a> SpecularBrdf<'a> {
    pub fn new(gbuffer: &'a GBufferEntry) -> Self {
        Self { gbuffer }
    }

    /// Evaluates GGX reflectance multiplied by `n·l`, returning it together
    /// with the Fresnel term.
    ///
    /// `v` points from the surface towards the camera, `l` from the surface
    /// towards the light; `n_o_h_offset` widens the lobe for lights with a
    /// non-zero angular size.
    pub fn eval(self, v: Vec3, l: Vec3, n_o_h_offset: f32) -> (Vec3, Vec3) {
        let n = self.gbuffer.normal;
        let n_o_l = n.dot(l);

        if n_o_l <= 0.0 {
            return Default::default();
        }

        let h = (l + v).normalize_or_zero();
        let n_o_v = n.dot(v).max(0.0001);
        let n_o_h = (n.dot(h) + n_o_h_offset).saturate();
        let l_o_h = l.dot(h).saturate();
        let roughness = self.gbuffer.clamped_roughness();

        let d = d_ggx(roughness, n_o_h);
        let vis = v_smith_ggx_correlated(roughness, n_o_v, n_o_l);
        let f =
            fresnel(self.gbuffer.f0(), l_o_h) * self.gbuffer.specular_factor;

        (f * (d * vis * n_o_l), f)
    }
}

fn d_ggx(roughness: f32, n_o_h: f32) -> f32 {
    let one_minus_noh_squared = 1.0 - n_o_h * n_o_h;
    let a = n_o_h * roughness;
    let k = roughness / (one_minus_noh_squared + a * a);

    k * k * (1.0 / PI)
}

fn v_smith_ggx_correlated(roughness: f32, n_o_v: f32, n_o_l: f32) -> f32 {
    let a2 = roughness * roughness;
    let lambda_v = n_o_l * ((n_o_v - a2 * n_o_v) * n_o_v + a2).sqrt();
    let lambda_l = n_o_v * ((n_o_l - a2 * n_o_l) * n_o_l + a2).sqrt();

    0.5 / (lambda_v + lambda_l)
}

fn fresnel(f0: Vec3, l_o_h: f32) -> Vec3 {
    let f90 = f0.dot(Vec3::splat(50.0 * 0.33)).saturate();

    f0 + (f90 - f0) * (1.0 - l_o_h).max(0.001).powf(5.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    fn gbuffer() -> GBufferEntry {
        GBufferEntry {
            base_color: Vec3::ONE,
            normal: Vec3::Y,
            geo_normal: Vec3::Y,
            roughness: 0.5,
            reflectance: 0.5,
            specular_factor: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn diffuse() {
        let actual = DiffuseBrdf::eval(1.0, Vec3::splat(0.5));

        assert_relative_eq!(0.5 / PI, actual.x);
        assert_relative_eq!(0.5 / PI, actual.z);

        assert_eq!(Vec3::ZERO, DiffuseBrdf::eval(-0.5, Vec3::ZERO));
    }

    #[test]
    fn specular_below_horizon() {
        let gbuffer = gbuffer();
        let (spec, f) =
            SpecularBrdf::new(&gbuffer).eval(Vec3::Y, -Vec3::Y, 0.0);

        assert_eq!(Vec3::ZERO, spec);
        assert_eq!(Vec3::ZERO, f);
    }

    #[test]
    fn specular_peaks_at_mirror_direction() {
        let gbuffer = gbuffer();
        let brdf = SpecularBrdf::new(&gbuffer);
        let v = vec3(1.0, 1.0, 0.0).normalize();

        let (mirror, _) = brdf.eval(v, vec3(-1.0, 1.0, 0.0).normalize(), 0.0);
        let (off, _) = brdf.eval(v, vec3(-1.0, 0.3, 0.4).normalize(), 0.0);

        assert!(mirror.x > off.x, "mirror={mirror:?}, off={off:?}");
    }

    #[test]
    fn specular_factor_scales_everything() {
        let mut gbuffer = gbuffer();

        gbuffer.specular_factor = 0.0;

        let (spec, f) = SpecularBrdf::new(&gbuffer).eval(Vec3::Y, Vec3::Y, 0.0);

        assert_eq!(Vec3::ZERO, spec);
        assert_eq!(Vec3::ZERO, f);
    }
}
