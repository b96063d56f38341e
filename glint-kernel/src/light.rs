use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    DiffuseBrdf, Hit, LightListView, LightsView, SpecularBrdf, Vec2Ext,
    Vec3Ext, MAX_CONTRIBUTION_LUMA,
};

/// Triangular area light.
///
/// Emits towards the side its normal (counter-clockwise winding) points to.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PolygonLight {
    /// x - vertex #0 x
    /// y - vertex #0 y
    /// z - vertex #0 z
    /// w - light style scale
    pub d0: Vec4,

    /// xyz - vertex #1
    pub d1: Vec4,

    /// xyz - vertex #2
    pub d2: Vec4,

    /// xyz - color (radiance)
    pub d3: Vec4,
}

impl PolygonLight {
    pub fn new(positions: [Vec3; 3], color: Vec3) -> Self {
        Self {
            d0: positions[0].extend(1.0),
            d1: positions[1].extend(0.0),
            d2: positions[2].extend(0.0),
            d3: color.extend(0.0),
        }
    }

    pub fn with_style_scale(mut self, scale: f32) -> Self {
        self.d0.w = scale;
        self
    }

    pub fn positions(&self) -> [Vec3; 3] {
        [self.d0.xyz(), self.d1.xyz(), self.d2.xyz()]
    }

    pub fn color(&self) -> Vec3 {
        self.d3.xyz()
    }

    pub fn style_scale(&self) -> f32 {
        self.d0.w
    }

    fn cross(&self) -> Vec3 {
        let [p0, p1, p2] = self.positions();

        (p1 - p0).cross(p2 - p0)
    }

    pub fn normal(&self) -> Vec3 {
        self.cross().normalize_or_zero()
    }

    pub fn area(&self) -> f32 {
        0.5 * self.cross().length()
    }

    /// Re-derives the point on this light that's identified by `y_pos`,
    /// together with its solid-angle probability as seen from `position`.
    pub fn sample(&self, position: Vec3, y_pos: Vec2) -> LightPoint {
        let [p0, p1, p2] = self.positions();
        let su = y_pos.x.max(0.0).sqrt();
        let b0 = 1.0 - su;
        let b1 = y_pos.y * su;
        let point = p0 * b0 + p1 * b1 + p2 * (1.0 - b0 - b1);
        let normal = self.normal();

        let to_point = point - position;
        let distance_squared = to_point.length_squared();
        let cos_light = normal.dot(to_point).abs() / distance_squared.sqrt();
        let area = self.area();

        let pdf = if cos_light > 0.0 && area > 0.0 {
            distance_squared / (area * cos_light)
        } else {
            0.0
        };

        LightPoint {
            position: point,
            normal,
            pdf,
        }
    }
}

/// A directional light with a small angular size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sun {
    /// Direction towards the sun's center
    pub direction: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,

    /// Tangent of half of the sun's apparent angular diameter
    pub tan_half_angle: f32,

    pub color: Vec3,
    pub visible: bool,
    pub specular: bool,
}

impl Sun {
    /// How far we put the sun when tracing shadow rays towards it
    pub const DISTANCE: f32 = 10000.0;

    pub fn new(direction: Vec3, tan_half_angle: f32, color: Vec3) -> Self {
        let direction = direction.normalize_or_zero();
        let (tangent, bitangent) = direction.any_orthonormal_pair();

        Self {
            direction,
            tangent,
            bitangent,
            tan_half_angle,
            color,
            visible: true,
            specular: true,
        }
    }

    /// Returns direction towards the point on the sun's disk that's identified
    /// by `y_pos`.
    pub fn sample(&self, y_pos: Vec2) -> Vec3 {
        let disk = y_pos.to_disk() * self.tan_half_angle;

        (self.direction + self.tangent * disk.x + self.bitangent * disk.y)
            .normalize_or_zero()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LightId(u32);

impl LightId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Index of a light list; surfaces without one use [`ClusterId::NONE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClusterId(u32);

impl ClusterId {
    pub const NONE: Self = Self(u32::MAX);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl Default for ClusterId {
    fn default() -> Self {
        Self::NONE
    }
}

/// Point on a polygon light.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightPoint {
    pub position: Vec3,
    pub normal: Vec3,

    /// Probability density with respect to solid angle
    pub pdf: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightContribution {
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightContribution {
    pub fn sum(&self) -> Vec3 {
        self.diffuse + self.specular
    }

    pub fn sanitize(self, max: f32) -> Self {
        Self {
            diffuse: self.diffuse.sanitize(max),
            specular: self.specular.sanitize(max),
        }
    }
}

impl core::ops::Mul<f32> for LightContribution {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            diffuse: self.diffuse * rhs,
            specular: self.specular * rhs,
        }
    }
}

/// Identity of a single light sample; it's enough to deterministically
/// re-derive the point on the light that has been sampled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightSample {
    Polygon { light_id: LightId, y_pos: Vec2 },
    Sun { y_pos: Vec2 },
}

impl LightSample {
    pub const KIND_NONE: u32 = 0;
    pub const KIND_POLYGON: u32 = 1;
    pub const KIND_SUN: u32 = 2;

    pub fn kind(self) -> u32 {
        match self {
            LightSample::Polygon { .. } => Self::KIND_POLYGON,
            LightSample::Sun { .. } => Self::KIND_SUN,
        }
    }

    /// Returns the polygon light's id; the sun always reports zero.
    pub fn light_id(self) -> LightId {
        match self {
            LightSample::Polygon { light_id, .. } => light_id,
            LightSample::Sun { .. } => LightId::new(0),
        }
    }

    pub fn y_pos(self) -> Vec2 {
        match self {
            LightSample::Polygon { y_pos, .. } | LightSample::Sun { y_pos } => {
                y_pos
            }
        }
    }

    /// Evaluates unshadowed incoming radiance of this sample at given hit
    /// point, already divided by the probability of having drawn it.
    ///
    /// Returns `None` if the sample can't contribute to this surface (e.g. it
    /// lies below the horizon or its light is not in the cluster's list).
    pub fn eval(
        self,
        lights: LightsView,
        light_list: LightListView,
        cluster: ClusterId,
        hit: &Hit,
    ) -> Option<LightEval> {
        match self {
            LightSample::Polygon { light_id, y_pos } => {
                Self::eval_polygon(
                    lights, light_list, cluster, hit, light_id, y_pos,
                )
            }

            LightSample::Sun { y_pos } => {
                Self::eval_sun(lights, light_list, cluster, hit, y_pos)
            }
        }
    }

    fn eval_polygon(
        lights: LightsView,
        light_list: LightListView,
        cluster: ClusterId,
        hit: &Hit,
        light_id: LightId,
        y_pos: Vec2,
    ) -> Option<LightEval> {
        let light = lights.get(light_id)?;
        let light_count = light_list.len(cluster);

        if light_count == 0 || !light_list.contains(cluster, light_id) {
            return None;
        }

        let point = light.sample(hit.point, y_pos);
        let dir = (point.position - hit.point).normalize_or_zero();

        if dir.dot(hit.gbuffer.geo_normal) <= 0.0 || point.pdf <= 0.0 {
            return None;
        }

        let spotlight = (-point.normal.dot(dir)).max(0.0).sqrt();

        let radiance = light.color()
            * (spotlight * light.style_scale() / point.pdf)
            * (light_count as f32);

        if !radiance.is_finite() || radiance.luma() > MAX_CONTRIBUTION_LUMA {
            return None;
        }

        Some(LightEval {
            target: point.position,
            dir,
            specular_dir: dir,
            radiance,
            n_o_h_offset: 0.0,
            has_specular: true,
        })
    }

    fn eval_sun(
        lights: LightsView,
        light_list: LightListView,
        cluster: ClusterId,
        hit: &Hit,
        y_pos: Vec2,
    ) -> Option<LightEval> {
        let sun = lights.sun();

        if !sun.visible || !light_list.is_sky_visible(cluster) {
            return None;
        }

        let dir = sun.sample(y_pos);

        if dir.dot(hit.gbuffer.normal) <= 0.0
            || dir.dot(hit.gbuffer.geo_normal) <= 0.0
        {
            return None;
        }

        Some(LightEval {
            target: hit.point + dir * Sun::DISTANCE,
            dir,
            specular_dir: sun.direction,
            radiance: sun.color,
            n_o_h_offset: 0.5 * sun.tan_half_angle * sun.tan_half_angle,
            has_specular: sun.specular,
        })
    }

    /// Returns the target function of this sample at given hit point, i.e.
    /// luminance of its unshadowed contribution; zero if it can't contribute.
    pub fn p_hat(
        self,
        lights: LightsView,
        light_list: LightListView,
        cluster: ClusterId,
        hit: &Hit,
    ) -> f32 {
        self.eval(lights, light_list, cluster, hit)
            .map_or(0.0, |eval| eval.p_hat(hit))
    }
}

/// Unshadowed light sample, evaluated at a particular hit point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightEval {
    /// Point the shadow ray should be traced towards
    pub target: Vec3,

    /// Direction from the hit point towards the light
    pub dir: Vec3,

    /// Direction used for the specular lobe
    pub specular_dir: Vec3,

    pub radiance: Vec3,
    pub n_o_h_offset: f32,
    pub has_specular: bool,
}

impl LightEval {
    pub fn shade(&self, hit: &Hit) -> LightContribution {
        let n_o_l = hit.gbuffer.normal.dot(self.dir);

        if n_o_l <= 0.0 {
            return Default::default();
        }

        let (specular, fresnel) = if self.has_specular {
            SpecularBrdf::new(&hit.gbuffer).eval(
                -hit.dir,
                self.specular_dir,
                self.n_o_h_offset,
            )
        } else {
            Default::default()
        };

        LightContribution {
            diffuse: self.radiance * DiffuseBrdf::eval(n_o_l, fresnel),
            specular: self.radiance * specular,
        }
    }

    pub fn p_hat(&self, hit: &Hit) -> f32 {
        self.shade(hit).sum().abs().luma().max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec2, vec3};

    use super::*;

    #[test]
    fn polygon_sample_stays_on_triangle() {
        let light = PolygonLight::new(
            [
                vec3(0.0, 2.0, 0.0),
                vec3(0.0, 2.0, 1.0),
                vec3(1.0, 2.0, 0.0),
            ],
            Vec3::ONE,
        );

        for x in 0..8 {
            for y in 0..8 {
                let y_pos = vec2(x as f32 / 8.0, y as f32 / 8.0);
                let point = light.sample(Vec3::ZERO, y_pos);

                assert_relative_eq!(2.0, point.position.y);
                assert!(point.position.x >= -1e-6 && point.position.z >= -1e-6);
                assert!(point.position.x + point.position.z <= 1.0 + 1e-5);
            }
        }
    }

    #[test]
    fn polygon_pdf() {
        let light = PolygonLight::new(
            [
                vec3(-1.0, 2.0, -1.0),
                vec3(1.0, 2.0, -1.0),
                vec3(-1.0, 2.0, 1.0),
            ],
            Vec3::ONE,
        );

        // Sampling the triangle's centroid from straight below:
        // pdf = distance² / (area * cos)
        let point = light.sample(
            vec3(-1.0 / 3.0, 0.0, -1.0 / 3.0),
            vec2(4.0 / 9.0, 0.5),
        );

        assert_relative_eq!(-1.0, point.normal.y);
        assert_relative_eq!(2.0, light.area());
        assert_relative_eq!(2.0, point.pdf, epsilon = 1e-4);
    }

    #[test]
    fn sun_sample_stays_within_disk() {
        let sun = Sun::new(vec3(0.3, 1.0, 0.2), 0.01, Vec3::ONE);

        for x in 0..8 {
            for y in 0..8 {
                let dir = sun.sample(vec2(x as f32 / 8.0, y as f32 / 8.0));

                assert_relative_eq!(1.0, dir.length(), epsilon = 1e-5);
                let min_cos = (0.01f32).atan().cos() - 1e-5;

                assert!(dir.dot(sun.direction) >= min_cos);
            }
        }
    }

    #[test]
    fn cluster_id_defaults_to_none() {
        assert!(ClusterId::default().is_none());
        assert!(!ClusterId::new(0).is_none());
    }
}
