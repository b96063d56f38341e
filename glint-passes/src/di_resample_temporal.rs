use glint_kernel::prelude::*;

use crate::di::{DiBindings, DiPixel};

/// Merges reservoir of the reprojected pixel into `main`; returns whether
/// the reservoir has been merged at all (not whether it's been selected).
pub fn main(
    params: &DiPassParams,
    bindings: &DiBindings,
    pixel: &DiPixel,
    prev_pos: IVec2,
    wnoise: &mut WhiteNoise,
    main: &mut DiReservoir,
    mis: &mut DiMis,
) -> bool {
    let Some(prev_surface) = bindings.prev_surfaces.get(prev_pos) else {
        return false;
    };

    let prev_idx = prev_pos.y as usize * params.prev_size.x as usize
        + prev_pos.x as usize;

    let Some(prev) = DiReservoir::load_prev(
        bindings.prev_reservoirs,
        prev_idx,
        bindings.lights,
        bindings.light_list,
        pixel.cluster(),
        params.max_w,
    ) else {
        return false;
    };

    let Some(light) = prev.sample.light else {
        return false;
    };

    // Reused samples get re-evaluated at the current surface
    let p_hat = light.p_hat(
        bindings.lights,
        bindings.light_list,
        pixel.cluster(),
        &pixel.hit,
    );

    if !(p_hat > 0.0) {
        return false;
    }

    let m = prev.m.min(params.m_clamp());
    let weight = p_hat * prev.w * m as f32;

    let selected = main.merge(
        wnoise,
        DiSample {
            light: Some(light),
            p_hat,
        },
        weight,
        m,
    );

    mis.add_reused(
        DiSource::Temporal,
        p_hat,
        m,
        weight,
        prev_surface.geo_normal,
        selected,
    );

    true
}

#[cfg(test)]
mod tests {
    use super::main as resample;
    use super::*;
    use crate::di::tests::Scene;

    fn polygon(light_id: u32) -> LightSample {
        LightSample::Polygon {
            light_id: LightId::new(light_id),
            y_pos: vec2(0.5, 0.5),
        }
    }

    #[test]
    fn merges_valid_reservoir() {
        let mut scene = Scene::single_pixel().with_lights(3);

        scene.store_prev(0, Some(polygon(1)), 2.0, 20);

        let bindings = scene.bindings();
        let pixel = scene.pixel(&bindings);
        let mut wnoise = WhiteNoise::new(0, Frame::new(0), UVec2::ZERO);
        let mut main = DiReservoir::default();
        let mut mis = DiMis::default();

        let merged = resample(
            &scene.params(),
            &bindings,
            &pixel,
            IVec2::ZERO,
            &mut wnoise,
            &mut main,
            &mut mis,
        );

        assert!(merged);

        // M is clamped while merging
        assert_eq!(8, main.m);
        assert_eq!(8, mis.reused_m);
        assert_eq!(Some(polygon(1)), main.sample.light);
        assert_eq!(Some(DiSource::Temporal), mis.source);

        let p_hat = main.sample.p_hat;

        assert!(p_hat > 0.0);
        assert!((main.w - p_hat * 2.0 * 8.0).abs() < 1e-4 * main.w);
    }

    #[test]
    fn skips_lights_gone_from_cluster() {
        let mut scene = Scene::single_pixel().with_lights(3);

        scene.store_prev(0, Some(polygon(1)), 2.0, 4);
        scene.light_list = vec![0, 2];
        scene.light_offsets = vec![0, 2];

        let bindings = scene.bindings();
        let pixel = scene.pixel(&bindings);
        let mut wnoise = WhiteNoise::new(0, Frame::new(0), UVec2::ZERO);
        let mut main = DiReservoir::default();
        let mut mis = DiMis::default();

        let merged = resample(
            &scene.params(),
            &bindings,
            &pixel,
            IVec2::ZERO,
            &mut wnoise,
            &mut main,
            &mut mis,
        );

        assert!(!merged);
        assert_eq!(DiReservoir::default(), main);
        assert_eq!(DiMis::default(), mis);
    }

    #[test]
    fn skips_lights_below_horizon() {
        let mut scene = Scene::single_pixel().with_lights(3);

        scene.store_prev(0, Some(polygon(1)), 2.0, 4);
        scene.hits[0].gbuffer.normal = -Vec3::Y;
        scene.hits[0].gbuffer.geo_normal = -Vec3::Y;

        let bindings = scene.bindings();
        let pixel = scene.pixel(&bindings);
        let mut wnoise = WhiteNoise::new(0, Frame::new(0), UVec2::ZERO);
        let mut main = DiReservoir::default();
        let mut mis = DiMis::default();

        let merged = resample(
            &scene.params(),
            &bindings,
            &pixel,
            IVec2::ZERO,
            &mut wnoise,
            &mut main,
            &mut mis,
        );

        assert!(!merged);
    }
}
