use glint_kernel::prelude::*;

use crate::di::{DiBindings, DiPixel};

/// Draws unshadowed candidates at the current pixel and streams them into
/// `main`.
///
/// Every draw counts towards `M`, including the ones that didn't find any
/// light or whose light can't contribute here.
pub fn main(
    params: &DiPassParams,
    bindings: &DiBindings,
    pixel: &DiPixel,
    wnoise: &mut WhiteNoise,
    main: &mut DiReservoir,
    mis: &mut DiMis,
) {
    let candidates = params.candidates();
    let num_lights = bindings.lights.len();

    for _ in 0..candidates {
        let light_sel = wnoise.sample();
        let y_pos = wnoise.sample_vec2();

        let light = bindings
            .light_list
            .pick_uniform(pixel.cluster(), light_sel, num_lights)
            .map(|light_id| LightSample::Polygon { light_id, y_pos });

        let p_hat = light.map_or(0.0, |light| {
            light.p_hat(
                bindings.lights,
                bindings.light_list,
                pixel.cluster(),
                &pixel.hit,
            )
        });

        let selected = main.update(wnoise, DiSample { light, p_hat }, p_hat);

        mis.add_candidates(1, p_hat, selected);
    }

    // -------------------------------------------------------------------------

    if params.sun_candidate_enabled() {
        let light = LightSample::Sun {
            y_pos: wnoise.sample_vec2(),
        };

        let p_hat = light.p_hat(
            bindings.lights,
            bindings.light_list,
            pixel.cluster(),
            &pixel.hit,
        );

        // The sun shines in addition to polygon lights, not instead of them,
        // so it's weighted by the number of polygon draws and doesn't count
        // as a draw itself
        let weight = p_hat * candidates as f32;

        let selected = main.merge(
            wnoise,
            DiSample {
                light: Some(light),
                p_hat,
            },
            weight,
            0,
        );

        mis.add_candidates(0, weight, selected);
    }
}

#[cfg(test)]
mod tests {
    use super::main as main_fn;
    use super::*;
    use crate::di::tests::Scene;

    #[test]
    fn counts_every_draw() {
        let scene = Scene::single_pixel().with_lights(3);
        let bindings = scene.bindings();
        let pixel = scene.pixel(&bindings);

        let params = DiPassParams {
            candidates: 5,
            ..scene.params()
        };

        let mut wnoise = WhiteNoise::new(0, Frame::new(0), UVec2::ZERO);
        let mut main = DiReservoir::default();
        let mut mis = DiMis::default();

        main_fn(&params, &bindings, &pixel, &mut wnoise, &mut main, &mut mis);

        assert_eq!(5, main.m);
        assert_eq!(5, mis.m_current);
        assert!(main.w > 0.0);
        assert!(main.sample.p_hat > 0.0);
        assert_eq!(Some(DiSource::Candidates), mis.source);
    }

    #[test]
    fn empty_cluster_yields_empty_reservoir() {
        let scene = Scene::single_pixel().with_lights(0);
        let bindings = scene.bindings();
        let pixel = scene.pixel(&bindings);
        let mut wnoise = WhiteNoise::new(0, Frame::new(0), UVec2::ZERO);
        let mut main = DiReservoir::default();
        let mut mis = DiMis::default();

        main_fn(
            &scene.params(),
            &bindings,
            &pixel,
            &mut wnoise,
            &mut main,
            &mut mis,
        );

        assert_eq!(scene.params().candidates(), main.m);
        assert_eq!(0.0, main.w);
        assert_eq!(None, main.sample.light);
        assert_eq!(None, mis.source);
    }

    #[test]
    fn sun_candidate() {
        let scene = Scene::single_pixel().with_lights(0).with_sun();
        let bindings = scene.bindings();
        let pixel = scene.pixel(&bindings);

        let params = DiPassParams {
            candidates: 2,
            flags: DiPassParams::FLAG_SUN_CANDIDATE,
            ..scene.params()
        };

        let mut wnoise = WhiteNoise::new(0, Frame::new(0), UVec2::ZERO);
        let mut main = DiReservoir::default();
        let mut mis = DiMis::default();

        main_fn(&params, &bindings, &pixel, &mut wnoise, &mut main, &mut mis);

        // Two (failed) polygon draws; the sun doesn't count as a draw
        assert_eq!(2, main.m);
        assert!(matches!(main.sample.light, Some(LightSample::Sun { .. })));
        assert!((main.w - 2.0 * main.sample.p_hat).abs() < 1e-5);
    }
}
