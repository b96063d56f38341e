use glint_kernel::prelude::*;

use crate::di::{DiBindings, DiPixel};

/// Merges reservoirs of previous-frame pixels surrounding `prev_pos` into
/// `main`; returns how many of them have been merged.
///
/// Unlike temporal reuse, neighbours don't have to lie on the same primitive,
/// but each merged sample must be visible from the current surface.
#[allow(clippy::too_many_arguments)]
pub fn main(
    params: &DiPassParams,
    bindings: &DiBindings,
    pixel: &DiPixel,
    prev_pos: IVec2,
    tracer: &impl ShadowTracer,
    wnoise: &mut WhiteNoise,
    main: &mut DiReservoir,
    mis: &mut DiMis,
) -> u32 {
    let neighbours = params.spatial_neighbours();

    if neighbours == 0 {
        return 0;
    }

    let reprojection = params.reprojection();
    let rot = ((wnoise.sample() * 8.0) as usize) & 7;
    let mut merged = 0;

    for nth in 0..(neighbours as usize) {
        let [dx, dy] = SPATIAL_KERNEL[(nth + rot) & 7];
        let nb_pos = prev_pos + ivec2(dx, dy);

        if !reprojection.contains(pixel.screen_pos, nb_pos) {
            continue;
        }

        let Some(nb_surface) = bindings.prev_surfaces.get(nb_pos) else {
            continue;
        };

        if nb_surface.is_none()
            || pixel.surface.similarity_to(&nb_surface, 0.0).is_none()
        {
            continue;
        }

        let nb_idx =
            nb_pos.y as usize * params.prev_size.x as usize + nb_pos.x as usize;

        let Some(nb) = DiReservoir::load_prev(
            bindings.prev_reservoirs,
            nb_idx,
            bindings.lights,
            bindings.light_list,
            pixel.cluster(),
            params.max_w,
        ) else {
            continue;
        };

        let Some(light) = nb.sample.light else {
            continue;
        };

        let Some(eval) = light.eval(
            bindings.lights,
            bindings.light_list,
            pixel.cluster(),
            &pixel.hit,
        ) else {
            continue;
        };

        let p_hat = eval.p_hat(&pixel.hit);

        if !(p_hat >= MIN_SPATIAL_P_HAT) {
            continue;
        }

        let is_occluded = ShadowRay {
            origin: pixel.hit.shadow_origin(),
            target: eval.target,
        }
        .trace(tracer);

        if is_occluded {
            continue;
        }

        let m = nb.m.min(params.m_clamp());
        let weight = p_hat * nb.w * m as f32;

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
            DiSource::Spatial,
            p_hat,
            m,
            weight,
            nb_surface.geo_normal,
            selected,
        );

        merged += 1;
    }

    merged
}
