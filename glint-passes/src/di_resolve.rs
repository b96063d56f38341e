use glint_kernel::prelude::*;

use crate::di::{DiBindings, DiPixel};

/// Final radiance of a pixel, together with the reservoir that should be
/// carried over into the next frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiResolved {
    pub contribution: LightContribution,

    /// Empty if the pixel didn't end up with any contribution
    pub reservoir: DiReservoirData,

    /// Final resampling weight (`W`), zero if nothing's been selected
    pub w: f32,

    pub occluded: bool,
}

/// Normalizes the combined reservoir, traces its shadow ray and shades it.
///
/// Traces at most one ray: when the selected sample has been reused, the ray
/// that checks whether it would've been visible from its source surface is
/// the same ray as the final one (it starts at the current surface).
pub fn main(
    params: &DiPassParams,
    bindings: &DiBindings,
    pixel: &DiPixel,
    tracer: &impl ShadowTracer,
    mut main: DiReservoir,
    mis: &DiMis,
) -> DiResolved {
    if main.m == 0 || !(main.w > 0.0) || !(main.sample.p_hat > 0.0) {
        return Default::default();
    }

    let Some(light) = main.sample.light else {
        return Default::default();
    };

    let Some(eval) = light.eval(
        bindings.lights,
        bindings.light_list,
        pixel.cluster(),
        &pixel.hit,
    ) else {
        return Default::default();
    };

    let ray = ShadowRay {
        origin: pixel.hit.shadow_origin(),
        target: eval.target,
    };

    let mut visibility = None;

    let source_visible = if mis.is_reused() {
        if mis.source_geo_normal.dot(eval.dir) > 0.0 {
            let is_occluded = ray.trace(tracer);

            visibility = Some(is_occluded);
            !is_occluded
        } else {
            false
        }
    } else {
        true
    };

    mis.normalize(&mut main, source_visible);
    main.clamp_w(params.max_w);

    let w = main.w;

    if !(w > 0.0) {
        return DiResolved {
            w: 0.0,
            occluded: visibility.unwrap_or(false),
            ..Default::default()
        };
    }

    let occluded = visibility.unwrap_or_else(|| ray.trace(tracer));

    if occluded {
        return DiResolved {
            w,
            occluded,
            ..Default::default()
        };
    }

    let contribution = (eval.shade(&pixel.hit) * w).sanitize(MAX_OUTPUT_VALUE);

    if !(contribution.sum().luma() > 0.0) {
        return DiResolved {
            contribution,
            w,
            ..Default::default()
        };
    }

    main.clamp_m(params.m_clamp());

    DiResolved {
        contribution,
        reservoir: DiReservoirData::pack(main),
        w,
        occluded,
    }
}
