use glint_kernel::prelude::*;

use crate::di::{DiBindings, DiPixel};

/// Finds the previous-frame pixel that saw the same surface as the current
/// one.
///
/// Reservoirs can't be interpolated, so instead of filtering the 2x2
/// footprint around the reprojected position we pick its single best match.
pub fn main(
    params: &DiPassParams,
    bindings: &DiBindings,
    pixel: &DiPixel,
) -> Option<IVec2> {
    let reprojection = params.reprojection();
    let prev_pos_ld = reprojection.prev_pos_ld(pixel.screen_pos, pixel.motion);
    let bary_threshold = reprojection.bary_threshold(pixel.motion);

    let mut best: Option<(IVec2, f32)> = None;

    for offset in Reprojection::FOOTPRINT {
        let prev_pos = prev_pos_ld + offset;

        if !reprojection.contains(pixel.screen_pos, prev_pos) {
            continue;
        }

        let Some(prev) = bindings.prev_surfaces.get(prev_pos) else {
            continue;
        };

        if prev.prim_id != pixel.surface.prim_id {
            continue;
        }

        if pixel.surface.bary.distance(prev.bary) > bary_threshold {
            continue;
        }

        let Some(score) = pixel.surface.similarity_to(&prev, pixel.motion.z)
        else {
            continue;
        };

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((prev_pos, score));
        }
    }

    best.map(|(prev_pos, _)| prev_pos)
}
