use glint_kernel::prelude::*;

use crate::{
    di_reproject, di_resample_spatial, di_resample_temporal, di_resolve,
    di_sample,
};

/// Inputs shared by all pixels of a frame.
#[derive(Clone, Copy)]
pub struct DiBindings<'a> {
    pub lights: LightsView<'a>,
    pub light_list: LightListView<'a>,

    /// Current shading points, one per pixel
    pub hits: &'a [Hit],

    /// Motion vectors, one per pixel (see [`Reprojection::prev_pos()`])
    pub motion: &'a [Vec3],

    pub curr_surfaces: SurfaceMap<'a>,
    pub prev_surfaces: SurfaceMap<'a>,
    pub prev_reservoirs: &'a [DiReservoirData],
}

/// Everything we know about the pixel being shaded.
#[derive(Clone, Copy, Debug)]
pub struct DiPixel {
    pub screen_pos: UVec2,
    pub hit: Hit,
    pub surface: Surface,
    pub motion: Vec3,
}

impl DiPixel {
    /// Returns `None` if nothing has been hit at given pixel.
    pub fn load(
        screen_pos: UVec2,
        params: &DiPassParams,
        bindings: &DiBindings,
    ) -> Option<Self> {
        let surface = bindings.curr_surfaces.get(screen_pos.as_ivec2())?;

        if surface.is_none() {
            return None;
        }

        let idx = screen_pos.y as usize * params.curr_size.x as usize
            + screen_pos.x as usize;

        Some(Self {
            screen_pos,
            hit: *bindings.hits.get(idx)?,
            surface,
            motion: bindings.motion.get(idx).copied().unwrap_or_default(),
        })
    }

    pub fn cluster(&self) -> ClusterId {
        self.surface.cluster
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiOutput {
    pub diffuse: Vec3,
    pub specular: Vec3,

    /// Reservoir to persist for the next frame
    pub reservoir: DiReservoirData,

    pub debug: DiDebug,
}

/// Diagnostics of a single pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiDebug {
    pub w_sum: f32,
    pub w_selected: f32,

    /// Final resampling weight (`W`)
    pub w: f32,

    /// Total number of candidates combined, before clamping
    pub m: u32,

    pub kind: u32,
    pub light_id: Option<LightId>,
    pub source: Option<DiSource>,
    pub temporal_merged: bool,
    pub spatial_merged: u32,

    /// Whether the selected sample turned out to be in shadow
    pub occluded: bool,
}

pub fn main(
    screen_pos: UVec2,
    params: &DiPassParams,
    bindings: &DiBindings,
    tracer: &impl ShadowTracer,
) -> DiOutput {
    let Some(pixel) = DiPixel::load(screen_pos, params, bindings) else {
        return Default::default();
    };

    let mut wnoise = WhiteNoise::new(params.seed, params.frame(), screen_pos);
    let mut main = DiReservoir::default();
    let mut mis = DiMis::default();

    di_sample::main(params, bindings, &pixel, &mut wnoise, &mut main, &mut mis);

    // -------------------------------------------------------------------------

    let wants_reuse = (params.temporal_enabled() || params.spatial_enabled())
        && !pixel.hit.gbuffer.view_attached;

    let prev_pos = if wants_reuse {
        di_reproject::main(params, bindings, &pixel)
    } else {
        None
    };

    let mut temporal_merged = false;
    let mut spatial_merged = 0;

    if let Some(prev_pos) = prev_pos {
        if params.temporal_enabled() {
            temporal_merged = di_resample_temporal::main(
                params,
                bindings,
                &pixel,
                prev_pos,
                &mut wnoise,
                &mut main,
                &mut mis,
            );
        }

        if params.spatial_enabled() {
            spatial_merged = di_resample_spatial::main(
                params,
                bindings,
                &pixel,
                prev_pos,
                tracer,
                &mut wnoise,
                &mut main,
                &mut mis,
            );
        }
    }

    // -------------------------------------------------------------------------

    let w_sum = main.w;
    let m = main.m;
    let light = main.sample.light;
    let resolved =
        di_resolve::main(params, bindings, &pixel, tracer, main, &mis);

    DiOutput {
        diffuse: resolved.contribution.diffuse,
        specular: resolved.contribution.specular,
        reservoir: resolved.reservoir,
        debug: DiDebug {
            w_sum,
            w_selected: mis.selected_weight,
            w: resolved.w,
            m,
            kind: light.map_or(LightSample::KIND_NONE, |light| light.kind()),
            light_id: light.map(|light| light.light_id()),
            source: mis.source,
            temporal_merged,
            spatial_merged,
            occluded: resolved.occluded,
        },
    }
}
