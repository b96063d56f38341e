use std::fmt::Debug;
use std::hash::Hash;
#[cfg(feature = "metrics")]
use std::time::Instant;

use derivative::Derivative;
use glam::{uvec2, UVec2, Vec3};
use glint_kernel::{
    DiPassParams, DiReservoirData, Frame, Hit, ShadowTracer, Surface,
    SurfaceMap,
};
use glint_passes::di::{self, DiBindings, DiOutput};
use log::{debug, info, warn};
use rand::Rng;
use rayon::prelude::*;

use crate::{
    DiConfig, DoubleBuffered, Error, FrameStats, LightList, Lights,
    ScreenBuffer,
};

/// Inputs of a single frame, one item per pixel in row-major order.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    pub hits: &'a [Hit],
    pub surfaces: &'a [Surface],

    /// Motion vectors (see [`glint_kernel::Reprojection::prev_pos()`]); can
    /// be left empty for a static camera and scene
    pub motion: &'a [Vec3],
}

/// Computes direct lighting of a viewport, frame after frame.
///
/// Keeps two generations of per-pixel history (surfaces and reservoirs):
/// each frame reads the generation written by the previous frame and
/// overwrites the other one.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Renderer {
    config: DiConfig,
    size: UVec2,
    frame: Frame,

    /// Whether the past generation of history has been written by the
    /// previous frame (as opposed to being freshly cleared)
    has_history: bool,

    /// Revision of static lights the history refers to
    lights_revision: Option<u32>,

    #[derivative(Debug = "ignore")]
    surfaces: DoubleBuffered<ScreenBuffer<Surface>>,

    #[derivative(Debug = "ignore")]
    reservoirs: DoubleBuffered<ScreenBuffer<DiReservoirData>>,

    #[derivative(Debug = "ignore")]
    output: ScreenBuffer<DiOutput>,

    stats: FrameStats,
}

impl Renderer {
    pub fn new(config: DiConfig, size: UVec2) -> Result<Self, Error> {
        if size.x == 0 || size.y == 0 {
            return Err(Error::EmptyViewport(size));
        }

        info!("Creating renderer: {}x{}", size.x, size.y);

        let mut this = Self {
            config: DiConfig::default(),
            size,
            frame: Frame::default(),
            has_history: false,
            lights_revision: None,
            surfaces: Default::default(),
            reservoirs: Default::default(),
            output: Default::default(),
            stats: Default::default(),
        };

        this.set_config(config);
        this.allocate_buffers();

        Ok(this)
    }

    pub fn config(&self) -> &DiConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DiConfig) {
        let sanitized = config.clone().sanitize();

        if sanitized != config {
            warn!(
                "Config contains out-of-range values; using {:?}",
                sanitized
            );
        }

        // Fields don't line up between layouts
        if sanitized.layout() != self.config.layout() {
            self.invalidate();
        }

        self.config = sanitized;
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Returns the frame that is going to be rendered next.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn resize(&mut self, size: UVec2) -> Result<(), Error> {
        if size == self.size {
            return Ok(());
        }

        if size.x == 0 || size.y == 0 {
            return Err(Error::EmptyViewport(size));
        }

        info!(
            "Resizing renderer: {}x{} -> {}x{}",
            self.size.x, self.size.y, size.x, size.y
        );

        self.size = size;
        self.allocate_buffers();

        Ok(())
    }

    /// Forgets all of the history, so that the next frame starts from
    /// scratch (e.g. after a camera cut).
    pub fn invalidate(&mut self) {
        debug!("Invalidating history");

        self.surfaces.for_each_mut(ScreenBuffer::clear);
        self.reservoirs.for_each_mut(ScreenBuffer::clear);
        self.has_history = false;
    }

    fn allocate_buffers(&mut self) {
        let size = self.size;

        debug!("Allocating buffers: {}x{}", size.x, size.y);

        self.surfaces = DoubleBuffered::from_fn(|| ScreenBuffer::new(size));
        self.reservoirs = DoubleBuffered::from_fn(|| ScreenBuffer::new(size));
        self.output = ScreenBuffer::new(size);
        self.has_history = false;
    }

    /// Renders a single frame.
    ///
    /// Pixels are processed in parallel; each of them traces at most
    /// `1 + spatial_neighbours` shadow rays through `tracer`.
    pub fn render<H, T>(
        &mut self,
        lights: &Lights<H>,
        light_list: &LightList,
        input: FrameInput,
        tracer: &T,
    ) -> Result<FrameStats, Error>
    where
        H: Debug + Eq + Hash,
        T: ShadowTracer + Sync,
    {
        #[cfg(feature = "metrics")]
        let tt = Instant::now();

        self.validate(&input)?;

        if self.lights_revision != Some(lights.revision()) {
            if self.has_history {
                debug!("Static lights have been renumbered");
                self.invalidate();
            }

            self.lights_revision = Some(lights.revision());
        }

        let alternate = self.frame.is_alternate();
        let params = self.params();
        let size = self.size;

        let (curr_surfaces, prev_surfaces) =
            self.surfaces.split_mut(alternate);

        curr_surfaces.as_mut_slice().copy_from_slice(input.surfaces);

        let (curr_reservoirs, prev_reservoirs) =
            self.reservoirs.split_mut(alternate);

        let bindings = DiBindings {
            lights: lights.view(),
            light_list: light_list.view(),
            hits: input.hits,
            motion: input.motion,
            curr_surfaces: SurfaceMap::new(curr_surfaces.as_slice(), size),
            prev_surfaces: SurfaceMap::new(prev_surfaces.as_slice(), size),
            prev_reservoirs: prev_reservoirs.as_slice(),
        };

        self.output
            .as_mut_slice()
            .par_iter_mut()
            .zip(curr_reservoirs.as_mut_slice().par_iter_mut())
            .enumerate()
            .for_each(|(idx, (output, reservoir))| {
                let idx = idx as u32;
                let screen_pos = uvec2(idx % size.x, idx / size.x);

                *output = di::main(screen_pos, &params, &bindings, tracer);
                *reservoir = output.reservoir;
            });

        let stats = self
            .output
            .as_slice()
            .par_iter()
            .map(FrameStats::from_output)
            .reduce(FrameStats::default, FrameStats::merge);

        debug!("Frame {} rendered: {}", self.frame.get(), stats);

        #[cfg(feature = "metrics")]
        debug!(
            "Frame {} took {}",
            self.frame.get(),
            humantime::format_duration(tt.elapsed())
        );

        self.frame = self.frame.next();
        self.has_history = true;
        self.stats = stats;

        Ok(stats)
    }

    fn validate(&self, input: &FrameInput) -> Result<(), Error> {
        let expected = ScreenBuffer::<Surface>::len_of(self.size);

        let check = |what, actual| {
            if actual == expected {
                Ok(())
            } else {
                Err(Error::InputSizeMismatch {
                    what,
                    expected,
                    actual,
                })
            }
        };

        check("hits", input.hits.len())?;
        check("surfaces", input.surfaces.len())?;

        if !input.motion.is_empty() {
            check("motion", input.motion.len())?;
        }

        Ok(())
    }

    fn params(&self) -> DiPassParams {
        let seed = self
            .config
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());

        let mut flags = self.config.flags();

        if !self.has_history {
            flags &=
                !(DiPassParams::FLAG_TEMPORAL | DiPassParams::FLAG_SPATIAL);
        }

        DiPassParams {
            seed,
            frame: self.frame.get(),
            curr_size: self.size,
            prev_size: self.size,
            candidates: self.config.candidates,
            spatial_neighbours: self.config.spatial_neighbours,
            m_clamp: self.config.m_clamp,
            max_w: self.config.max_w,
            flags,
        }
    }

    /// Returns outputs of the most recently rendered frame.
    pub fn output(&self) -> &[DiOutput] {
        self.output.as_slice()
    }

    /// Returns output of given pixel of the most recently rendered frame.
    pub fn pixel(&self, screen_pos: UVec2) -> Option<&DiOutput> {
        self.output.get(screen_pos)
    }

    /// Returns reservoirs stored by the most recently rendered frame.
    pub fn history(&self) -> &[DiReservoirData] {
        self.reservoirs.get(!self.frame.is_alternate()).as_slice()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        info!("Deleting renderer: {}x{}", self.size.x, self.size.y);
    }
}
