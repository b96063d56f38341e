use std::fmt::Debug;
use std::hash::Hash;

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::Vec3;
use glint_kernel::{LightId, LightListView, LightsView, PolygonLight, Sun};
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    /// Light that keeps its id across frames, so reservoirs pointing at it
    /// can be reused
    Static,

    /// Light whose id may change from one frame to another; it's sampled like
    /// any other light, but never reused
    Dynamic,
}

/// Triangular area light.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    /// Vertices, in counter-clockwise order as seen from the emitting side
    pub positions: [Vec3; 3],
    pub color: Vec3,

    /// Multiplier of `color`, e.g. to make the light flicker
    pub style_scale: f32,

    pub kind: LightKind,
}

impl Light {
    pub fn new(positions: [Vec3; 3], color: Vec3, kind: LightKind) -> Self {
        Self {
            positions,
            color,
            style_scale: 1.0,
            kind,
        }
    }

    pub(crate) fn serialize(&self) -> PolygonLight {
        PolygonLight::new(self.positions, self.color)
            .with_style_scale(self.style_scale)
    }
}

/// Registry of scene lights, addressed by user-provided handles.
///
/// Static lights always come first, so adding or removing dynamic lights
/// doesn't affect ids of the static ones; removing a static light shifts ids
/// of the static lights after it, which bumps [`Self::revision()`].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Lights<H>
where
    H: Eq + Hash,
{
    #[derivative(Debug = "ignore")]
    buffer: Vec<PolygonLight>,
    index: FxHashMap<H, LightId>,
    num_static: u32,
    sun: Sun,
    revision: u32,
}

impl<H> Lights<H>
where
    H: Debug + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            buffer: Default::default(),
            index: Default::default(),
            num_static: 0,
            sun: Default::default(),
            revision: 0,
        }
    }

    /// Adds a light or updates an existing one.
    pub fn add(&mut self, handle: H, light: Light) {
        let polygon = light.serialize();

        if let Some(&light_id) = self.index.get(&handle) {
            let is_static = light_id.get() < self.num_static;

            if is_static == (light.kind == LightKind::Static) {
                self.buffer[light_id.get() as usize] = polygon;
                return;
            }

            debug!("Light {:?} changed its kind to {:?}", handle, light.kind);

            self.remove(&handle);
        }

        let light_id = match light.kind {
            LightKind::Static => {
                let light_id = self.num_static;

                self.shift_ids(light_id, 1);
                self.buffer.insert(light_id as usize, polygon);
                self.num_static += 1;

                LightId::new(light_id)
            }

            LightKind::Dynamic => {
                self.buffer.push(polygon);

                LightId::new(self.buffer.len() as u32 - 1)
            }
        };

        self.index.insert(handle, light_id);
    }

    pub fn remove(&mut self, handle: &H) {
        let Some(light_id) = self.index.remove(handle) else {
            return;
        };

        self.buffer.remove(light_id.get() as usize);

        if light_id.get() < self.num_static {
            self.num_static -= 1;
            self.revision = self.revision.wrapping_add(1);
        }

        self.shift_ids(light_id.get() + 1, -1);
    }

    /// Moves ids of all lights at or after `from` by `delta`.
    fn shift_ids(&mut self, from: u32, delta: i32) {
        for light_id in self.index.values_mut() {
            if light_id.get() >= from {
                *light_id =
                    LightId::new(light_id.get().wrapping_add_signed(delta));
            }
        }
    }

    pub fn update_sun(&mut self, sun: Sun) {
        self.sun = sun;
    }

    pub fn id(&self, handle: &H) -> Option<LightId> {
        self.index.get(handle).copied()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn num_static(&self) -> u32 {
        self.num_static
    }

    /// Returns a number that changes whenever ids of static lights change,
    /// i.e. whenever history referring to them becomes stale.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn view(&self) -> LightsView<'_> {
        LightsView::new(&self.buffer, self.num_static, self.sun)
    }
}

impl<H> Default for Lights<H>
where
    H: Debug + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Lights potentially visible from a single cluster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cluster {
    pub lights: Vec<LightId>,
    pub sky_visible: bool,
}

/// Per-cluster light lists, flattened into a single buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightList {
    offsets: Vec<u32>,
    lights: Vec<u32>,
    sky_visibility: Vec<u32>,
}

impl LightList {
    /// Builds the lists; cluster ids are positions within `clusters`.
    pub fn from_clusters<'a>(
        clusters: impl IntoIterator<Item = &'a Cluster>,
    ) -> Self {
        let mut offsets = vec![0];
        let mut lights = Vec::new();
        let mut sky_visibility = Vec::new();

        for (idx, cluster) in clusters.into_iter().enumerate() {
            lights.extend(cluster.lights.iter().map(|light| light.get()));
            offsets.push(lights.len() as u32);

            let word = idx / 32;

            if sky_visibility.len() <= word {
                sky_visibility.push(0);
            }

            if cluster.sky_visible {
                sky_visibility[word] |= 1 << (idx % 32);
            }
        }

        Self {
            offsets,
            lights,
            sky_visibility,
        }
    }

    /// Returns the number of clusters.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn view(&self) -> LightListView<'_> {
        LightListView::new(&self.offsets, &self.lights, &self.sky_visibility)
    }
}

impl Default for LightList {
    fn default() -> Self {
        Self::from_clusters([])
    }
}
