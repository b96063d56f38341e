use core::ops::Range;

use crate::{ClusterId, LightId, PolygonLight, Sun};

/// Read-only view over the lights of the current frame.
#[derive(Clone, Copy)]
pub struct LightsView<'a> {
    polygons: &'a [PolygonLight],
    num_static: u32,
    sun: Sun,
}

impl<'a> LightsView<'a> {
    /// Creates a view; the first `num_static` polygon lights are the ones
    /// whose ids remain stable across frames.
    pub fn new(
        polygons: &'a [PolygonLight],
        num_static: u32,
        sun: Sun,
    ) -> Self {
        Self {
            polygons,
            num_static,
            sun,
        }
    }

    pub fn get(&self, id: LightId) -> Option<PolygonLight> {
        self.polygons.get(id.get() as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns whether this light keeps its id across frames, i.e. whether a
    /// reservoir from the previous frame may keep referring to it.
    pub fn is_static(&self, id: LightId) -> bool {
        id.get() < self.num_static && (id.get() as usize) < self.len()
    }

    pub fn sun(&self) -> Sun {
        self.sun
    }
}

/// Read-only view over the per-cluster light lists.
///
/// Lights of cluster `c` are `lights[offsets[c]..offsets[c + 1]]`; the same
/// light may appear in many clusters.
#[derive(Clone, Copy)]
pub struct LightListView<'a> {
    offsets: &'a [u32],
    lights: &'a [u32],
    sky_visibility: &'a [u32],
}

impl<'a> LightListView<'a> {
    /// How many times we try to find a valid light within a list before
    /// giving up
    pub const PICK_RETRIES: usize = 4;

    pub fn new(
        offsets: &'a [u32],
        lights: &'a [u32],
        sky_visibility: &'a [u32],
    ) -> Self {
        Self {
            offsets,
            lights,
            sky_visibility,
        }
    }

    fn range(&self, cluster: ClusterId) -> Option<Range<usize>> {
        if cluster.is_none() {
            return None;
        }

        let idx = cluster.get() as usize;
        let start = *self.offsets.get(idx)? as usize;
        let end = *self.offsets.get(idx + 1)? as usize;

        if start <= end && end <= self.lights.len() {
            Some(start..end)
        } else {
            None
        }
    }

    fn items(&self, cluster: ClusterId) -> &'a [u32] {
        match self.range(cluster) {
            Some(range) => &self.lights[range],
            None => &[],
        }
    }

    /// Returns the number of lights potentially visible from given cluster.
    pub fn len(&self, cluster: ClusterId) -> usize {
        self.items(cluster).len()
    }

    pub fn contains(&self, cluster: ClusterId, light: LightId) -> bool {
        self.items(cluster).contains(&light.get())
    }

    /// Picks a light from cluster's list, uniformly, using `r` in
    /// `<0.0, 1.0)`; entries pointing past `num_lights` are skipped (up to
    /// [`Self::PICK_RETRIES`] times).
    pub fn pick_uniform(
        &self,
        cluster: ClusterId,
        r: f32,
        num_lights: usize,
    ) -> Option<LightId> {
        let items = self.items(cluster);

        if items.is_empty() {
            return None;
        }

        let count = items.len();
        let base = ((r * count as f32) as usize).min(count - 1);

        (0..Self::PICK_RETRIES)
            .map(|t| items[(base + t) % count])
            .find(|&id| (id as usize) < num_lights)
            .map(LightId::new)
    }

    /// Returns whether the sky (and so the sun) can be seen from given
    /// cluster; surfaces outside of any cluster are assumed to see it.
    pub fn is_sky_visible(&self, cluster: ClusterId) -> bool {
        if cluster.is_none() {
            return true;
        }

        let idx = cluster.get();

        self.sky_visibility
            .get((idx >> 5) as usize)
            .map_or(false, |bits| bits & (1 << (idx & 31)) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFSETS: [u32; 4] = [0, 3, 3, 5];
    const LIGHTS: [u32; 5] = [4, 1, 7, 1, 2];

    fn target() -> LightListView<'static> {
        LightListView::new(&OFFSETS, &LIGHTS, &[0b101])
    }

    #[test]
    fn len_and_contains() {
        let target = target();

        assert_eq!(3, target.len(ClusterId::new(0)));
        assert_eq!(0, target.len(ClusterId::new(1)));
        assert_eq!(2, target.len(ClusterId::new(2)));
        assert_eq!(0, target.len(ClusterId::new(3)));
        assert_eq!(0, target.len(ClusterId::NONE));

        assert!(target.contains(ClusterId::new(0), LightId::new(7)));
        assert!(!target.contains(ClusterId::new(0), LightId::new(2)));
        assert!(target.contains(ClusterId::new(2), LightId::new(1)));
        assert!(!target.contains(ClusterId::NONE, LightId::new(1)));
    }

    #[test]
    fn pick_uniform() {
        let target = target();
        let c0 = ClusterId::new(0);

        assert_eq!(Some(LightId::new(4)), target.pick_uniform(c0, 0.0, 8));
        assert_eq!(Some(LightId::new(1)), target.pick_uniform(c0, 0.5, 8));
        assert_eq!(Some(LightId::new(7)), target.pick_uniform(c0, 0.99, 8));

        // Light #7 doesn't exist, so we retry with the next entry (wrapping)
        assert_eq!(Some(LightId::new(4)), target.pick_uniform(c0, 0.99, 5));

        // Nothing valid at all
        assert_eq!(None, target.pick_uniform(c0, 0.5, 1));
        assert_eq!(None, target.pick_uniform(ClusterId::new(1), 0.5, 8));
    }

    #[test]
    fn sky_visibility() {
        let target = target();

        assert!(target.is_sky_visible(ClusterId::new(0)));
        assert!(!target.is_sky_visible(ClusterId::new(1)));
        assert!(target.is_sky_visible(ClusterId::new(2)));
        assert!(!target.is_sky_visible(ClusterId::new(40)));
        assert!(target.is_sky_visible(ClusterId::NONE));
    }
}
