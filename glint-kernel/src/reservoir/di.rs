use core::ops::{Deref, DerefMut};

use bytemuck::{Pod, Zeroable};
use glam::{vec2, Vec2};
use half::f16;

use crate::{
    ClusterId, LightId, LightListView, LightSample, LightsView, Reservoir,
    Vec2Ext,
};

/// Reservoir used for direct lighting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiReservoir {
    pub reservoir: Reservoir<DiSample>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiSample {
    pub light: Option<LightSample>,

    /// Target function of this sample at the current surface; not persisted,
    /// since it has to be re-evaluated wherever the sample gets reused
    pub p_hat: f32,
}

/// Packed form of [`DiReservoir`], as kept in history buffers.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DiReservoirData {
    /// Light kind (low 2 bits) and light id (the rest)
    pub id: u32,

    /// x - `W` and `M` as two halves (`W` in low bits)
    /// y - `y_pos` as two halves (`y_pos.x` in low bits)
    pub res: [u32; 2],
}

impl DiReservoir {
    /// Largest half-precision value below one; `y_pos` must stay inside
    /// `<0.0, 1.0)` after packing.
    const MAX_PACKED_Y_POS: f32 = 1.0 - 1.0 / 2048.0;

    /// Largest finite half-precision value; `W` above it would be stored as
    /// infinity.
    pub const MAX_PACKED_W: f32 = 65504.0;

    /// Largest `M` that half precision stores exactly.
    pub const MAX_PACKED_M: u32 = 2048;

    pub fn read(buffer: &[DiReservoirData], id: usize) -> Self {
        buffer.get(id).copied().unwrap_or_default().unpack()
    }

    pub fn write(self, buffer: &mut [DiReservoirData], id: usize) {
        if let Some(slot) = buffer.get_mut(id) {
            *slot = DiReservoirData::pack(self);
        }
    }

    /// Loads reservoir from the previous frame, rejecting it if it can't be
    /// safely reused at a surface belonging to given cluster.
    ///
    /// Loaded `W` is capped at `max_w` (if positive).
    pub fn load_prev(
        buffer: &[DiReservoirData],
        id: usize,
        lights: LightsView,
        light_list: LightListView,
        cluster: ClusterId,
        max_w: f32,
    ) -> Option<Self> {
        let data = *buffer.get(id)?;
        let (kind, light_id) = unpack_id(data.id);
        let (w, m): (f32, f32) = unpack_half2x16(data.res[0]).into();
        let y_pos = unpack_half2x16(data.res[1]);

        match kind {
            LightSample::KIND_POLYGON => {
                // Only static lights keep their ids across frames
                if !lights.is_static(light_id)
                    || !light_list.contains(cluster, light_id)
                {
                    return None;
                }
            }

            LightSample::KIND_SUN => {}

            _ => {
                return None;
            }
        }

        // Written so that NaNs get rejected as well
        if !(w > 0.0) || !w.is_finite() || !(m >= 0.5) || !m.is_finite() {
            return None;
        }

        if !y_pos.is_unit_square() {
            return None;
        }

        let mut this = data.unpack();

        this.clamp_w(max_w);

        Some(this)
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0 || !(self.w > 0.0) || self.sample.light.is_none()
    }
}

impl Deref for DiReservoir {
    type Target = Reservoir<DiSample>;

    fn deref(&self) -> &Self::Target {
        &self.reservoir
    }
}

impl DerefMut for DiReservoir {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reservoir
    }
}

impl DiReservoirData {
    pub fn pack(reservoir: DiReservoir) -> Self {
        let Some(light) = reservoir.sample.light else {
            return Self::default();
        };

        let y_pos = light
            .y_pos()
            .clamp(Vec2::ZERO, Vec2::splat(DiReservoir::MAX_PACKED_Y_POS));

        // Written so that NaNs end up as zero
        let w = if reservoir.w > 0.0 {
            reservoir.w.min(DiReservoir::MAX_PACKED_W)
        } else {
            0.0
        };

        let m = reservoir.m.min(DiReservoir::MAX_PACKED_M);

        Self {
            id: pack_id(light.kind(), light.light_id()),
            res: [pack_half2x16(vec2(w, m as f32)), pack_half2x16(y_pos)],
        }
    }

    pub fn unpack(self) -> DiReservoir {
        let (kind, light_id) = unpack_id(self.id);
        let wm = unpack_half2x16(self.res[0]);
        let y_pos = unpack_half2x16(self.res[1]);

        let light = match kind {
            LightSample::KIND_POLYGON => {
                Some(LightSample::Polygon { light_id, y_pos })
            }
            LightSample::KIND_SUN => Some(LightSample::Sun { y_pos }),
            _ => None,
        };

        DiReservoir {
            reservoir: Reservoir {
                sample: DiSample { light, p_hat: 0.0 },
                m: (wm.y + 0.5).max(0.0) as u32,
                w: wm.x,
            },
        }
    }
}

pub fn pack_id(kind: u32, light_id: LightId) -> u32 {
    (kind & 0x3) | (light_id.get() << 2)
}

pub fn unpack_id(packed: u32) -> (u32, LightId) {
    (packed & 0x3, LightId::new(packed >> 2))
}

/// Packs two floats as IEEE half-precision numbers, `x` in low bits.
pub fn pack_half2x16(value: Vec2) -> u32 {
    let x = f16::from_f32(value.x).to_bits() as u32;
    let y = f16::from_f32(value.y).to_bits() as u32;

    x | (y << 16)
}

pub fn unpack_half2x16(packed: u32) -> Vec2 {
    let x = f16::from_bits((packed & 0xffff) as u16).to_f32();
    let y = f16::from_bits((packed >> 16) as u16).to_f32();

    vec2(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(light_id: u32, y_pos: Vec2) -> Option<LightSample> {
        Some(LightSample::Polygon {
            light_id: LightId::new(light_id),
            y_pos,
        })
    }

    fn reservoir(light: Option<LightSample>, w: f32, m: u32) -> DiReservoir {
        DiReservoir {
            reservoir: Reservoir {
                sample: DiSample { light, p_hat: 0.0 },
                m,
                w,
            },
        }
    }

    #[test]
    fn id() {
        assert_eq!(0b1101, pack_id(LightSample::KIND_POLYGON, LightId::new(3)));
        assert_eq!(0b10, pack_id(LightSample::KIND_SUN, LightId::new(0)));

        assert_eq!(
            (LightSample::KIND_POLYGON, LightId::new(3)),
            unpack_id(0b1101)
        );
    }

    #[test]
    fn half2x16() {
        // Same layout as GLSL's `packHalf2x16()`
        assert_eq!(0x4000_3c00, pack_half2x16(vec2(1.0, 2.0)));
        assert_eq!(vec2(1.0, 2.0), unpack_half2x16(0x4000_3c00));
    }

    #[test]
    fn w_and_m_stay_finite() {
        let data = DiReservoirData::pack(reservoir(
            polygon(0, vec2(0.3, 0.3)),
            1e5,
            100_000,
        ));

        let actual = data.unpack();

        assert!(actual.w.is_finite());
        assert_eq!(DiReservoir::MAX_PACKED_W, actual.w);
        assert_eq!(DiReservoir::MAX_PACKED_M, actual.m);

        let actual = DiReservoirData::pack(reservoir(
            polygon(0, vec2(0.3, 0.3)),
            f32::NAN,
            3,
        ))
        .unpack();

        assert_eq!(0.0, actual.w);
        assert_eq!(3, actual.m);
    }

    #[test]
    fn serialization() {
        fn target(idx: usize) -> DiReservoir {
            let light = if idx % 3 == 0 {
                Some(LightSample::Sun {
                    y_pos: vec2(0.25, 0.5),
                })
            } else {
                polygon(3 * idx as u32, vec2(0.125, 0.75))
            };

            reservoir(light, 1.5 + (idx as f32), 1 + (idx as u32 % 8))
        }

        let mut buffer = [DiReservoirData::default(); 10];

        for idx in 0..10 {
            target(idx).write(&mut buffer, idx);
        }

        for idx in 0..10 {
            let actual = DiReservoir::read(&buffer, idx);
            let expected = target(idx);

            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn empty_reservoir_is_stored_as_zeros() {
        let mut buffer = [DiReservoirData {
            id: 123,
            res: [4, 5],
        }];

        reservoir(None, 10.0, 3).write(&mut buffer, 0);

        assert_eq!(DiReservoirData::default(), buffer[0]);
        assert!(DiReservoir::read(&buffer, 0).is_empty());
    }

    #[test]
    fn y_pos_stays_below_one() {
        let data = DiReservoirData::pack(reservoir(
            polygon(0, vec2(0.9999, 1.0)),
            1.0,
            1,
        ));

        let y_pos = unpack_half2x16(data.res[1]);

        assert!(y_pos.is_unit_square(), "{y_pos:?}");
    }

    mod load_prev {
        use glam::{vec3, Vec3};

        use super::*;
        use crate::{PolygonLight, Sun};

        const OFFSETS: [u32; 3] = [0, 2, 3];
        const LIST: [u32; 3] = [0, 1, 2];

        fn lights() -> [PolygonLight; 3] {
            [PolygonLight::new([Vec3::X, Vec3::Y, Vec3::Z], Vec3::ONE); 3]
        }

        fn load(
            data: DiReservoirData,
            num_static: u32,
            cluster: u32,
            max_w: f32,
        ) -> Option<DiReservoir> {
            let lights = lights();
            let sun = Sun::new(vec3(0.0, 1.0, 0.0), 0.01, Vec3::ONE);

            DiReservoir::load_prev(
                &[data],
                0,
                LightsView::new(&lights, num_static, sun),
                LightListView::new(&OFFSETS, &LIST, &[u32::MAX]),
                ClusterId::new(cluster),
                max_w,
            )
        }

        fn data(light: Option<LightSample>, w: f32, m: u32) -> DiReservoirData {
            DiReservoirData::pack(reservoir(light, w, m))
        }

        #[test]
        fn accepts_valid_reservoir() {
            let actual =
                load(data(polygon(1, vec2(0.5, 0.5)), 2.0, 4), 3, 0, 0.0);

            assert_eq!(
                Some(reservoir(polygon(1, vec2(0.5, 0.5)), 2.0, 4)),
                actual
            );

            let actual = load(
                data(Some(LightSample::Sun { y_pos: Vec2::ZERO }), 2.0, 4),
                3,
                1,
                0.0,
            );

            assert!(actual.is_some());
        }

        #[test]
        fn rejects_empty_and_invalid_kinds() {
            assert_eq!(None, load(DiReservoirData::default(), 3, 0, 0.0));

            let mut invalid_kind = data(polygon(1, vec2(0.5, 0.5)), 2.0, 4);

            invalid_kind.id |= 0x3;

            assert_eq!(None, load(invalid_kind, 3, 0, 0.0));
        }

        #[test]
        fn rejects_lights_outside_cluster() {
            // Light #2 exists, but belongs to cluster #1 only
            assert_eq!(
                None,
                load(data(polygon(2, vec2(0.5, 0.5)), 2.0, 4), 3, 0, 0.0)
            );

            // Light #7 doesn't exist at all
            assert_eq!(
                None,
                load(data(polygon(7, vec2(0.5, 0.5)), 2.0, 4), 8, 0, 0.0)
            );
        }

        #[test]
        fn rejects_dynamic_lights() {
            assert_eq!(
                None,
                load(data(polygon(1, vec2(0.5, 0.5)), 2.0, 4), 1, 0, 0.0)
            );
        }

        #[test]
        fn rejects_degenerate_weights() {
            let light = polygon(1, vec2(0.5, 0.5));

            assert_eq!(None, load(data(light, 0.0, 4), 3, 0, 0.0));
            assert_eq!(None, load(data(light, -1.0, 4), 3, 0, 0.0));
            assert_eq!(None, load(data(light, 2.0, 0), 3, 0, 0.0));
            assert_eq!(None, load(data(light, f32::NAN, 4), 3, 0, 0.0));

            // Corrupted buffers can still carry non-finite halves
            for w in [f32::NAN, f32::INFINITY] {
                let mut corrupted = data(light, 2.0, 4);

                corrupted.res[0] = pack_half2x16(vec2(w, 4.0));

                assert_eq!(None, load(corrupted, 3, 0, 0.0));
            }
        }

        #[test]
        fn rejects_invalid_y_pos() {
            let mut nan = data(polygon(1, vec2(0.5, 0.5)), 2.0, 4);

            nan.res[1] = pack_half2x16(vec2(f32::NAN, 0.5));

            assert_eq!(None, load(nan, 3, 0, 0.0));

            let mut one = data(polygon(1, vec2(0.5, 0.5)), 2.0, 4);

            one.res[1] = pack_half2x16(vec2(0.5, 1.0));

            assert_eq!(None, load(one, 3, 0, 0.0));
        }

        #[test]
        fn caps_w() {
            let actual =
                load(data(polygon(1, vec2(0.5, 0.5)), 100.0, 4), 3, 0, 64.0)
                    .map(|res| res.w);

            assert_eq!(Some(64.0), actual);
        }
    }
}
