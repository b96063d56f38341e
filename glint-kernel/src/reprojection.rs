use glam::{IVec2, UVec2, Vec2, Vec3, Vec3Swizzles};

use crate::lerp;

/// How pixels are laid out on the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldLayout {
    /// Regular, flat image
    #[default]
    Flat,

    /// Checkerboarded rendering, where the left half of the image contains
    /// the even field and the right half contains the odd one; history never
    /// crosses fields.
    Checkerboard,
}

/// Maps pixels of the current frame onto pixels of the previous one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reprojection {
    pub curr_size: UVec2,
    pub prev_size: UVec2,
    pub layout: FieldLayout,
}

impl Reprojection {
    /// The 2x2 footprint searched around the reprojected position.
    pub const FOOTPRINT: [IVec2; 4] = [
        IVec2::new(0, 0),
        IVec2::new(1, 0),
        IVec2::new(0, 1),
        IVec2::new(1, 1),
    ];

    /// Returns the (continuous) position of `screen_pos` in the previous
    /// frame.
    ///
    /// `motion.xy` is the screen-space motion in uv units and `motion.z` is
    /// the change of view-space depth.
    pub fn prev_pos(&self, screen_pos: UVec2, motion: Vec3) -> Vec2 {
        let (curr_size, prev_size) = self.field_sizes();

        ((screen_pos.as_vec2() + 0.5) / curr_size + motion.xy()) * prev_size
    }

    /// Returns the top-left pixel of the 2x2 footprint around
    /// [`Self::prev_pos()`].
    pub fn prev_pos_ld(&self, screen_pos: UVec2, motion: Vec3) -> IVec2 {
        (self.prev_pos(screen_pos, motion) - 0.5).floor().as_ivec2()
    }

    /// Returns whether given previous-frame pixel lies inside the screen and
    /// inside the same field as `screen_pos`.
    pub fn contains(&self, screen_pos: UVec2, prev_pos: IVec2) -> bool {
        let (left, right) = self.field_bounds(screen_pos);

        prev_pos.y >= 0
            && prev_pos.y < self.prev_size.y as i32
            && prev_pos.x >= left
            && prev_pos.x < right
    }

    /// Returns the length of motion vector, in pixels.
    pub fn motion_length_px(&self, motion: Vec3) -> f32 {
        (motion.xy() * self.curr_size.as_vec2()).length()
    }

    /// Returns the maximum barycentric distance between the current and the
    /// previous hit point on the same primitive; widens for fast motion to
    /// compensate for imprecise motion vectors.
    pub fn bary_threshold(&self, motion: Vec3) -> f32 {
        lerp(0.05, 0.25, self.motion_length_px(motion) / 16.0)
    }

    fn field_sizes(&self) -> (Vec2, Vec2) {
        let curr = self.curr_size.as_vec2();
        let prev = self.prev_size.as_vec2();

        match self.layout {
            FieldLayout::Flat => (curr, prev),
            FieldLayout::Checkerboard => {
                (curr * Vec2::new(0.5, 1.0), prev * Vec2::new(0.5, 1.0))
            }
        }
    }

    fn field_bounds(&self, screen_pos: UVec2) -> (i32, i32) {
        let prev_width = self.prev_size.x as i32;

        match self.layout {
            FieldLayout::Flat => (0, prev_width),
            FieldLayout::Checkerboard => {
                let left = if screen_pos.x >= self.curr_size.x / 2 {
                    prev_width / 2
                } else {
                    0
                };

                (left, left + prev_width / 2)
            }
        }
    }
}
