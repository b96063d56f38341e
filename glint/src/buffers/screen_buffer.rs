use glam::UVec2;

/// Buffer holding one item per pixel of the viewport, in row-major order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScreenBuffer<T> {
    items: Vec<T>,
    size: UVec2,
}

impl<T> ScreenBuffer<T>
where
    T: Clone + Default,
{
    pub fn new(size: UVec2) -> Self {
        Self {
            items: vec![T::default(); Self::len_of(size)],
            size,
        }
    }

    pub fn len_of(size: UVec2) -> usize {
        size.x as usize * size.y as usize
    }

    /// Resets every item back to its default value.
    pub fn clear(&mut self) {
        self.items.fill(T::default());
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn get(&self, screen_pos: UVec2) -> Option<&T> {
        if screen_pos.x >= self.size.x || screen_pos.y >= self.size.y {
            return None;
        }

        self.items.get(
            screen_pos.y as usize * self.size.x as usize
                + screen_pos.x as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn get() {
        let mut target = ScreenBuffer::<u32>::new(uvec2(3, 2));

        target.as_mut_slice()[4] = 7;

        assert_eq!(6, target.as_slice().len());
        assert_eq!(Some(&7), target.get(uvec2(1, 1)));
        assert_eq!(None, target.get(uvec2(3, 0)));
        assert_eq!(None, target.get(uvec2(0, 2)));

        target.clear();

        assert_eq!(Some(&0), target.get(uvec2(1, 1)));
    }
}
