/// Two generations of the same buffer: one written by the current frame and
/// one kept from the previous frame.
///
/// Roles swap every frame, so nothing has to be copied; which generation is
/// the current one is decided by [`Frame::is_alternate()`].
///
/// [`Frame::is_alternate()`]: glint_kernel::Frame::is_alternate
#[derive(Clone, Debug, Default)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl<T> DoubleBuffered<T> {
    /// Creates both generations out of the same function.
    pub fn from_fn(mut f: impl FnMut() -> T) -> Self {
        Self { a: f(), b: f() }
    }

    /// Returns the generation written by frames of given parity.
    pub fn get(&self, alternate: bool) -> &T {
        if alternate {
            &self.b
        } else {
            &self.a
        }
    }

    /// Returns the current generation (writable) together with the past one
    /// (read-only).
    pub fn split_mut(&mut self, alternate: bool) -> (&mut T, &T) {
        if alternate {
            (&mut self.b, &self.a)
        } else {
            (&mut self.a, &self.b)
        }
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        f(&mut self.a);
        f(&mut self.b);
    }
}
