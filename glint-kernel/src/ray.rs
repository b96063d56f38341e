use glam::Vec3;

/// Visibility oracle provided by the ray-tracing backend.
///
/// Answers a single, synchronous question: is the segment between `origin`
/// and `target` blocked by any geometry?
pub trait ShadowTracer {
    fn is_occluded(&self, origin: Vec3, target: Vec3) -> bool;
}

impl<F> ShadowTracer for F
where
    F: Fn(Vec3, Vec3) -> bool,
{
    fn is_occluded(&self, origin: Vec3, target: Vec3) -> bool {
        self(origin, target)
    }
}

/// Shadow ray between a surface and a point on a light.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShadowRay {
    pub origin: Vec3,
    pub target: Vec3,
}

impl ShadowRay {
    pub fn trace(self, tracer: &impl ShadowTracer) -> bool {
        tracer.is_occluded(self.origin, self.target)
    }
}
