//! Spatiotemporal resampling of direct lighting (ReSTIR DI).
//!
//! [`Renderer`] owns per-pixel history and drives the passes from
//! [`glint_passes`]; scene lights live in [`Lights`] and are narrowed down
//! per cluster by [`LightList`]. Visibility is answered by the caller through
//! [`ShadowTracer`].

mod buffers;
mod config;
mod error;
mod lights;
mod renderer;
mod stats;

pub use glint_kernel::{
    ClusterId, DiReservoirData, FieldLayout, Frame, GBufferEntry, Hit,
    LightId, ShadowTracer, Sun, Surface,
};
pub use glint_passes::di::{DiDebug, DiOutput};

pub(crate) use self::buffers::*;
pub use self::config::*;
pub use self::error::*;
pub use self::lights::*;
pub use self::renderer::*;
pub use self::stats::*;
