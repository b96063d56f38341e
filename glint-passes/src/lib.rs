//! Per-pixel stages of direct lighting, one module per stage.
//!
//! Stages are plain functions over explicit inputs; [`di::main()`] composes
//! them into a single pass that's run once per pixel, with no state shared
//! between pixels.

pub mod di;
pub mod di_reproject;
pub mod di_resample_spatial;
pub mod di_resample_temporal;
pub mod di_resolve;
pub mod di_sample;
