use glam::UVec2;

use crate::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("viewport must not be empty (got {0})")]
    EmptyViewport(UVec2),

    #[error("{what} contains {actual} items, but the viewport has {expected}")]
    InputSizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
