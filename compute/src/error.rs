//! Error types for the matrix transform.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("buffer holds {elements} elements, expected {size}x{size}")]
    DimensionMismatch { elements: usize, size: u32 },

    #[error("{0} row task(s) panicked")]
    TaskPanicked(usize),
}
