//! Row-partitioned parallel matrix transform.
//!
//! The transform replaces each diagonal element of a square row-major matrix
//! with the maximum of its row and leaves every other cell untouched. Rows
//! are split into contiguous chunks, one per worker thread, so the threads
//! write disjoint ranges and need no synchronization.
//!
//! # Example
//!
//! ```
//! let mut matrix = vec![
//!     1.0, 2.0, 3.0,
//!     4.0, 5.0, 6.0,
//!     7.0, 8.0, 9.0,
//! ];
//! rowmax_compute::apply(&mut matrix, 3, 2).unwrap();
//! assert_eq!(matrix, vec![
//!     3.0, 2.0, 3.0,
//!     4.0, 6.0, 6.0,
//!     7.0, 8.0, 9.0,
//! ]);
//! ```

mod error;
mod transform;

pub use error::Error;
pub use transform::{apply, row_chunks};
