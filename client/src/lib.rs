//! Client driver for the rowmax offload service.
//!
//! Connects to a server, uploads a square matrix together with a requested
//! worker parallelism, starts the computation, and polls until the
//! transformed matrix comes back.
//!
//! # Example
//!
//! ```no_run
//! use rowmax_client::matrix;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = matrix::random(5);
//!     let result = rowmax_client::run("127.0.0.1:65001", &input, 5, 2).await?;
//!     println!("{}", matrix::render(&result, 5, "result matrix"));
//!     Ok(())
//! }
//! ```

mod driver;
mod error;
pub mod matrix;

pub use driver::{run, MAX_POLL_ATTEMPTS, POLL_INTERVAL};
pub use error::Error;
