//! Background computation worker for a session.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::warn;

use crate::session::Shared;

/// Worker body; runs on a blocking thread while the session handler keeps
/// answering status polls.
///
/// `input` is the session's working copy. The transform happens in place and
/// the buffer is published into the shared result slot before the terminal
/// flag is stored, so a handler that observes done also observes the data.
pub(crate) fn run(shared: Arc<Shared>, input: Vec<f32>, size: u32, threads: u32) {
    let mut buffer = input;
    match rowmax_compute::apply(&mut buffer, size, threads) {
        Ok(()) => {
            *shared.result() = buffer;
            shared.flags.done.store(true, Ordering::Release);
        }
        Err(e) => {
            warn!(size, threads, error = %e, "matrix transform failed");
            shared.flags.failed.store(true, Ordering::Release);
        }
    }
    shared.flags.running.store(false, Ordering::Release);
}
