//! Error types for the client driver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Wire(#[from] rowmax_wire::Error),

    #[error("server rejected {phase} (response tag {tag})")]
    Rejected { phase: &'static str, tag: u32 },

    #[error("server reported a computation error")]
    ComputeFailed,

    #[error("unexpected response tag {0} while polling")]
    UnexpectedResponse(u32),

    #[error("result of {0} elements exceeds the client limit")]
    ResultTooLarge(u64),

    #[error("no result after {0} status polls")]
    TimedOut(u32),
}
