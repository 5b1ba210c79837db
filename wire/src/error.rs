//! Error types for wire protocol operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("peer closed the connection")]
    PeerClosed,

    #[error("connection closed mid-frame ({got}/{want} bytes)")]
    TruncatedFrame { got: usize, want: usize },

    #[error("unknown command tag {0}")]
    UnknownCommand(u32),

    #[error("unexpected response tag {0}")]
    UnexpectedTag(u32),
}
