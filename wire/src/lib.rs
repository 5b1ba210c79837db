//! Shared wire protocol for the rowmax offload service.
//!
//! Both the client and the server speak a small tagged binary protocol over
//! TCP: every message starts with a 32-bit unsigned big-endian tag, followed
//! by a tag-specific payload. Matrix payloads are flat sequences of 4-byte
//! IEEE-754 singles in the host's native byte order (both endpoints are
//! assumed to agree).
//!
//! # Example
//!
//! ```no_run
//! use rowmax_wire::{Command, Connection, Response};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = tokio::net::TcpStream::connect("127.0.0.1:65001").await?;
//!     let mut conn = Connection::new(stream);
//!
//!     conn.write_command(&Command::Start).await?;
//!     match conn.read_response().await? {
//!         Response::Ack => println!("computation started"),
//!         other => println!("server answered {:?}", other),
//!     }
//!     Ok(())
//! }
//! ```

mod codec;
mod error;

pub use codec::Connection;
pub use error::Error;

/// TCP port the server listens on by default.
pub const DEFAULT_PORT: u16 = 65001;

/// Largest accepted matrix side length. Caps an upload at roughly 36 MB
/// (3000 × 3000 × 4 bytes); both endpoints enforce the same bound.
pub const MAX_MATRIX_SIZE: u32 = 3000;

/// Largest result payload (in elements) a client will allocate.
pub const MAX_RESULT_ELEMENTS: u64 = 100_000_000;

const CMD_CONFIG_DATA: u32 = 1;
const CMD_START_COMP: u32 = 2;
const CMD_GET_STATUS: u32 = 3;

const RESP_ACK: u32 = 10;
const RESP_STATUS_PENDING: u32 = 11;
const RESP_RESULT: u32 = 12;
const RESP_ERROR: u32 = 13;

/// A client-to-server command.
///
/// `Configure` carries only the header fields; the N·N float payload that
/// follows on the wire is read separately, after the receiver has validated
/// the size against [`MAX_MATRIX_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Configure { size: u32, threads: u32 },
    Start,
    Status,
}

/// A server-to-client response tag.
///
/// `Result` is followed on the wire by the result side length and the N·N
/// float payload; the other responses have no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ack,
    Pending,
    Result,
    Error,
}

impl Response {
    pub fn tag(self) -> u32 {
        match self {
            Response::Ack => RESP_ACK,
            Response::Pending => RESP_STATUS_PENDING,
            Response::Result => RESP_RESULT,
            Response::Error => RESP_ERROR,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            RESP_ACK => Some(Response::Ack),
            RESP_STATUS_PENDING => Some(Response::Pending),
            RESP_RESULT => Some(Response::Result),
            RESP_ERROR => Some(Response::Error),
            _ => None,
        }
    }
}
