//! Configure / start / poll sequence against a server.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::sleep;
use tracing::{info, warn};

use rowmax_wire::{Command, Connection, Response, MAX_RESULT_ELEMENTS};

use crate::error::Error;

/// Delay between two status polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll budget; together with [`POLL_INTERVAL`] this bounds a session to
/// about a minute of waiting.
pub const MAX_POLL_ATTEMPTS: u32 = 120;

/// Runs one offload session: uploads `matrix` (side length `size`), starts
/// the computation with `threads` workers, and polls until the server hands
/// back the transformed matrix or reports a failure.
pub async fn run(addr: &str, matrix: &[f32], size: u32, threads: u32) -> Result<Vec<f32>, Error> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(rowmax_wire::Error::from)?;
    let mut conn = Connection::new(stream);
    info!(addr, "connected");

    conn.write_command(&Command::Configure { size, threads })
        .await?;
    conn.write_f32s(matrix).await?;
    expect_ack(&mut conn, "configure").await?;
    info!(size, threads, "configuration acknowledged");

    conn.write_command(&Command::Start).await?;
    expect_ack(&mut conn, "start").await?;
    info!("computation started, polling for the result");

    for _ in 0..MAX_POLL_ATTEMPTS {
        conn.write_command(&Command::Status).await?;
        match conn.read_response().await? {
            Response::Pending => sleep(POLL_INTERVAL).await,
            Response::Result => {
                let result_size = conn.read_u32().await?;
                if result_size != size {
                    warn!(result_size, size, "result size differs from the upload");
                }
                let elements = u64::from(result_size) * u64::from(result_size);
                if elements > MAX_RESULT_ELEMENTS {
                    return Err(Error::ResultTooLarge(elements));
                }
                return Ok(conn.read_f32s(elements as usize).await?);
            }
            Response::Error => return Err(Error::ComputeFailed),
            other => return Err(Error::UnexpectedResponse(other.tag())),
        }
    }
    Err(Error::TimedOut(MAX_POLL_ATTEMPTS))
}

async fn expect_ack(conn: &mut Connection<TcpStream>, phase: &'static str) -> Result<(), Error> {
    match conn.read_response().await? {
        Response::Ack => Ok(()),
        other => Err(Error::Rejected {
            phase,
            tag: other.tag(),
        }),
    }
}
