//! Per-connection session state machine.
//!
//! A session alternates between reading one command and executing its
//! sub-protocol, answering before the next command is read. The handler owns
//! the connection and the input buffer; the phase flags and the result
//! buffer are shared with the background worker.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use rowmax_wire::{Command, Connection, Response, MAX_MATRIX_SIZE};

use crate::worker;

/// Phase flags coordinating the handler and its worker.
///
/// The worker publishes done or failed (then clears running) with `Release`;
/// the handler reads with `Acquire`, so the result-buffer writes are visible
/// by the time a terminal flag is observed.
pub(crate) struct PhaseFlags {
    pub configured: AtomicBool,
    pub running: AtomicBool,
    pub done: AtomicBool,
    pub failed: AtomicBool,
}

/// State shared between a session handler and its worker task.
pub(crate) struct Shared {
    pub flags: PhaseFlags,
    result: Mutex<Vec<f32>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            flags: PhaseFlags {
                configured: AtomicBool::new(false),
                running: AtomicBool::new(false),
                done: AtomicBool::new(false),
                failed: AtomicBool::new(false),
            },
            result: Mutex::new(Vec::new()),
        }
    }

    /// Locks the result buffer, recovering from a poisoned lock; the buffer
    /// is only ever read after a terminal flag, so a poisoned value is never
    /// observed as a result.
    pub(crate) fn result(&self) -> MutexGuard<'_, Vec<f32>> {
        self.result.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Wire(#[from] rowmax_wire::Error),

    #[error("invalid matrix size {0}")]
    InvalidSize(u32),
}

/// Runs one session to completion and tears it down.
pub(crate) async fn run(stream: TcpStream, peer: SocketAddr) {
    let client = peer.to_string();
    info!(%client, "client connected");

    let mut session = Session::new(stream, client);
    match session.serve().await {
        Ok(()) => {}
        Err(Error::Wire(rowmax_wire::Error::PeerClosed)) => {
            info!(client = %session.client, "client disconnected");
        }
        Err(e) => {
            warn!(client = %session.client, error = %e, "session terminated");
        }
    }
    session.shutdown().await;
}

pub(crate) struct Session<S> {
    conn: Connection<S>,
    client: String,
    size: u32,
    threads: u32,
    input: Vec<f32>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    pub(crate) fn new(stream: S, client: String) -> Self {
        Self {
            conn: Connection::new(stream),
            client,
            size: 0,
            threads: 0,
            input: Vec::new(),
            shared: Arc::new(Shared::new()),
            worker: None,
        }
    }

    /// Command loop; returns only on a codec failure (an orderly disconnect
    /// surfaces as `PeerClosed`). Unknown commands are answered and skipped.
    pub(crate) async fn serve(&mut self) -> Result<(), Error> {
        loop {
            let command = match self.conn.read_command().await {
                Ok(command) => command,
                Err(rowmax_wire::Error::UnknownCommand(tag)) => {
                    warn!(client = %self.client, tag, "unknown command");
                    self.conn.write_response(Response::Error).await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match command {
                Command::Configure { size, threads } => self.configure(size, threads).await?,
                Command::Start => self.start().await?,
                Command::Status => self.status().await?,
            }
        }
    }

    /// Joins any outstanding worker so its shared references are released
    /// before the session is dropped.
    pub(crate) async fn shutdown(&mut self) {
        self.join_worker().await;
    }

    async fn configure(&mut self, size: u32, threads: u32) -> Result<(), Error> {
        if size == 0 || size > MAX_MATRIX_SIZE {
            // The element count of the pending payload cannot be trusted;
            // answer and drop the connection.
            self.conn.write_response(Response::Error).await?;
            return Err(Error::InvalidSize(size));
        }

        self.join_worker().await;

        let elements = size as usize * size as usize;
        self.input = self.conn.read_f32s(elements).await?;
        self.size = size;
        self.threads = threads;

        self.shared.flags.running.store(false, Ordering::Release);
        self.shared.flags.done.store(false, Ordering::Release);
        self.shared.flags.failed.store(false, Ordering::Release);
        self.shared.flags.configured.store(true, Ordering::Release);
        self.shared.result().clear();

        info!(client = %self.client, size, threads, "configured");
        self.conn.write_response(Response::Ack).await?;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), Error> {
        if !self.shared.flags.configured.load(Ordering::Acquire) {
            warn!(client = %self.client, "start before configuration");
            self.conn.write_response(Response::Error).await?;
            return Ok(());
        }
        if self.shared.flags.running.load(Ordering::Acquire) {
            // Duplicate start: acknowledge without restarting the worker.
            self.conn.write_response(Response::Ack).await?;
            return Ok(());
        }
        if self.shared.flags.done.load(Ordering::Acquire)
            || self.shared.flags.failed.load(Ordering::Acquire)
        {
            warn!(client = %self.client, "start after a finished run");
            self.conn.write_response(Response::Error).await?;
            return Ok(());
        }

        self.join_worker().await;

        self.shared.flags.done.store(false, Ordering::Release);
        self.shared.flags.failed.store(false, Ordering::Release);
        self.shared.flags.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let input = self.input.clone();
        let (size, threads) = (self.size, self.threads);
        self.worker = Some(tokio::task::spawn_blocking(move || {
            worker::run(shared, input, size, threads)
        }));

        info!(client = %self.client, "computation started");
        self.conn.write_response(Response::Ack).await?;
        Ok(())
    }

    async fn status(&mut self) -> Result<(), Error> {
        if self.shared.flags.failed.load(Ordering::Acquire) {
            self.conn.write_response(Response::Error).await?;
        } else if self.shared.flags.done.load(Ordering::Acquire) {
            let result = self.shared.result().clone();
            self.conn.write_response(Response::Result).await?;
            self.conn.write_u32(self.size).await?;
            self.conn.write_f32s(&result).await?;
        } else if self.shared.flags.running.load(Ordering::Acquire) {
            self.conn.write_response(Response::Pending).await?;
        } else {
            warn!(client = %self.client, "status with no result available");
            self.conn.write_response(Response::Error).await?;
        }
        Ok(())
    }

    async fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if let Err(e) = handle.await {
                warn!(client = %self.client, error = %e, "worker task failed to join");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::DuplexStream;

    async fn spawn_session() -> Connection<DuplexStream> {
        let (client, server) = tokio::io::duplex(1 << 16);
        tokio::spawn(async move {
            let mut session = Session::new(server, "test".to_string());
            let _ = session.serve().await;
            session.shutdown().await;
        });
        Connection::new(client)
    }

    async fn poll_result(conn: &mut Connection<DuplexStream>) -> (u32, Vec<f32>) {
        loop {
            conn.write_command(&Command::Status).await.unwrap();
            match conn.read_response().await.unwrap() {
                Response::Pending => tokio::time::sleep(Duration::from_millis(10)).await,
                Response::Result => {
                    let size = conn.read_u32().await.unwrap();
                    let data = conn.read_f32s((size * size) as usize).await.unwrap();
                    return (size, data);
                }
                other => panic!("unexpected response while polling: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn configure_start_status_round_trip() {
        let mut conn = spawn_session().await;

        conn.write_command(&Command::Configure { size: 2, threads: 1 })
            .await
            .unwrap();
        conn.write_f32s(&[1.0, 4.0, 2.0, 3.0]).await.unwrap();
        assert_eq!(conn.read_response().await.unwrap(), Response::Ack);

        conn.write_command(&Command::Start).await.unwrap();
        assert_eq!(conn.read_response().await.unwrap(), Response::Ack);

        let (size, data) = poll_result(&mut conn).await;
        assert_eq!(size, 2);
        assert_eq!(data, vec![4.0, 4.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn status_in_idle_state_answers_error() {
        let mut conn = spawn_session().await;

        conn.write_command(&Command::Status).await.unwrap();
        assert_eq!(conn.read_response().await.unwrap(), Response::Error);

        // The session survives the out-of-state command.
        conn.write_command(&Command::Configure { size: 1, threads: 1 })
            .await
            .unwrap();
        conn.write_f32s(&[7.0]).await.unwrap();
        assert_eq!(conn.read_response().await.unwrap(), Response::Ack);
    }

    #[tokio::test]
    async fn start_in_idle_state_answers_error() {
        let mut conn = spawn_session().await;

        conn.write_command(&Command::Start).await.unwrap();
        assert_eq!(conn.read_response().await.unwrap(), Response::Error);
    }

    #[tokio::test]
    async fn invalid_size_closes_the_session() {
        let mut conn = spawn_session().await;

        conn.write_command(&Command::Configure { size: 0, threads: 1 })
            .await
            .unwrap();
        assert_eq!(conn.read_response().await.unwrap(), Response::Error);
        assert!(matches!(
            conn.read_response().await,
            Err(rowmax_wire::Error::PeerClosed)
        ));
    }
}
