//! Listener bootstrap and accept loop.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket};
use tracing::{error, warn};

use crate::session;

const BACKLOG: u32 = 1024;
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Binds a listening socket with address reuse enabled, so a restarted
/// server can reclaim the port immediately.
pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG)
}

/// Accepts connections until a fatal accept error, spawning a detached
/// session task per client.
pub async fn serve(listener: TcpListener) -> io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(session::run(stream, peer));
            }
            Err(e) if is_transient(&e) => {
                warn!(error = %e, "accept failed, retrying");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
            }
            Err(e) => {
                error!(error = %e, "accept failed, shutting down listener");
                return Err(e);
            }
        }
    }
}

/// Accept errors worth retrying: the connection died before it was picked
/// up, or the process is briefly out of descriptors/buffers.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::OutOfMemory
    )
}
