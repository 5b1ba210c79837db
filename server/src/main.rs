use std::net::SocketAddr;

use tracing::info;

use rowmax_server::listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let addr = SocketAddr::from(([0, 0, 0, 0], rowmax_wire::DEFAULT_PORT));
    let listener = listener::bind(addr)?;
    info!(%addr, "listening");

    listener::serve(listener).await?;
    Ok(())
}
