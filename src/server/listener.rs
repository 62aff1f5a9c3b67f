use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::router::Router;

/// Binds the listening socket with the configured backlog.
pub async fn bind(cfg: &Config) -> anyhow::Result<TcpListener> {
    let listen_addr = cfg.listen_addr();
    let addr = lookup_host(listen_addr.as_str())
        .await
        .with_context(|| format!("failed to resolve {}", listen_addr))?
        .next()
        .with_context(|| format!("no address for {}", listen_addr))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket
        .bind(addr)
        .with_context(|| format!("failed to bind {}", addr))?;

    let listener = socket.listen(cfg.backlog)?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts connections one at a time, running each to completion before
/// the next accept. Connection failures are logged and do not stop the
/// loop; an accept failure does.
pub async fn serve(listener: TcpListener, router: &Router, cfg: &Config) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let mut conn = Connection::new(socket, router, cfg);
        if let Err(e) = conn.run().await {
            tracing::error!("Connection error from {}: {}", peer, e);
        }
    }
}

pub async fn run(cfg: &Config, router: &Router) -> anyhow::Result<()> {
    let listener = bind(cfg).await?;
    serve(listener, router, cfg).await
}
