//! Server network layer: the connection acceptor and the per-connection
//! client handler.
//!
//! Each accepted socket gets its own task. The task reads the player's name,
//! registers with the session and then relays every received line until the
//! peer goes away. Writes go through a separate writer task fed by the
//! client's line channel, so broadcasts never block on a slow socket.

use crate::client_manager::ClientId;
use crate::config::ServerConfig;
use crate::session::QuizSession;
use log::{debug, error, info};
use shared::{encode_line, read_line};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;

/// Accepts connections and spawns a handler for each
pub struct Server {
    listener: TcpListener,
    session: Arc<QuizSession>,
    max_message: usize,
}

impl Server {
    /// Binds the listening socket described by `config`
    pub async fn bind(config: &ServerConfig, session: Arc<QuizSession>) -> io::Result<Self> {
        let addr = lookup_host(config.address())
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("could not resolve {}", config.address()),
                )
            })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;

        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            session,
            max_message: config.max_message,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever; a failing client never stops the loop
    pub async fn run(self) -> io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("Accepted connection from {}", addr);

                    let session = Arc::clone(&self.session);
                    let max_message = self.max_message;
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, addr, session, max_message).await {
                            debug!("Connection from {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

/// Drives one client's session from name to disconnect
async fn handle_client(
    stream: TcpStream,
    addr: SocketAddr,
    session: Arc<QuizSession>,
    max_message: usize,
) -> io::Result<()> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let name = match read_line(&mut reader, max_message).await? {
        Some(name) => name,
        None => {
            debug!("{} closed before sending a name", addr);
            return Ok(());
        }
    };

    let (sender, receiver) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_lines(write_half, receiver, addr));

    let client_id = session.register(name, addr, sender).await;
    let result = relay_lines(&mut reader, client_id, &session, max_message).await;

    // Dropping the client's sender lets the writer flush and close the socket
    session.unregister(client_id).await;
    if let Err(e) = writer.await {
        error!("Writer task for {} failed: {}", addr, e);
    }

    result
}

async fn relay_lines(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    client_id: ClientId,
    session: &QuizSession,
    max_message: usize,
) -> io::Result<()> {
    while let Some(line) = read_line(reader, max_message).await? {
        debug!("Client {} sent {:?}", client_id, line);
        session.relay(client_id, &line).await;
    }
    Ok(())
}

/// Writes queued lines until the channel closes or the socket fails
async fn write_lines(
    mut writer: OwnedWriteHalf,
    mut receiver: mpsc::UnboundedReceiver<String>,
    addr: SocketAddr,
) {
    while let Some(line) = receiver.recv().await {
        if let Err(e) = writer.write_all(&encode_line(&line)).await {
            debug!("Failed to write to {}: {}", addr, e);
            return;
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Failed to shut down {}: {}", addr, e);
    }
}
