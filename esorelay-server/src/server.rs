use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, error, info};

use esorelay_net::{Limits, ParseStatus, Request, RequestParser};

use crate::dispatch::{AppState, dispatch};
use crate::error::ServerError;

/// Fixed per-read chunk size; the parser's wire contract is defined in terms
/// of it (non-body tokens must fit in one read).
pub const CLIENT_CHUNK_SIZE: usize = 8192;
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);
pub const MAX_READ_RETRIES: u32 = 5;

const LISTEN_BACKLOG: u32 = 1000;

pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Owns the listening socket and the accept loop. One tokio task per
/// accepted connection; all of them share `AppState` in-process, so a drained
/// command queue is observed by every later poll.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    pub fn bind(state: Arc<AppState>, host: &str, port: u16) -> Result<Self, ServerError> {
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ServerError::Config(format!("invalid listen address {host}:{port}")))?;
        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;
        info!(%addr, "listening");
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts until the shutdown flag flips. The pending `accept` is raced
    /// against the flag, so stopping does not wait for one more connection.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), ServerError> {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            serve_client(state, stream, peer).await;
                        });
                    }
                    Err(err) => error!(%err, "accept failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("accept loop stopped");
        Ok(())
    }
}

async fn serve_client(state: Arc<AppState>, mut stream: TcpStream, peer: SocketAddr) {
    let request = match read_request(&mut stream, peer).await {
        Some(request) => request,
        None => return,
    };

    let response = dispatch(&state, &request);
    if let Err(err) = stream.write_all(&response).await {
        debug!(%peer, %err, "could not write response");
        return;
    }
    let _ = stream.shutdown().await;
}

/// Drives the read loop for one connection. Protocol failures abandon the
/// connection without emitting a response; that fail-silent policy is part of
/// the wire contract with the single trusted client.
async fn read_request(stream: &mut TcpStream, peer: SocketAddr) -> Option<Request> {
    let mut parser = RequestParser::new(Limits::default());
    let mut chunk = vec![0u8; CLIENT_CHUNK_SIZE];
    let mut retries = 0u32;

    loop {
        let read = match timeout(READ_TIMEOUT, stream.read(&mut chunk)).await {
            Err(_) => {
                retries += 1;
                if retries >= MAX_READ_RETRIES {
                    debug!(%peer, "read retry budget exhausted");
                    return None;
                }
                continue;
            }
            Ok(Err(err)) => {
                debug!(%peer, %err, "read failed");
                return None;
            }
            Ok(Ok(0)) => return None,
            Ok(Ok(read)) => read,
        };

        match parser.push(&chunk[..read]) {
            ParseStatus::NeedMore => {}
            ParseStatus::Complete(request) => return Some(request),
            ParseStatus::Error(err) => {
                debug!(%peer, ?err, "malformed request, dropping connection");
                return None;
            }
        }
    }
}
