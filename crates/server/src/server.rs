//! TCP accept loop and per-connection handling.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use parking_lot::RwLock;

use engine::Engine;

use crate::protocol::{process, Request, Response};

/// TCP server for CobaltKV.
///
/// The accept loop runs on the calling thread; each client connection gets
/// its own handler thread. All handlers share the engine through an
/// `Arc<RwLock<_>>`, which serializes writes while letting reads proceed
/// concurrently.
pub struct Server {
    addr: String,
    engine: Arc<RwLock<Engine>>,
    listener: Option<TcpListener>,
}

impl Server {
    pub fn new(addr: impl Into<String>, engine: Arc<RwLock<Engine>>) -> Self {
        Self {
            addr: addr.into(),
            engine,
            listener: None,
        }
    }

    /// Binds the listening socket and returns the bound address.
    ///
    /// Useful with port 0 (the OS picks a free port). [`run`](Server::run)
    /// binds implicitly when this was not called first.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.addr)
            .with_context(|| format!("failed to listen on {}", self.addr))?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// The bound address, once [`bind`](Server::bind) has run.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Serves forever (blocking).
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| anyhow!("server has no listener"))?;

        tracing::info!(addr = %self.addr, "database server listening");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let engine = Arc::clone(&self.engine);
                    thread::spawn(move || {
                        if let Err(error) = handle_connection(stream, engine) {
                            tracing::debug!(%error, "connection ended with error");
                        }
                    });
                }
                Err(error) => {
                    tracing::error!(%error, "failed to accept connection");
                }
            }
        }

        Ok(())
    }
}

/// Serves one client: read a JSON line, execute, write a JSON line back.
///
/// Malformed JSON produces an error response and the connection stays up;
/// only I/O failures end the session.
fn handle_connection(stream: TcpStream, engine: Arc<RwLock<Engine>>) -> Result<()> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    tracing::info!(%peer, "client connected");

    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => process(&engine, &request),
            Err(_) => Response::failure("Invalid JSON"),
        };

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        writer.write_all(&payload)?;
    }

    tracing::info!(%peer, "client disconnected");
    Ok(())
}
