//! Blocking TCP client for the wire protocol.
//!
//! Used by the `datagen` tool and handy for scripting against a running
//! server.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

use anyhow::{anyhow, Context, Result};

use crate::protocol::{Request, Response};

/// One connection to a CobaltKV server.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    /// Connects to a server at `addr`.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).context("failed to connect to server")?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: stream,
        })
    }

    /// Stores `key -> value`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let response = self.roundtrip(&Request {
            operation: "SET".to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })?;
        if !response.success {
            return Err(anyhow!("set failed: {}", response.error));
        }
        Ok(())
    }

    /// Fetches the value for `key`.
    pub fn get(&mut self, key: &str) -> Result<String> {
        let response = self.roundtrip(&Request {
            operation: "GET".to_string(),
            key: key.to_string(),
            value: String::new(),
        })?;
        if !response.success {
            return Err(anyhow!("get failed: {}", response.error));
        }
        Ok(response.data)
    }

    /// Lists every `key=value` pair the server knows.
    pub fn list(&mut self) -> Result<Vec<String>> {
        let response = self.roundtrip(&Request {
            operation: "LIST".to_string(),
            key: String::new(),
            value: String::new(),
        })?;
        if !response.success {
            return Err(anyhow!("list failed: {}", response.error));
        }
        if response.data.is_empty() {
            return Ok(Vec::new());
        }
        Ok(response.data.lines().map(str::to_string).collect())
    }

    fn roundtrip(&mut self, request: &Request) -> Result<Response> {
        let mut payload = serde_json::to_vec(request)?;
        payload.push(b'\n');
        self.writer.write_all(&payload)?;

        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Err(anyhow!("server closed the connection"));
        }
        serde_json::from_str(line.trim()).context("invalid response from server")
    }
}
