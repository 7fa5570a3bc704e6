//! # WAL -- Write-Ahead Log
//!
//! Durability record for the CobaltKV storage engine.
//!
//! Every write is appended here **before** the memtable is touched, so a
//! crash between the two leaves the entry recoverable. On startup the log
//! is replayed into a fresh memtable; after a successful flush the engine
//! truncates it (the flushed SSTable now carries the data).
//!
//! ## Record format
//!
//! One text record per line:
//!
//! ```text
//! {key}:{value}\n
//! ```
//!
//! The key may not contain `':'` (the engine rejects such keys up front),
//! so the first colon on a line always terminates the key. Appends return
//! once the write syscall has succeeded; durability beyond OS buffering is
//! intentionally not provided (no fsync).

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the log within the engine's output directory.
pub const WAL_FILE_NAME: &str = "wal.log";

/// Errors that can occur during WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A replayed line was not `key:value` (missing separator or the key
    /// bytes were not valid UTF-8).
    #[error("malformed wal record at line {line}")]
    Malformed { line: usize },
}

/// Append-only log writer.
///
/// Holds the file handle for the lifetime of the engine; records are
/// assembled in a reusable scratch buffer and written with a single
/// `write_all` call each.
pub struct Wal {
    file: File,
    path: PathBuf,
    buf: Vec<u8>,
}

impl Wal {
    /// Opens (or creates) the log at `path` in append mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            file,
            path,
            buf: Vec::with_capacity(256),
        })
    }

    /// Appends one `key:value\n` record.
    pub fn append(&mut self, key: &str, value: &[u8]) -> Result<(), WalError> {
        self.buf.clear();
        self.buf.extend_from_slice(key.as_bytes());
        self.buf.push(b':');
        self.buf.extend_from_slice(value);
        self.buf.push(b'\n');
        self.file.write_all(&self.buf)?;
        Ok(())
    }

    /// Resets the log to zero bytes.
    ///
    /// Called after a successful flush: the entries now live in an SSTable.
    /// The handle is opened in append mode, so subsequent writes land at
    /// the new (zero) end of file.
    pub fn truncate(&mut self) -> Result<(), WalError> {
        self.file.set_len(0)?;
        Ok(())
    }

    /// Path of the underlying log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Replays every complete record in the log at `path`, calling `apply` for
/// each `(key, value)` pair in append order.
///
/// # Termination
///
/// - Missing file -> `Ok(())` (fresh start, nothing to replay).
/// - Clean EOF -> `Ok(())`.
/// - Trailing bytes without a final newline (crash mid-append) -> the
///   partial record is ignored and replay returns `Ok(())`.
/// - A complete line without a `':'` separator, or a key that is not valid
///   UTF-8 -> `Err(WalError::Malformed)`.
pub fn replay<P, F>(path: P, mut apply: F) -> Result<(), WalError>
where
    P: AsRef<Path>,
    F: FnMut(&str, &[u8]),
{
    let file = match File::open(path.as_ref()) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(WalError::Io(e)),
    };
    let mut reader = BufReader::new(file);

    let mut line_buf = Vec::with_capacity(256);
    let mut line_no = 0usize;

    loop {
        line_buf.clear();
        let n = reader.read_until(b'\n', &mut line_buf)?;
        if n == 0 {
            return Ok(()); // clean EOF
        }
        if line_buf.last() != Some(&b'\n') {
            return Ok(()); // truncated tail, ignore the partial record
        }
        line_no += 1;

        let line = &line_buf[..line_buf.len() - 1];
        let sep = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(WalError::Malformed { line: line_no })?;

        let key = std::str::from_utf8(&line[..sep])
            .map_err(|_| WalError::Malformed { line: line_no })?;
        let value = &line[sep + 1..];

        apply(key, value);
    }
}

#[cfg(test)]
mod tests;
