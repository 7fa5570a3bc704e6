//! # Server - CobaltKV TCP Front-End
//!
//! Exposes the storage engine over TCP with a newline-delimited JSON
//! protocol. One request per line, one response per line:
//!
//! ```text
//! -> {"operation":"SET","key":"fruit","value":"orange"}
//! <- {"success":true}
//! -> {"operation":"GET","key":"fruit"}
//! <- {"success":true,"data":"orange"}
//! -> {"operation":"LIST"}
//! <- {"success":true,"data":"fruit=orange"}
//! ```
//!
//! The engine sits behind an `Arc<parking_lot::RwLock<_>>`: SET takes the
//! write lock (writes are serialized), GET and LIST take the read lock
//! (lookups run concurrently). Each client connection is served by its own
//! thread.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::Client;
pub use protocol::{process, Request, Response};
pub use server::Server;
