//! Minimal NNTP client.
//!
//! Supports exactly what a segment downloader needs: greeting, `AUTHINFO USER/PASS`,
//! `GROUP`, `BODY` and `QUIT`, over plain TCP or TLS.
//!
//! - [`client`] - connection lifecycle and commands
//! - [`response`] - status-line parsing and the codes the client checks for

pub mod client;
pub mod response;

pub use client::{NntpClient, SessionState, Transport};
pub use response::{Response, codes};
