//! # nzb-slurp
//!
//! Fetch and reassemble yEnc-encoded Usenet binaries described by an NZB manifest.
//!
//! ## Pipeline
//!
//! For every selected file of the manifest, in order:
//! - segments are sorted and split into one contiguous chunk per worker
//! - each worker opens its own NNTP session and stores raw article bodies as
//!   scratch files named after their message-ids
//! - once every worker has finished, the scratch files are yEnc-decoded into a
//!   single output file and then removed
//!
//! A missing article leaves a gap in the output rather than failing the run.
//! Connection, authentication and group-selection failures are fatal.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nzb_slurp::{Config, Downloader, Nzb};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.server.host = "news.example.com".to_string();
//!     config.server.port = 563;
//!     config.server.tls = true;
//!     config.download.threads = 8;
//!
//!     let nzb = Nzb::open(Path::new("release.nzb"))?;
//!     std::fs::create_dir_all("release")?;
//!
//!     let downloader = Downloader::new(config)?;
//!     let summary = downloader.run(&nzb, Path::new("release")).await?;
//!     for file in &summary.files {
//!         println!("{}: {}", file.name, file.status);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Per-file download orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Logging setup for the binary
pub mod logging;
/// NNTP client
pub mod nntp;
/// NZB manifest model
pub mod nzb;
/// File selection by glob
pub mod selection;
/// Run and per-file reports
pub mod types;
/// Utility functions
pub mod utils;
/// yEnc codec and file reconstruction
pub mod yenc;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, SelectionConfig, ServerConfig};
pub use downloader::{ArticleSession, ArticleSource, Downloader, NntpArticleSource};
pub use error::{Error, NntpError, Result};
pub use nntp::NntpClient;
pub use nzb::{Meta, Nzb, NzbFile, Segment};
pub use selection::Selection;
pub use types::{FileReport, FileStatus, RunSummary};
