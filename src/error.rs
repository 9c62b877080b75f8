//! Error types for nzb-slurp
//!
//! Errors fall into a few classes:
//! - Manifest and control-line parse failures (fatal to the requesting operation)
//! - Connection-establishment failures (connect, auth, group selection) which abort the run
//! - Per-segment fetch failures, which callers swallow so the file decodes with a gap
//! - Reconstruction I/O failures, fatal to the current file after scratch cleanup

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nzb-slurp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nzb-slurp
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "threads")
        key: Option<String>,
    },

    /// Malformed NZB manifest
    #[error("invalid NZB: {0}")]
    InvalidNzb(String),

    /// Malformed yEnc control line (`=ybegin`, `=ypart`, `=yend`)
    #[error("invalid yEnc control line: {0}")]
    ControlLine(String),

    /// NNTP protocol or connection error
    #[error("NNTP error: {0}")]
    Nntp(#[from] NntpError),

    /// I/O failure while reconstructing an output file from its scratch segments
    #[error("failed to decode {file}: {source}")]
    Decode {
        /// Display name of the file being reconstructed
        file: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a scratch file after decoding
    #[error("failed to remove scratch file {path}: {source}")]
    Purge {
        /// The scratch file that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker or blocking task panicked or was aborted
    #[error("task failed: {0}")]
    Task(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key.
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Task(e.to_string())
    }
}

/// NNTP client errors
///
/// [`Connect`](NntpError::Connect), [`Auth`](NntpError::Auth) and [`Group`](NntpError::Group)
/// mean no worker can make progress; everything reported by a body fetch is recoverable
/// at segment granularity.
#[derive(Debug, Error)]
pub enum NntpError {
    /// Could not open the transport or the server refused the session
    #[error("failed to connect to {address}: {reason}")]
    Connect {
        /// Server address (`host:port`)
        address: String,
        /// Why the connection failed
        reason: String,
    },

    /// Server rejected the credentials
    #[error("authentication failed: {code} {message}")]
    Auth {
        /// Status code returned by the server
        code: u16,
        /// Status text returned by the server
        message: String,
    },

    /// None of the candidate newsgroups could be selected
    #[error("no selectable newsgroup among [{}]", .candidates.join(", "))]
    Group {
        /// Groups that were tried, in order
        candidates: Vec<String>,
    },

    /// Article body could not be retrieved
    #[error("failed to fetch <{message_id}>: {code} {message}")]
    Fetch {
        /// Message-ID of the article
        message_id: String,
        /// Status code returned by the server
        code: u16,
        /// Status text returned by the server
        message: String,
    },

    /// Server replied with a status code other than the one the command requires
    #[error("{command}: expected {expected}, got {code} {message}")]
    UnexpectedReply {
        /// Command verb that was sent
        command: String,
        /// Expected status code
        expected: u16,
        /// Status code actually returned
        code: u16,
        /// Status text actually returned
        message: String,
    },

    /// Reply line could not be parsed as `NNN text`
    #[error("invalid NNTP response: {0}")]
    InvalidResponse(String),

    /// Command issued on a client that has already been closed
    #[error("connection closed")]
    Closed,

    /// TLS handshake or configuration failure
    #[error("TLS error: {0}")]
    Tls(#[from] tokio_native_tls::native_tls::Error),

    /// Transport I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NntpError {
    /// Whether this error belongs to the connection-establishment class.
    ///
    /// Fatal errors abort the whole run; anything else is scoped to one segment.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NntpError::Connect { .. }
                | NntpError::Auth { .. }
                | NntpError::Group { .. }
                | NntpError::Tls(_)
        )
    }
}
