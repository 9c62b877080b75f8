//! NNTP client for a single connection.
//!
//! Every command is a strict request followed by one status line; the only
//! multi-line reply handled is the dot-terminated article body.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::NntpError;

use super::response::{Response, codes};

/// Byte stream an NNTP session can run over (plain TCP, TLS, or an in-memory pipe).
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Where a session is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Transport open, greeting not yet accepted
    Disconnected,
    /// Greeting received
    Connected,
    /// `AUTHINFO` accepted
    Authenticated,
    /// A newsgroup is selected
    GroupSelected,
    /// `QUIT` sent; no further commands allowed
    Closed,
}

/// NNTP client owning one server connection
pub struct NntpClient {
    stream: BufReader<Box<dyn Transport>>,
    state: SessionState,
}

impl std::fmt::Debug for NntpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NntpClient")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl NntpClient {
    /// Open a connection to `address` (`host:port`) and read the server greeting.
    ///
    /// With `use_tls` the session is wrapped in TLS, verifying the certificate
    /// against the host part of `address`.
    pub async fn connect(address: &str, use_tls: bool) -> Result<Self, NntpError> {
        tracing::debug!(address = %address, tls = use_tls, "Connecting to NNTP server");
        let connect_err = |reason: String| NntpError::Connect {
            address: address.to_string(),
            reason,
        };

        let tcp = TcpStream::connect(address)
            .await
            .map_err(|e| connect_err(e.to_string()))?;

        let transport: Box<dyn Transport> = if use_tls {
            let connector = tokio_native_tls::native_tls::TlsConnector::new()?;
            let tls = tokio_native_tls::TlsConnector::from(connector)
                .connect(host_of(address), tcp)
                .await
                .map_err(|e| connect_err(e.to_string()))?;
            Box::new(tls)
        } else {
            Box::new(tcp)
        };

        Self::with_transport(transport, address).await
    }

    /// Start a session over an already-open transport by reading the greeting.
    ///
    /// `address` only labels errors.
    pub async fn with_transport<T: Transport + 'static>(
        transport: T,
        address: &str,
    ) -> Result<Self, NntpError> {
        let mut client = Self {
            stream: BufReader::new(Box::new(transport)),
            state: SessionState::Disconnected,
        };

        let greeting = client.read_reply().await.map_err(|e| NntpError::Connect {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        if !greeting.is_greeting() {
            return Err(NntpError::Connect {
                address: address.to_string(),
                reason: format!("server refused session: {} {}", greeting.code, greeting.message),
            });
        }

        client.state = SessionState::Connected;
        tracing::debug!(address = %address, code = greeting.code, "Connected to NNTP server");
        Ok(client)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Authenticate with `AUTHINFO USER` / `AUTHINFO PASS`.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), NntpError> {
        for (command, expected) in [
            (format!("AUTHINFO USER {}", username), codes::PASSWORD_REQUIRED),
            (format!("AUTHINFO PASS {}", password), codes::AUTH_ACCEPTED),
        ] {
            match self.command(&command, expected).await {
                Ok(_) => {}
                Err(NntpError::UnexpectedReply { code, message, .. }) => {
                    return Err(NntpError::Auth { code, message });
                }
                Err(e) => return Err(e),
            }
        }

        self.state = SessionState::Authenticated;
        tracing::debug!(username = %username, "Authentication successful");
        Ok(())
    }

    /// Select the first newsgroup the server accepts, returning its name.
    pub async fn select_group(&mut self, candidates: &[String]) -> Result<String, NntpError> {
        for group in candidates {
            match self
                .command(&format!("GROUP {}", group), codes::GROUP_SELECTED)
                .await
            {
                Ok(_) => {
                    self.state = SessionState::GroupSelected;
                    return Ok(group.clone());
                }
                Err(NntpError::UnexpectedReply { code, message, .. }) => {
                    tracing::debug!(group = %group, code, message = %message, "Group rejected");
                }
                Err(e) => return Err(e),
            }
        }

        Err(NntpError::Group {
            candidates: candidates.to_vec(),
        })
    }

    /// Retrieve an article body by message-id (with or without angle brackets).
    ///
    /// The returned payload is un-dot-stuffed with every line terminated by LF.
    pub async fn fetch_body(&mut self, message_id: &str) -> Result<Vec<u8>, NntpError> {
        let bare = message_id.trim_start_matches('<').trim_end_matches('>');
        match self
            .command(&format!("BODY <{}>", bare), codes::BODY_FOLLOWS)
            .await
        {
            Ok(_) => self.read_dot_block().await,
            Err(NntpError::UnexpectedReply { code, message, .. }) => Err(NntpError::Fetch {
                message_id: bare.to_string(),
                code,
                message,
            }),
            Err(e) => Err(e),
        }
    }

    /// Send `QUIT` and release the transport.
    pub async fn close(mut self) -> Result<(), NntpError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        let result = self
            .command("QUIT", codes::CLOSING_CONNECTION)
            .await
            .map(|_| ());
        self.state = SessionState::Closed;
        if let Err(e) = self.stream.get_mut().shutdown().await {
            tracing::debug!(error = %e, "Transport shutdown failed");
        }
        result
    }

    async fn command(&mut self, line: &str, expected: u16) -> Result<Response, NntpError> {
        self.send(line).await?;
        let reply = self.read_reply().await?;
        if reply.code != expected {
            return Err(NntpError::UnexpectedReply {
                command: line.split(' ').next().unwrap_or(line).to_string(),
                expected,
                code: reply.code,
                message: reply.message,
            });
        }
        Ok(reply)
    }

    async fn send(&mut self, line: &str) -> Result<(), NntpError> {
        if self.state == SessionState::Closed {
            return Err(NntpError::Closed);
        }

        // Don't log passwords
        let logged = if line.starts_with("AUTHINFO PASS") {
            "AUTHINFO PASS ****"
        } else {
            line
        };
        tracing::debug!(command = %logged, "Sending NNTP command");

        let writer = self.stream.get_mut();
        writer.write_all(format!("{}\r\n", line).as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<Response, NntpError> {
        let mut line = Vec::new();
        if self.stream.read_until(b'\n', &mut line).await? == 0 {
            return Err(NntpError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }
        let reply = Response::parse(&line)?;
        tracing::trace!(code = reply.code, message = %reply.message, "Received NNTP response");
        Ok(reply)
    }

    async fn read_dot_block(&mut self) -> Result<Vec<u8>, NntpError> {
        let mut data = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.stream.read_until(b'\n', &mut line).await? == 0 {
                return Err(NntpError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed inside article body",
                )));
            }
            let content = line
                .strip_suffix(b"\n")
                .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
                .unwrap_or(&line);
            if content == b"." {
                break;
            }
            let content = if content.starts_with(b"..") {
                &content[1..]
            } else {
                content
            };
            data.extend_from_slice(content);
            data.push(b'\n');
        }
        Ok(data)
    }
}

/// Host part of a `host:port` address, without IPv6 brackets.
fn host_of(address: &str) -> &str {
    let host = match address.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => address,
    };
    host.trim_start_matches('[').trim_end_matches(']')
}
