//! Scripted NNTP server on localhost

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use super::fixtures::PostedFile;

/// What the fake server knows
#[derive(Clone, Default)]
pub struct ServerScript {
    /// Article bodies keyed by message-id (without brackets)
    pub articles: HashMap<String, Vec<u8>>,
    /// Groups that `GROUP` accepts
    pub groups: Vec<String>,
    /// Required `AUTHINFO` credentials, if any
    pub credentials: Option<(String, String)>,
}

impl ServerScript {
    /// Serve every article of `files` from `alt.binaries.test`.
    pub fn serving(files: &[&PostedFile]) -> Self {
        let mut articles = HashMap::new();
        for file in files {
            articles.extend(file.articles.clone());
        }
        Self {
            articles,
            groups: vec!["alt.binaries.test".to_string()],
            credentials: None,
        }
    }

    /// Forget an article so `BODY` answers 430.
    pub fn without_article(mut self, message_id: &str) -> Self {
        self.articles.remove(message_id);
        self
    }

    /// Require `AUTHINFO USER`/`PASS`.
    pub fn requiring_auth(mut self, user: &str, pass: &str) -> Self {
        self.credentials = Some((user.to_string(), pass.to_string()));
        self
    }
}

/// Running fake server
pub struct FakeServer {
    /// `host:port` to connect to
    pub address: String,
    /// Connections accepted so far
    pub connections: Arc<AtomicUsize>,
    /// `BODY` commands received so far
    pub body_requests: Arc<AtomicUsize>,
    /// Sessions that ended with `QUIT`
    pub quits: Arc<AtomicUsize>,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeServer {
    /// Bind to an ephemeral localhost port and start serving `script`.
    pub async fn start(script: ServerScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let connections = Arc::new(AtomicUsize::new(0));
        let body_requests = Arc::new(AtomicUsize::new(0));
        let quits = Arc::new(AtomicUsize::new(0));
        let script = Arc::new(script);

        let handle = {
            let connections = Arc::clone(&connections);
            let body_requests = Arc::clone(&body_requests);
            let quits = Arc::clone(&quits);
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    connections.fetch_add(1, Ordering::SeqCst);
                    let script = Arc::clone(&script);
                    let body_requests = Arc::clone(&body_requests);
                    let quits = Arc::clone(&quits);
                    tokio::spawn(async move {
                        let _ = serve(stream, &script, &body_requests, &quits).await;
                    });
                }
            })
        };

        Self {
            address,
            connections,
            body_requests,
            quits,
            handle,
        }
    }

    /// Host part of the address
    pub fn host(&self) -> String {
        self.address.rsplit_once(':').unwrap().0.to_string()
    }

    /// Port part of the address
    pub fn port(&self) -> u16 {
        self.address.rsplit_once(':').unwrap().1.parse().unwrap()
    }

    /// Number of accepted connections
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    stream: TcpStream,
    script: &ServerScript,
    body_requests: &AtomicUsize,
    quits: &AtomicUsize,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    writer.write_all(b"200 fake news server ready\r\n").await?;

    let mut user_ok = false;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let command = line.trim_end();
        let (verb, arg) = command.split_once(' ').unwrap_or((command, ""));

        match verb.to_ascii_uppercase().as_str() {
            "AUTHINFO" => {
                let (kind, value) = arg.split_once(' ').unwrap_or((arg, ""));
                let reply: &[u8] = match (kind.to_ascii_uppercase().as_str(), &script.credentials) {
                    ("USER", Some((user, _))) if value == user => {
                        user_ok = true;
                        b"381 password required\r\n"
                    }
                    ("USER", None) => b"281 no authentication needed\r\n",
                    ("PASS", Some((_, pass))) if user_ok && value == pass => {
                        b"281 authentication accepted\r\n"
                    }
                    _ => b"481 authentication rejected\r\n",
                };
                writer.write_all(reply).await?;
            }
            "GROUP" => {
                if script.groups.iter().any(|g| g == arg) {
                    writer
                        .write_all(format!("211 0 1 1 {}\r\n", arg).as_bytes())
                        .await?;
                } else {
                    writer.write_all(b"411 no such group\r\n").await?;
                }
            }
            "BODY" => {
                body_requests.fetch_add(1, Ordering::SeqCst);
                let id = arg.trim_start_matches('<').trim_end_matches('>');
                match script.articles.get(id) {
                    Some(body) => {
                        let mut reply = format!("222 0 <{}>\r\n", id).into_bytes();
                        reply.extend_from_slice(&dot_stuff(body));
                        reply.extend_from_slice(b".\r\n");
                        writer.write_all(&reply).await?;
                    }
                    None => writer.write_all(b"430 no such article\r\n").await?,
                }
            }
            "QUIT" => {
                quits.fetch_add(1, Ordering::SeqCst);
                writer.write_all(b"205 closing connection\r\n").await?;
                return Ok(());
            }
            _ => writer.write_all(b"500 unknown command\r\n").await?,
        }
    }
}

/// CRLF-terminate every line and double leading dots.
fn dot_stuff(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 16);
    let body = body.strip_suffix(b"\n").unwrap_or(body);
    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }
    out
}
