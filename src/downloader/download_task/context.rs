//! Download task context: article source seam and per-file shared state.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::{NntpError, Result};
use crate::nntp::NntpClient;
use crate::nzb::NzbFile;

/// Abstraction over opening NNTP sessions, enabling testability.
///
/// Each worker opens its own session, which must already have a group selected.
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Connect, authenticate and select the first accepted group from `groups`.
    async fn open_session(
        &self,
        groups: &[String],
    ) -> std::result::Result<Box<dyn ArticleSession>, NntpError>;
}

/// One open session, owned by a single worker.
#[async_trait::async_trait]
pub trait ArticleSession: Send {
    /// Retrieve the raw (still yEnc-encoded) body of an article.
    async fn fetch_body(&mut self, message_id: &str) -> std::result::Result<Vec<u8>, NntpError>;

    /// End the session.
    async fn close(self: Box<Self>) -> std::result::Result<(), NntpError>;
}

/// Production [`ArticleSource`] that opens a fresh connection to the configured server.
pub struct NntpArticleSource {
    server: ServerConfig,
}

impl NntpArticleSource {
    /// Source for `server`.
    pub fn new(server: ServerConfig) -> Self {
        Self { server }
    }
}

#[async_trait::async_trait]
impl ArticleSource for NntpArticleSource {
    async fn open_session(
        &self,
        groups: &[String],
    ) -> std::result::Result<Box<dyn ArticleSession>, NntpError> {
        let mut client = NntpClient::connect(&self.server.address(), self.server.tls).await?;

        let setup = async {
            if let Some(username) = &self.server.username {
                let password = self.server.password.as_deref().unwrap_or_default();
                client.authenticate(username, password).await?;
            }
            client.select_group(groups).await
        }
        .await;

        match setup {
            Ok(group) => {
                tracing::debug!(group = %group, "Session ready");
                Ok(Box::new(client))
            }
            Err(e) => {
                if let Err(close_err) = client.close().await {
                    tracing::debug!(error = %close_err, "Failed to close rejected session");
                }
                Err(e)
            }
        }
    }
}

#[async_trait::async_trait]
impl ArticleSession for NntpClient {
    async fn fetch_body(&mut self, message_id: &str) -> std::result::Result<Vec<u8>, NntpError> {
        NntpClient::fetch_body(self, message_id).await
    }

    async fn close(self: Box<Self>) -> std::result::Result<(), NntpError> {
        NntpClient::close(*self).await
    }
}

/// What one worker achieved for its chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct WorkerOutcome {
    /// Segments fetched and written to scratch
    pub(crate) fetched: usize,
    /// Segments skipped because their fetch failed
    pub(crate) failed: usize,
}

/// Shared state for downloading a single file.
///
/// Built fresh per file and consumed by [`join_workers`](Self::join_workers), so the
/// byte-count sender and worker set never outlive the file.
pub(crate) struct FileTaskContext {
    pub(crate) file: Arc<NzbFile>,
    pub(crate) work_dir: Arc<PathBuf>,
    pub(crate) source: Arc<dyn ArticleSource>,
    pub(crate) progress_tx: mpsc::UnboundedSender<u64>,
    pub(crate) workers: JoinSet<Result<WorkerOutcome>>,
    pub(crate) cancel_token: CancellationToken,
}

impl FileTaskContext {
    pub(crate) fn new(
        file: Arc<NzbFile>,
        work_dir: PathBuf,
        source: Arc<dyn ArticleSource>,
        progress_tx: mpsc::UnboundedSender<u64>,
    ) -> Self {
        Self {
            file,
            work_dir: Arc::new(work_dir),
            source,
            progress_tx,
            workers: JoinSet::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Wait for every worker (the join barrier).
    ///
    /// The first fatal error cancels the remaining workers, which stop at their next
    /// segment boundary; it is returned once all of them have finished.
    pub(crate) async fn join_workers(self) -> Result<WorkerOutcome> {
        let Self {
            file,
            mut workers,
            cancel_token,
            progress_tx,
            ..
        } = self;
        // Workers hold their own senders; ours must go so the progress task can end.
        drop(progress_tx);

        let mut total = WorkerOutcome::default();
        let mut first_error = None;

        while let Some(joined) = workers.join_next().await {
            let result = joined.map_err(crate::error::Error::from).and_then(|r| r);
            match result {
                Ok(outcome) => {
                    total.fetched += outcome.fetched;
                    total.failed += outcome.failed;
                }
                Err(e) => {
                    if first_error.is_none() {
                        tracing::error!(
                            file = %file.display_name(),
                            error = %e,
                            "Worker failed, cancelling remaining workers"
                        );
                        cancel_token.cancel();
                        first_error = Some(e);
                    } else {
                        tracing::debug!(error = %e, "Additional worker failure after cancellation");
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }
}
