//! Chunk-level article fetching: one session per worker, raw bodies written to scratch.

use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::nzb::NzbFile;
use crate::yenc::scratch_path;

use super::context::{ArticleSession, ArticleSource, WorkerOutcome};

/// Parameters for fetching one contiguous chunk of a file's segments
pub(super) struct FetchChunkParams {
    /// Worker index, for logging
    pub(super) worker: usize,
    /// File being downloaded (segments already sorted)
    pub(super) file: Arc<NzbFile>,
    /// Indices into `file.segments` owned by this worker
    pub(super) range: Range<usize>,
    /// Directory receiving scratch files
    pub(super) work_dir: Arc<PathBuf>,
    /// Session factory
    pub(super) source: Arc<dyn ArticleSource>,
    /// Advertised segment sizes, reported as each segment lands
    pub(super) progress_tx: mpsc::UnboundedSender<u64>,
    /// Cancelled when a sibling worker fails fatally
    pub(super) cancel_token: CancellationToken,
}

/// Fetch every segment in the chunk, writing raw bodies to scratch files.
///
/// Session setup failures and scratch write failures are fatal. Fetch failures
/// skip the segment. The session is closed on every path once it is open.
pub(super) async fn fetch_chunk(params: FetchChunkParams) -> Result<WorkerOutcome> {
    let FetchChunkParams {
        worker,
        file,
        range,
        work_dir,
        source,
        progress_tx,
        cancel_token,
    } = params;

    if cancel_token.is_cancelled() {
        return Ok(WorkerOutcome::default());
    }

    let mut session = source.open_session(&file.groups).await?;

    let result = fetch_segments(
        session.as_mut(),
        &file,
        range,
        &work_dir,
        &progress_tx,
        &cancel_token,
    )
    .await;

    if let Err(e) = session.close().await {
        tracing::debug!(worker, error = %e, "Failed to close session cleanly");
    }

    if let Ok(outcome) = &result {
        tracing::debug!(
            worker,
            fetched = outcome.fetched,
            failed = outcome.failed,
            "Worker finished"
        );
    }
    result
}

async fn fetch_segments(
    session: &mut dyn ArticleSession,
    file: &NzbFile,
    range: Range<usize>,
    work_dir: &std::path::Path,
    progress_tx: &mpsc::UnboundedSender<u64>,
    cancel_token: &CancellationToken,
) -> Result<WorkerOutcome> {
    let mut outcome = WorkerOutcome::default();

    for segment in &file.segments[range] {
        if cancel_token.is_cancelled() {
            tracing::debug!(segment = segment.number, "Cancelled, stopping before segment");
            break;
        }

        match session.fetch_body(&segment.message_id).await {
            Ok(body) => {
                tokio::fs::write(scratch_path(work_dir, &segment.message_id), &body).await?;
                outcome.fetched += 1;
                // Progress may already have finished; a closed receiver is fine.
                progress_tx.send(segment.bytes).ok();
            }
            Err(e) => {
                tracing::debug!(
                    segment = segment.number,
                    message_id = %segment.message_id,
                    error = %e,
                    "Segment fetch failed, skipping"
                );
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}
