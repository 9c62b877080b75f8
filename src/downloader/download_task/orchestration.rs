//! Download task orchestration: top-level lifecycle for a single file.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::nzb::NzbFile;
use crate::types::{FileReport, FileStatus};

use super::super::progress::spawn_progress_reporter;
use super::batching::{partition, spawn_workers};
use super::context::{ArticleSource, FileTaskContext};
use super::finalization::{decode_and_purge, output_path, purge_scratch};

/// Settings that stay fixed for every file of a run.
pub(crate) struct FileTaskParams<'a> {
    pub(crate) source: Arc<dyn ArticleSource>,
    pub(crate) work_dir: &'a Path,
    pub(crate) threads: usize,
    pub(crate) show_progress: bool,
}

/// Download and decode one file.
///
/// Phases:
/// 1. Skip if the output already exists
/// 2. Sort segments and split them into one chunk per worker
/// 3. Fetch all chunks in parallel, reporting progress
/// 4. Wait for every worker; on a fatal error purge scratch and return it
/// 5. Decode scratch into the output and purge scratch, never appending to an
///    output that already existed
pub(crate) async fn run_file_task(params: &FileTaskParams<'_>, mut file: NzbFile) -> Result<FileReport> {
    let name = file.display_name();
    let segments_total = file.segments.len();

    // Phase 1: Idempotency
    if let Some(existing) = output_path(params.work_dir, &name)
        && tokio::fs::try_exists(&existing).await.unwrap_or(false)
    {
        tracing::info!(file = %name, "Output already exists, skipping");
        return Ok(FileReport::untouched(
            name,
            FileStatus::AlreadyExists,
            segments_total,
        ));
    }

    // Phase 2: Partition
    file.sort_segments();
    let total_size = file.total_size();
    let ranges = partition(segments_total, params.threads);
    let file = Arc::new(file);

    // Phase 3: Fetch
    let (progress_tx, progress_rx) = tokio::sync::mpsc::unbounded_channel();
    let progress_task = spawn_progress_reporter(total_size, progress_rx, params.show_progress);

    let mut ctx = FileTaskContext::new(
        Arc::clone(&file),
        params.work_dir.to_path_buf(),
        Arc::clone(&params.source),
        progress_tx,
    );
    spawn_workers(&mut ctx, ranges);

    // Phase 4: Join barrier
    let joined = ctx.join_workers().await;
    let received = match progress_task.await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Progress reporter ended abnormally");
            0
        }
    };

    let outcome = match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Err(purge_err) = purge_scratch(&file, params.work_dir).await {
                tracing::error!(file = %name, error = %purge_err, "Scratch cleanup failed");
            }
            return Err(e);
        }
    };

    // Phase 5: Decode and purge
    let report = decode_and_purge(Arc::clone(&file), params.work_dir).await?;

    // The display name can differ from the yEnc header name
    if report.already_exists {
        tracing::info!(file = %name, "Output named by the yEnc header already exists, kept as is");
        return Ok(FileReport {
            output: report.output,
            ..FileReport::untouched(name, FileStatus::AlreadyExists, segments_total)
        });
    }

    if report.segments_missing > 0 {
        tracing::warn!(
            file = %name,
            segments_missing = report.segments_missing,
            fetch_failures = outcome.failed,
            segments_total,
            "File decoded with gaps"
        );
    }
    tracing::info!(
        file = %name,
        bytes = report.bytes_written,
        received,
        "File complete"
    );

    Ok(FileReport {
        name,
        status: FileStatus::Downloaded,
        segments_total,
        segments_missing: report.segments_missing,
        output: report.output,
        bytes_written: report.bytes_written,
    })
}
