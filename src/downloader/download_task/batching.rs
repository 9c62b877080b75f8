//! Segment partitioning and worker spawning.

use std::ops::Range;
use std::sync::Arc;

use super::batch_processor::{FetchChunkParams, fetch_chunk};
use super::context::FileTaskContext;

/// Split `n` segments into contiguous chunks of `ceil(n / threads)`.
///
/// Yields at most `threads` ranges covering `0..n` exactly once, in order; the
/// last range may be shorter. No ranges are produced when `n` is zero.
pub(super) fn partition(n: usize, threads: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let chunk = n.div_ceil(threads.max(1));
    (0..n)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(n))
        .collect()
}

/// Spawn one worker per range into the context's join set.
pub(super) fn spawn_workers(ctx: &mut FileTaskContext, ranges: Vec<Range<usize>>) {
    for (worker, range) in ranges.into_iter().enumerate() {
        tracing::debug!(
            worker,
            first = range.start,
            end = range.end,
            "Spawning worker"
        );
        let params = FetchChunkParams {
            worker,
            file: Arc::clone(&ctx.file),
            range,
            work_dir: Arc::clone(&ctx.work_dir),
            source: Arc::clone(&ctx.source),
            progress_tx: ctx.progress_tx.clone(),
            cancel_token: ctx.cancel_token.clone(),
        };
        ctx.workers.spawn(fetch_chunk(params));
    }
}
