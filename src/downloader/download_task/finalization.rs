//! File finalization: decode scratch segments into the output, then purge them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::nzb::NzbFile;
use crate::utils::output_file_name;
use crate::yenc::{AssembleReport, assemble, scratch_path};

/// Rebuild the output from scratch, then purge scratch regardless of the decode outcome.
///
/// A decode error takes precedence over a purge error.
pub(super) async fn decode_and_purge(
    file: Arc<NzbFile>,
    work_dir: &Path,
) -> Result<AssembleReport> {
    let name = file.display_name();
    let decode = {
        let file = Arc::clone(&file);
        let dir = work_dir.to_path_buf();
        tokio::task::spawn_blocking(move || assemble(&file.segments, &dir)).await
    };
    let purge = purge_scratch(&file, work_dir).await;

    let report = decode?.map_err(|source| Error::Decode {
        file: name.clone(),
        source,
    })?;
    purge?;

    if let Some(output) = &report.output {
        tracing::debug!(
            file = %name,
            output = %output.display(),
            bytes = report.bytes_written,
            "Decoded file"
        );
    }
    Ok(report)
}

/// Delete every scratch file of `file`. Missing files are not an error.
pub(super) async fn purge_scratch(file: &NzbFile, work_dir: &Path) -> Result<()> {
    let mut first_error = None;
    for segment in &file.segments {
        let path = scratch_path(work_dir, &segment.message_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "Failed to remove scratch file");
                if first_error.is_none() {
                    first_error = Some(Error::Purge { path, source });
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Expected output location for a file, used for the idempotency check.
pub(super) fn output_path(work_dir: &Path, display_name: &str) -> Option<PathBuf> {
    output_file_name(display_name).map(|name| work_dir.join(name))
}
