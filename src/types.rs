//! Core result types for nzb-slurp

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one manifest file during a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Rejected by the selection predicate
    NotSelected,
    /// Output already present in the working directory
    AlreadyExists,
    /// Fetched and decoded (possibly with gaps)
    Downloaded,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileStatus::NotSelected => "not selected",
            FileStatus::AlreadyExists => "already exists",
            FileStatus::Downloaded => "downloaded",
        };
        f.write_str(s)
    }
}

/// Per-file outcome
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Display name taken from the subject
    pub name: String,
    /// Final status
    pub status: FileStatus,
    /// Segments listed in the manifest
    pub segments_total: usize,
    /// Segments whose fetch failed, leaving gaps in the output
    pub segments_missing: usize,
    /// Decoded output file, when one was produced
    pub output: Option<PathBuf>,
    /// Decoded bytes written
    pub bytes_written: u64,
}

impl FileReport {
    /// Report for a file that was not fetched.
    pub(crate) fn untouched(name: String, status: FileStatus, segments_total: usize) -> Self {
        Self {
            name,
            status,
            segments_total,
            segments_missing: 0,
            output: None,
            bytes_written: 0,
        }
    }

    /// Whether the output has gaps
    pub fn is_incomplete(&self) -> bool {
        self.segments_missing > 0
    }
}

/// Outcome of a whole run, one report per manifest file in processing order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Per-file reports
    pub files: Vec<FileReport>,
}

impl RunSummary {
    /// Files that were fetched and decoded in this run
    pub fn downloaded(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Downloaded)
    }

    /// Total segments that could not be fetched
    pub fn segments_missing(&self) -> usize {
        self.files.iter().map(|f| f.segments_missing).sum()
    }
}
