//! Core downloader implementation split into focused submodules.
//!
//! The [`Downloader`] walks a manifest file by file:
//! - [`download_task`] - Per-file fetch, join barrier, decode and cleanup
//! - [`progress`] - Byte-count aggregation and the status line
//!
//! Files are processed strictly one after another; workers only run concurrently
//! within a single file.

mod download_task;
pub mod progress;

pub use download_task::{ArticleSession, ArticleSource, NntpArticleSource};

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::nzb::Nzb;
use crate::selection::Selection;
use crate::types::{FileReport, FileStatus, RunSummary};

use download_task::{FileTaskParams, run_file_task};

/// Downloads every selected file of a manifest into a working directory
#[derive(Clone)]
pub struct Downloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    config: Arc<Config>,
    /// Compiled file selection
    selection: Selection,
    /// Where worker sessions come from
    source: Arc<dyn ArticleSource>,
}

impl Downloader {
    /// Create a downloader that fetches from the configured NNTP server.
    ///
    /// The configuration is validated before anything touches the network.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let source = Arc::new(NntpArticleSource::new(config.server.clone()));
        Self::with_source(config, source)
    }

    /// Create a downloader over a custom [`ArticleSource`].
    ///
    /// Server settings are ignored; thread count and selection are still checked.
    pub fn with_source(config: Config, source: Arc<dyn ArticleSource>) -> Result<Self> {
        if config.download.threads == 0 {
            return Err(Error::config(
                "download.threads",
                "thread count must be at least 1",
            ));
        }
        let selection = Selection::from_config(&config.selection)?;
        Ok(Self {
            config: Arc::new(config),
            selection,
            source,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Download every selected file of `nzb` into `work_dir`.
    ///
    /// The first fatal error (connection, authentication, group selection, scratch
    /// I/O or decode) stops the run after the current file's scratch has been purged.
    pub async fn run(&self, nzb: &Nzb, work_dir: &Path) -> Result<RunSummary> {
        let mut nzb = nzb.clone();
        if self.config.download.par2_last {
            nzb.par2_last();
        }

        let params = FileTaskParams {
            source: Arc::clone(&self.source),
            work_dir,
            threads: self.config.download.threads,
            show_progress: self.config.download.progress,
        };

        let count = nzb.files.len();
        let mut summary = RunSummary::default();

        for (index, file) in nzb.files.into_iter().enumerate() {
            let name = file.display_name();
            if !self.selection.accepts(&file) {
                tracing::debug!(file = %name, "Not selected");
                summary.files.push(FileReport::untouched(
                    name,
                    FileStatus::NotSelected,
                    file.segments.len(),
                ));
                continue;
            }

            tracing::info!(
                file = %name,
                index = index + 1,
                count,
                segments = file.segments.len(),
                "Processing file"
            );
            let report = run_file_task(&params, file).await?;
            summary.files.push(report);
        }

        Ok(summary)
    }
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("server", &self.config.server.address())
            .field("threads", &self.config.download.threads)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}
