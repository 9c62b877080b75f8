//! `slurp`: download the files of an NZB manifest into a directory named after it.

mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use nzb_slurp::utils::manifest_base_name;
use nzb_slurp::{Downloader, Nzb, Result, RunSummary};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    nzb_slurp::logging::init_logging(cli.quiet);

    match run(&cli).await {
        Ok(summary) => {
            let missing = summary.segments_missing();
            if missing > 0 {
                tracing::warn!(
                    segments_missing = missing,
                    files = summary.downloaded().filter(|f| f.is_incomplete()).count(),
                    "Some files were decoded with gaps"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Download failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.load_config()?;
    let downloader = Downloader::new(config)?;
    let nzb = Nzb::open(&cli.nzb)?;

    let work_dir = PathBuf::from(manifest_base_name(&cli.nzb));
    prepare_work_dir(&work_dir)?;
    println!("{}", work_dir.display());

    downloader.run(&nzb, &work_dir).await
}

/// Create the working directory; an existing one is reused.
fn prepare_work_dir(path: &Path) -> Result<()> {
    match std::fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => {
            tracing::debug!(path = %path.display(), "Reusing existing working directory");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
