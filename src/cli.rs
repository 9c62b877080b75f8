//! Command-line interface for `slurp`.

use std::path::PathBuf;

use clap::Parser;
use nzb_slurp::{Config, Result};

/// Implicit TLS port used when `--ssl` is given without a port
const NNTPS_PORT: u16 = 563;

/// Download the files of an NZB manifest from a Usenet server.
///
/// Output goes to a directory named after the manifest (without `.nzb`),
/// created in the current directory.
#[derive(Debug, Parser)]
#[command(name = "slurp", version)]
#[command(about = "Fetch and decode yEnc binaries described by an NZB file", long_about = None)]
pub struct Cli {
    /// NZB manifest to download.
    pub nzb: PathBuf,

    /// TOML config file; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// NNTP server hostname.
    #[arg(short = 's', long = "server", value_name = "HOST")]
    pub host: Option<String>,

    /// NNTP server port (default 119, or 563 with --ssl).
    #[arg(long, value_name = "N")]
    pub port: Option<u16>,

    /// Use TLS.
    #[arg(long)]
    pub ssl: bool,

    /// Username; authentication is skipped without one.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password.
    #[arg(short, long, env = "NNTP_PASSWORD", hide_env_values = true)]
    pub pass: Option<String>,

    /// Parallel connections per file.
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Select files whose name matches GLOB (repeatable).
    #[arg(short = 'e', long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,

    /// Select files matching none of the patterns instead.
    #[arg(short = 'v', long)]
    pub invert: bool,

    /// Only download PAR2 files.
    #[arg(long)]
    pub par2_only: bool,

    /// Download PAR2 files after everything else.
    #[arg(long)]
    pub par2_last: bool,

    /// No progress line; warnings and errors only.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Load the config file (if any) and apply flag overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        let server = &mut config.server;
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if self.ssl {
            server.tls = true;
            if self.port.is_none() && server.port == 119 {
                server.port = NNTPS_PORT;
            }
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(user) = &self.user {
            server.username = Some(user.clone());
        }
        if let Some(pass) = &self.pass {
            server.password = Some(pass.clone());
        }

        if let Some(threads) = self.threads {
            config.download.threads = threads;
        }
        if self.quiet {
            config.download.progress = false;
        }
        config.download.par2_last |= self.par2_last;

        if !self.patterns.is_empty() {
            config.selection.patterns = self.patterns.clone();
        }
        config.selection.invert |= self.invert;
        config.selection.par2_only |= self.par2_only;
    }
}
