//! CLI for pkgverify.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pkgverify_core::config;
use pkgverify_core::freshness::{CalendarDay, FreshnessPolicy};
use std::path::PathBuf;

use commands::{run_checksum, run_lint, run_verify, LintArgs};

/// Top-level CLI for pkgverify.
#[derive(Debug, Parser)]
#[command(name = "pkgverify")]
#[command(about = "Lint package descriptor catalogs and verify artifact checksums", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/pkgverify/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Validate structure and version freshness of every descriptor found.
    Lint {
        /// Directories to scan for *.xml descriptors (default: scan_dirs from config).
        dirs: Vec<PathBuf>,
        /// Freshness policy: contains-today or matches-last-modified.
        #[arg(long, value_name = "POLICY")]
        policy: Option<FreshnessPolicy>,
        /// Treat this day as today instead of reading the clock.
        #[arg(long, value_name = "YYYYMMDD")]
        today: Option<CalendarDay>,
        /// Use this day as every document's last-modified day instead of asking git.
        #[arg(long, value_name = "YYYYMMDD")]
        reference: Option<CalendarDay>,
    },

    /// Download every package of a descriptor and check its SHA-256.
    Verify {
        /// Descriptor to verify (default: verify_target from config).
        path: Option<PathBuf>,
        /// Directory artifacts are downloaded into (they are kept after the run).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    /// Parse arguments, run the command, and return whether everything passed.
    pub fn run_from_args() -> Result<bool> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Lint {
                dirs,
                policy,
                today,
                reference,
            } => run_lint(
                &cfg,
                LintArgs {
                    dirs,
                    policy,
                    today,
                    reference,
                },
            ),
            CliCommand::Verify { path, download_dir } => {
                let path = path.unwrap_or_else(|| cfg.verify_target.clone());
                let download_dir = match download_dir.or_else(|| cfg.download_dir.clone()) {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_verify(&cfg, &path, &download_dir)
            }
            CliCommand::Checksum { path } => run_checksum(&path),
        }
    }
}

#[cfg(test)]
mod tests;
