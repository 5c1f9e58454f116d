//! Tracing setup. Events go to `$XDG_STATE_HOME/pkgverify/pkgverify.log`
//! when that file can be opened, otherwise to stderr.
//!
//! Findings are printed by the CLI; the log keeps the same events with
//! structured fields plus the fetch/hash steps behind them.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,pkgverify=debug,pkgverify_core=debug";

/// Where [`init`] sent the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    File(PathBuf),
    Stderr,
}

/// `pkgverify.log` under the XDG state dir, creating the directory.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("pkgverify").context("resolve XDG dirs")?;
    dirs.place_state_file("pkgverify.log")
        .context("create log directory")
}

fn open_append(path: &Path) -> io::Result<File> {
    fs::OpenOptions::new().create(true).append(true).open(path)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install<W>(writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    // A subscriber installed earlier (tests, embedding) wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}

/// Install the global subscriber. Never fails: an unusable state dir only
/// moves the log to stderr.
pub fn init() -> LogDestination {
    let opened = log_file_path().and_then(|path| {
        let file = open_append(&path).with_context(|| format!("open {}", path.display()))?;
        Ok((path, file))
    });
    match opened {
        Ok((path, file)) => {
            install(Mutex::new(file));
            tracing::info!(path = %path.display(), "logging to file");
            LogDestination::File(path)
        }
        Err(err) => {
            install(io::stderr);
            tracing::warn!("log file unavailable, using stderr: {:#}", err);
            LogDestination::Stderr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_valid() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn log_file_is_appended_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkgverify.log");
        fs::write(&path, "earlier run\n").unwrap();

        let mut file = open_append(&path).unwrap();
        io::Write::write_all(&mut file, b"next run\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier run\nnext run\n");
    }
}
