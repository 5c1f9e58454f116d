//! Version freshness: does a package's declared version carry the expected date?
//!
//! Two policies exist and are chosen in configuration:
//!
//! - `contains-today`: the version must contain today's `YYYYMMDD` anywhere.
//! - `matches-last-modified` (default): the last `-`-separated segment of the
//!   version must equal the day the descriptor document was last changed.
//!
//! The reference day for the second policy comes from a
//! [`ReferenceDateProvider`]; the default asks git and falls back to the
//! filesystem modification time.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

const DAY_FORMAT: &str = "%Y%m%d";

/// A calendar day rendered as `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDay(String);

impl CalendarDay {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DAY_FORMAT).to_string())
    }

    /// Today in the local timezone.
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid calendar day {0:?}: expected YYYYMMDD")]
pub struct CalendarDayError(pub String);

impl FromStr for CalendarDay {
    type Err = CalendarDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CalendarDayError(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Self::from_date)
            .map_err(|_| CalendarDayError(s.to_string()))
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a package version is judged current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreshnessPolicy {
    /// Today's date must appear somewhere in the version string.
    ContainsToday,
    /// The version's trailing date segment must equal the document's last-change day.
    #[default]
    MatchesLastModified,
}

impl FreshnessPolicy {
    /// Whether this policy needs a per-document reference day.
    pub fn needs_reference(self) -> bool {
        matches!(self, FreshnessPolicy::MatchesLastModified)
    }

    /// Check `version` against `expected` (today, or the document's reference day).
    pub fn evaluate(self, version: &str, expected: &CalendarDay) -> Freshness {
        let fresh = match self {
            FreshnessPolicy::ContainsToday => version.contains(expected.as_str()),
            FreshnessPolicy::MatchesLastModified => {
                version_date_segment(version) == expected.as_str()
            }
        };
        if fresh {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }
}

impl fmt::Display for FreshnessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreshnessPolicy::ContainsToday => f.write_str("contains-today"),
            FreshnessPolicy::MatchesLastModified => f.write_str("matches-last-modified"),
        }
    }
}

impl FromStr for FreshnessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains-today" => Ok(FreshnessPolicy::ContainsToday),
            "matches-last-modified" => Ok(FreshnessPolicy::MatchesLastModified),
            other => Err(format!(
                "unknown freshness policy {:?} (expected contains-today or matches-last-modified)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Last `-`-separated segment of a version (the whole string if there is no `-`).
pub fn version_date_segment(version: &str) -> &str {
    version.rsplit('-').next().unwrap_or(version)
}

/// Supplies the reference day a document's package versions are compared to.
pub trait ReferenceDateProvider {
    fn reference_date(&self, path: &Path) -> Result<CalendarDay, ReferenceError>;
}

impl<P: ReferenceDateProvider + ?Sized> ReferenceDateProvider for &P {
    fn reference_date(&self, path: &Path) -> Result<CalendarDay, ReferenceError> {
        (**self).reference_date(path)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cannot determine last modification of {}: {source}", .path.display())]
pub struct ReferenceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Git's last commit day for the file, else the filesystem modification day.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitOrMtime;

impl ReferenceDateProvider for GitOrMtime {
    fn reference_date(&self, path: &Path) -> Result<CalendarDay, ReferenceError> {
        if let Some(day) = git_last_changed(path) {
            tracing::debug!(path = %path.display(), %day, "reference day from git");
            return Ok(day);
        }
        let day = mtime_day(path).map_err(|source| ReferenceError {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), %day, "reference day from file mtime");
        Ok(day)
    }
}

/// Same reference day for every document.
#[derive(Debug, Clone)]
pub struct FixedReference(pub CalendarDay);

impl ReferenceDateProvider for FixedReference {
    fn reference_date(&self, _path: &Path) -> Result<CalendarDay, ReferenceError> {
        Ok(self.0.clone())
    }
}

/// `git log -1` commit day of `path` in the local timezone (same as the mtime
/// fallback), or None when git is missing, the file is not tracked, or the
/// output is not a day.
fn git_last_changed(path: &Path) -> Option<CalendarDay> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file = path.file_name()?;
    let output = Command::new("git")
        .args(["log", "-1", "--format=%cd", "--date=format-local:%Y%m%d", "--"])
        .arg(file)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}

fn mtime_day(path: &Path) -> io::Result<CalendarDay> {
    let modified = fs::metadata(path)?.modified()?;
    let local: DateTime<Local> = modified.into();
    Ok(CalendarDay::from_date(local.date_naive()))
}
