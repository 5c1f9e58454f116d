//! Validation findings: one Success or Error outcome per check.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::descriptor::RequiredField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => f.write_str("Success"),
            Severity::Error => f.write_str("Error"),
        }
    }
}

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// The document could not be parsed as XML.
    Parse,
    /// The root element tag.
    RootTag,
    /// Presence of one required package field.
    Field(RequiredField),
    /// The package version against the active freshness policy.
    Freshness,
}

/// What a finding is about: a document and, when known, one package in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub path: PathBuf,
    pub package: Option<String>,
}

impl Subject {
    pub fn document(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            package: None,
        }
    }

    pub fn package(path: &Path, package: Option<&str>) -> Self {
        Self {
            path: path.to_path_buf(),
            package: package.map(str::to_string),
        }
    }
}

/// One validation outcome. Findings are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub check: Check,
    pub subject: Subject,
    pub message: String,
}

impl Finding {
    pub fn success(check: Check, subject: Subject, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            check,
            subject,
            message: message.into(),
        }
    }

    pub fn error(check: Check, subject: Subject, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            check,
            subject,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Emit this finding to the log at a level matching its severity.
    pub fn log(&self) {
        let path = self.subject.path.display();
        let package = self.subject.package.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Success => {
                tracing::debug!(check = ?self.check, %path, package, "{}", self.message)
            }
            Severity::Error => {
                tracing::warn!(check = ?self.check, %path, package, "{}", self.message)
            }
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// True when no finding in `findings` is an Error.
pub fn all_valid<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> bool {
    !findings.into_iter().any(Finding::is_error)
}
