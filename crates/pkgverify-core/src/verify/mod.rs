//! Artifact verification: download every package a descriptor lists and
//! compare its SHA-256 with the declared one.
//!
//! Package entries are collected at any depth. A failure in one entry
//! (missing field, fetch error, mismatch) is recorded and the next entry is
//! still checked. Only an empty catalog, an unreadable or malformed document,
//! or a local storage failure ends the run early.
//!
//! Downloaded artifacts stay in the download directory after the run as
//! `<sanitized packageName>_installer`; nothing is cleaned up.

mod naming;

use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum;
use crate::descriptor::{Catalog, MissingFields, PackageDescriptor, ParseError, Scope};
use crate::fetch::{Transport, TransportError};

pub use naming::{artifact_file_name, sanitize_package_name, ARTIFACT_SUFFIX};

/// Declared vs. computed digest for one downloaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub package_name: String,
    pub expected_digest: String,
    pub actual_digest: String,
    pub matched: bool,
    /// Where the artifact was stored.
    pub artifact: PathBuf,
}

/// Why one package entry could not be verified.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("incomplete package entry: {0}")]
    Incomplete(#[from] MissingFields),
    #[error("package name {0:?} cannot be used as a file name")]
    UnsafeName(String),
    #[error(transparent)]
    Transport(TransportError),
    #[error("cannot hash {}: {reason}", .path.display())]
    Digest { path: PathBuf, reason: String },
}

/// Errors that stop a verification run.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("file '{}' does not exist", .0.display())]
    MissingDocument(PathBuf),
    #[error("file '{}' is empty", .0.display())]
    EmptyDocument(PathBuf),
    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("XML parsing error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("no packages found in XML")]
    EmptyCatalog,
    #[error(transparent)]
    Storage(TransportError),
}

/// Result for one package entry, in document order.
#[derive(Debug)]
pub enum PackageOutcome {
    Verified(VerificationResult),
    Failed {
        package: Option<String>,
        error: PackageError,
    },
}

impl PackageOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, PackageOutcome::Verified(r) if r.matched)
    }

    pub fn package_name(&self) -> Option<&str> {
        match self {
            PackageOutcome::Verified(r) => Some(&r.package_name),
            PackageOutcome::Failed { package, .. } => package.as_deref(),
        }
    }
}

#[derive(Debug)]
pub struct VerificationReport {
    pub outcomes: Vec<PackageOutcome>,
}

impl VerificationReport {
    /// True when there is at least one entry and every entry matched.
    pub fn verdict(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(PackageOutcome::passed)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }
}

/// Downloads and hashes the packages of a descriptor.
#[derive(Debug, Clone)]
pub struct Verifier<T> {
    transport: T,
    download_dir: PathBuf,
}

impl<T: Transport> Verifier<T> {
    pub fn new(transport: T, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Deterministic storage path for a package's artifact.
    pub fn artifact_path(&self, package_name: &str) -> Result<PathBuf, PackageError> {
        artifact_file_name(package_name)
            .map(|name| self.download_dir.join(name))
            .ok_or_else(|| PackageError::UnsafeName(package_name.to_string()))
    }

    /// Load, parse and verify the descriptor at `path`.
    pub fn verify_path(&self, path: &Path) -> Result<VerificationReport, VerifyError> {
        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VerifyError::MissingDocument(path.to_path_buf()))
            }
            Err(source) => {
                return Err(VerifyError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if meta.len() == 0 {
            return Err(VerifyError::EmptyDocument(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| VerifyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "descriptor loaded");

        let catalog =
            Catalog::parse(&text, Scope::Descendants).map_err(|source| VerifyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        self.verify_catalog(&catalog)
    }

    /// Verify every package entry of a parsed catalog, in order.
    pub fn verify_catalog(&self, catalog: &Catalog) -> Result<VerificationReport, VerifyError> {
        if catalog.is_empty() {
            tracing::error!("no packages found in descriptor");
            return Err(VerifyError::EmptyCatalog);
        }
        fs::create_dir_all(&self.download_dir).map_err(|source| {
            VerifyError::Storage(TransportError::Storage {
                path: self.download_dir.clone(),
                source,
            })
        })?;

        let mut outcomes = Vec::with_capacity(catalog.packages().len());
        for entry in catalog.packages() {
            let outcome = match entry.to_descriptor() {
                Ok(package) => match self.verify_package(&package) {
                    Ok(result) => PackageOutcome::Verified(result),
                    Err(PackageError::Transport(e)) if e.is_storage() => {
                        return Err(VerifyError::Storage(e))
                    }
                    Err(error) => PackageOutcome::Failed {
                        package: Some(package.package_name().to_string()),
                        error,
                    },
                },
                Err(missing) => PackageOutcome::Failed {
                    package: entry.name().map(str::to_string),
                    error: missing.into(),
                },
            };
            if let PackageOutcome::Failed { package, error } = &outcome {
                tracing::error!(package = package.as_deref().unwrap_or("-"), "{}", error);
            }
            outcomes.push(outcome);
        }

        let report = VerificationReport { outcomes };
        tracing::info!(
            packages = report.outcomes.len(),
            failed = report.failed_count(),
            "verification finished"
        );
        Ok(report)
    }

    /// Fetch, hash and compare one package.
    pub fn verify_package(
        &self,
        package: &PackageDescriptor,
    ) -> Result<VerificationResult, PackageError> {
        let name = package.package_name();
        tracing::info!(package = name, "verifying package");

        let artifact = self.artifact_path(name)?;
        tracing::info!(package = name, url = package.url(), "downloading installer");
        self.transport
            .fetch(package.url(), &artifact)
            .map_err(PackageError::Transport)?;

        tracing::info!(package = name, "calculating SHA256 of the downloaded installer");
        let actual = checksum::sha256_path(&artifact).map_err(|e| PackageError::Digest {
            path: artifact.clone(),
            reason: format!("{:#}", e),
        })?;
        let matched = checksum::digests_match(package.sha256(), &actual);
        if matched {
            tracing::info!(package = name, digest = %actual, "SHA256 verification successful");
        } else {
            tracing::error!(
                package = name,
                expected = package.sha256(),
                actual = %actual,
                "SHA256 verification failed"
            );
        }

        Ok(VerificationResult {
            package_name: name.to_string(),
            expected_digest: package.sha256().to_string(),
            actual_digest: actual,
            matched,
            artifact,
        })
    }
}
