//! Batch linting: discover descriptor documents and validate each in turn.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::finding::Finding;
use crate::freshness::ReferenceDateProvider;
use crate::validator::{DescriptorValidator, DocumentReport};

/// Extension (case-insensitive) of descriptor documents.
pub const DESCRIPTOR_EXTENSION: &str = "xml";

/// `*.xml` files directly inside each directory, sorted per directory.
///
/// Directories are visited in the given order. A directory that does not
/// exist is skipped with a warning.
pub fn discover(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "scan directory missing, skipped");
            continue;
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
            let path = entry
                .with_context(|| format!("list {}", dir.display()))?
                .path();
            if path.is_file() && is_descriptor(&path) {
                files.push(path);
            }
        }
        files.sort();
        tracing::debug!(dir = %dir.display(), count = files.len(), "descriptors discovered");
        found.extend(files);
    }
    Ok(found)
}

fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
}

/// Every document's report, in the order the documents were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// True when no document produced an Error finding.
    pub fn verdict(&self) -> bool {
        self.documents.iter().all(DocumentReport::is_valid)
    }

    /// All findings, grouped by document in input order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.documents.iter().flat_map(|d| d.findings.iter())
    }

    pub fn error_count(&self) -> usize {
        self.documents.iter().map(DocumentReport::error_count).sum()
    }
}

/// Validate each document in order.
///
/// Findings never stop the batch; only a document that cannot be read at
/// all does.
pub fn run<P: ReferenceDateProvider>(
    paths: &[PathBuf],
    validator: &DescriptorValidator<P>,
) -> Result<BatchReport> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let report = validator.validate(path)?;
        for finding in &report.findings {
            finding.log();
        }
        tracing::info!(
            path = %path.display(),
            state = ?report.state,
            errors = report.error_count(),
            "document validated"
        );
        documents.push(report);
    }
    let report = BatchReport { documents };
    tracing::info!(
        documents = report.documents.len(),
        errors = report.error_count(),
        valid = report.verdict(),
        "batch finished"
    );
    Ok(report)
}
