//! Descriptor validation: root tag, required fields, version freshness.
//!
//! Every check yields a [`Finding`]. Only malformed XML stops the checks for
//! a document; a wrong root tag or a missing field is recorded and the
//! remaining checks still run.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::descriptor::{Catalog, PackageEntry, RequiredField, Scope, ROOT_TAG};
use crate::finding::{self, Check, Finding, Subject};
use crate::freshness::{CalendarDay, Freshness, FreshnessPolicy, ReferenceDateProvider};

/// Progress of one document through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unparsed,
    /// Malformed XML; no further checks ran.
    ParseFailed,
    Parsed,
    StructureChecked,
    PackagesChecked,
    /// All checks ran.
    FreshnessChecked,
}

impl DocumentState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DocumentState::ParseFailed | DocumentState::FreshnessChecked
        )
    }
}

/// Findings for one document, in the order the checks produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub state: DocumentState,
    pub findings: Vec<Finding>,
}

impl DocumentReport {
    pub fn is_valid(&self) -> bool {
        finding::all_valid(&self.findings)
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    fn advance(&mut self, next: DocumentState) {
        tracing::trace!(path = %self.path.display(), from = ?self.state, to = ?next, "document state");
        self.state = next;
    }
}

/// Validates descriptor documents under one freshness policy.
///
/// `today` is injected rather than read from the clock so runs are
/// reproducible; the reference provider is only consulted when the policy
/// needs it, at most once per document.
#[derive(Debug, Clone)]
pub struct DescriptorValidator<P> {
    policy: FreshnessPolicy,
    today: CalendarDay,
    reference: P,
}

impl<P: ReferenceDateProvider> DescriptorValidator<P> {
    pub fn new(policy: FreshnessPolicy, today: CalendarDay, reference: P) -> Self {
        Self {
            policy,
            today,
            reference,
        }
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    /// Read and validate the document at `path`.
    ///
    /// Fails only when the file cannot be read at all. Malformed content is
    /// reported as a single Error finding.
    pub fn validate(&self, path: &Path) -> Result<DocumentReport> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let report = match String::from_utf8(bytes) {
            Ok(text) => self.validate_text(path, &text),
            Err(e) => parse_failed(path, &format!("invalid UTF-8: {}", e.utf8_error())),
        };
        Ok(report)
    }

    /// Validate already-loaded document text attributed to `path`.
    pub fn validate_text(&self, path: &Path, text: &str) -> DocumentReport {
        let mut report = DocumentReport {
            path: path.to_path_buf(),
            state: DocumentState::Unparsed,
            findings: Vec::new(),
        };

        let catalog = match Catalog::parse(text, Scope::Children) {
            Ok(c) => c,
            Err(e) => return parse_failed(path, &e.to_string()),
        };
        report.advance(DocumentState::Parsed);

        report.findings.push(check_root(path, &catalog));
        report.advance(DocumentState::StructureChecked);

        for entry in catalog.packages() {
            check_fields(path, entry, &mut report.findings);
        }
        report.advance(DocumentState::PackagesChecked);

        self.check_freshness(path, catalog.packages(), &mut report.findings);
        report.advance(DocumentState::FreshnessChecked);

        report
    }

    fn check_freshness(&self, path: &Path, packages: &[PackageEntry], out: &mut Vec<Finding>) {
        if packages.is_empty() {
            return;
        }
        let expected = if self.policy.needs_reference() {
            self.reference.reference_date(path).map_err(|e| e.to_string())
        } else {
            Ok(self.today.clone())
        };

        for entry in packages {
            let subject = Subject::package(path, entry.name());
            let label = package_label(entry.name());
            let expected = match &expected {
                Ok(day) => day,
                Err(reason) => {
                    out.push(Finding::error(
                        Check::Freshness,
                        subject,
                        format!(
                            "Cannot check version freshness for {} in {}: {}",
                            label,
                            path.display(),
                            reason
                        ),
                    ));
                    continue;
                }
            };
            let Some(version) = entry.version.as_deref() else {
                out.push(Finding::error(
                    Check::Freshness,
                    subject,
                    format!(
                        "Cannot check version freshness for {} in {}: no version",
                        label,
                        path.display()
                    ),
                ));
                continue;
            };
            out.push(freshness_finding(
                self.policy,
                version,
                expected,
                subject,
                &label,
                path,
            ));
        }
    }
}

fn parse_failed(path: &Path, reason: &str) -> DocumentReport {
    DocumentReport {
        path: path.to_path_buf(),
        state: DocumentState::ParseFailed,
        findings: vec![Finding::error(
            Check::Parse,
            Subject::document(path),
            format!("XML parsing error in {}: {}", path.display(), reason),
        )],
    }
}

fn check_root(path: &Path, catalog: &Catalog) -> Finding {
    let subject = Subject::document(path);
    if catalog.has_expected_root() {
        Finding::success(
            Check::RootTag,
            subject,
            format!("Root element is '{}' in {}", ROOT_TAG, path.display()),
        )
    } else {
        Finding::error(
            Check::RootTag,
            subject,
            format!(
                "Root element should be '{}' in {}, found '{}'",
                ROOT_TAG,
                path.display(),
                catalog.root_tag()
            ),
        )
    }
}

fn check_fields(path: &Path, entry: &PackageEntry, out: &mut Vec<Finding>) {
    let label = package_label(entry.name());
    for field in RequiredField::ALL {
        let subject = Subject::package(path, entry.name());
        let finding = if entry.get(field).is_some() {
            Finding::success(
                Check::Field(field),
                subject,
                format!("Found '{}' in {} in {}", field, label, path.display()),
            )
        } else {
            Finding::error(
                Check::Field(field),
                subject,
                format!("Missing '{}' in {} in {}", field, label, path.display()),
            )
        };
        out.push(finding);
    }
}

fn freshness_finding(
    policy: FreshnessPolicy,
    version: &str,
    expected: &CalendarDay,
    subject: Subject,
    label: &str,
    path: &Path,
) -> Finding {
    let fresh = policy.evaluate(version, expected) == Freshness::Fresh;
    let message = match (policy, fresh) {
        (FreshnessPolicy::ContainsToday, true) => format!(
            "Version '{}' contains current date {} for {} in {}",
            version,
            expected,
            label,
            path.display()
        ),
        (FreshnessPolicy::ContainsToday, false) => format!(
            "Version '{}' does not contain current date {} for {} in {}",
            version,
            expected,
            label,
            path.display()
        ),
        (FreshnessPolicy::MatchesLastModified, true) => format!(
            "Version '{}' matches last modification date {} for {} in {}",
            version,
            expected,
            label,
            path.display()
        ),
        (FreshnessPolicy::MatchesLastModified, false) => format!(
            "Version '{}' does not match last modification date {} for {} in {}",
            version,
            expected,
            label,
            path.display()
        ),
    };
    if fresh {
        Finding::success(Check::Freshness, subject, message)
    } else {
        Finding::error(Check::Freshness, subject, message)
    }
}

fn package_label(name: Option<&str>) -> String {
    match name {
        Some(n) => format!("package '{}'", n),
        None => "a package".to_string(),
    }
}
