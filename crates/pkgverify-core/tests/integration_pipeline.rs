//! Integration test: lint and verify descriptors whose artifacts are served
//! by a local HTTP server.

mod common;

use common::http_server::{self, Route};
use pkgverify_core::batch;
use pkgverify_core::checksum;
use pkgverify_core::fetch::CurlTransport;
use pkgverify_core::freshness::{CalendarDay, FixedReference, FreshnessPolicy};
use pkgverify_core::validator::DescriptorValidator;
use pkgverify_core::verify::{PackageError, PackageOutcome, Verifier};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn sha(body: &[u8]) -> String {
    checksum::sha256_reader(body).unwrap()
}

/// Entries are (packageName, version, url, sha256).
fn write_catalog(dir: &Path, name: &str, packages: &[(&str, &str, String, String)]) -> PathBuf {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<packages>\n");
    for (pkg, version, url, digest) in packages {
        xml.push_str(&format!(
            "  <package>\n    <packageName>{pkg}</packageName>\n    <version>{version}</version>\n    <sha256>{digest}</sha256>\n    <url>{url}</url>\n  </package>\n"
        ));
    }
    xml.push_str("</packages>\n");
    let path = dir.join(name);
    std::fs::write(&path, xml).unwrap();
    path
}

#[test]
fn fresh_complete_package_with_live_artifact_passes_both_stages() {
    let body: Vec<u8> = (0u8..=255).cycle().take(40_000).collect();
    let base = http_server::start(vec![("/tool.exe", Route::Body(body.clone()))]);
    let work = tempdir().unwrap();
    let doc = write_catalog(
        work.path(),
        "tool.xml",
        &[(
            "Vendor.Tool",
            "5.4.1-20240215",
            format!("{}/tool.exe", base),
            sha(&body),
        )],
    );

    let day: CalendarDay = "20240215".parse().unwrap();
    let validator = DescriptorValidator::new(
        FreshnessPolicy::MatchesLastModified,
        day.clone(),
        FixedReference(day),
    );
    let lint = batch::run(&[doc.clone()], &validator).unwrap();
    assert!(lint.verdict(), "{:?}", lint.documents[0].findings);

    let downloads = work.path().join("downloads");
    let verify = Verifier::new(CurlTransport::default(), &downloads)
        .verify_path(&doc)
        .unwrap();
    assert!(verify.verdict());
    assert_eq!(
        std::fs::read(downloads.join("Vendor.Tool_installer")).unwrap(),
        body
    );
}

#[test]
fn digest_mismatch_reports_both_digests_and_fails() {
    let served = b"actual artifact".to_vec();
    let declared = sha(b"expected artifact");
    let base = http_server::start(vec![("/a.msi", Route::Body(served.clone()))]);
    let work = tempdir().unwrap();
    let doc = write_catalog(
        work.path(),
        "a.xml",
        &[("a", "1-20240101", format!("{}/a.msi", base), declared.clone())],
    );

    let report = Verifier::new(CurlTransport::default(), work.path())
        .verify_path(&doc)
        .unwrap();

    assert!(!report.verdict());
    match &report.outcomes[0] {
        PackageOutcome::Verified(r) => {
            assert!(!r.matched);
            assert_eq!(r.expected_digest, declared);
            assert_eq!(r.actual_digest, sha(&served));
        }
        other => panic!("expected Verified, got {other:?}"),
    }
}

#[test]
fn unreachable_artifact_fails_only_its_package() {
    let good = b"good".to_vec();
    let base = http_server::start(vec![("/good", Route::Body(good.clone()))]);
    let work = tempdir().unwrap();
    let doc = write_catalog(
        work.path(),
        "mixed.xml",
        &[
            ("gone", "1-20240101", format!("{}/gone", base), sha(b"gone")),
            ("good", "1-20240101", format!("{}/good", base), sha(&good)),
        ],
    );

    let report = Verifier::new(CurlTransport::default(), work.path())
        .verify_path(&doc)
        .unwrap();

    assert!(!report.verdict());
    assert!(matches!(
        &report.outcomes[0],
        PackageOutcome::Failed {
            error: PackageError::Transport(_),
            ..
        }
    ));
    assert!(report.outcomes[1].passed());
    assert!(!work.path().join("gone_installer").exists());
}
