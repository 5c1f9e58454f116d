//! `pkgverify verify` – download a descriptor's artifacts and check their digests.

use anyhow::Result;
use pkgverify_core::config::PkgVerifyConfig;
use pkgverify_core::fetch::{CurlTransport, FetchOptions};
use pkgverify_core::verify::{PackageOutcome, VerificationReport, Verifier, VerifyError};
use std::path::Path;

pub fn run_verify(cfg: &PkgVerifyConfig, path: &Path, download_dir: &Path) -> Result<bool> {
    let transport = CurlTransport::new(FetchOptions::from(&cfg.fetch));
    let verifier = Verifier::new(transport, download_dir);
    tracing::info!(
        path = %path.display(),
        download_dir = %download_dir.display(),
        "verify started"
    );

    match verifier.verify_path(path) {
        Ok(report) => {
            print_report(&report);
            Ok(report.verdict())
        }
        Err(VerifyError::Storage(e)) => Err(e.into()),
        Err(e) => {
            tracing::error!("{}", e);
            println!("Error: {}", e);
            Ok(false)
        }
    }
}

fn print_report(report: &VerificationReport) {
    for outcome in &report.outcomes {
        println!(
            "\nVerifying package: {}",
            outcome.package_name().unwrap_or("<unnamed>")
        );
        match outcome {
            PackageOutcome::Verified(r) => {
                println!("Expected SHA256: {}", r.expected_digest);
                println!("Actual SHA256:   {}", r.actual_digest);
                if r.matched {
                    println!("SHA256 verification successful!");
                } else {
                    println!("Error: SHA256 verification failed!");
                }
            }
            PackageOutcome::Failed { error, .. } => println!("Error: {}", error),
        }
    }
    if report.verdict() {
        println!("\nAll packages verified successfully!");
    } else {
        println!("\nError: One or more package verifications failed!");
    }
}
