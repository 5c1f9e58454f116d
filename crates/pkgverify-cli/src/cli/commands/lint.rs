//! `pkgverify lint` – validate every discovered descriptor document.

use anyhow::Result;
use pkgverify_core::batch::{self, BatchReport};
use pkgverify_core::config::PkgVerifyConfig;
use pkgverify_core::freshness::{CalendarDay, FixedReference, FreshnessPolicy, GitOrMtime};
use pkgverify_core::validator::DescriptorValidator;
use std::path::PathBuf;

/// Command-line overrides for the lint run.
#[derive(Debug, Default)]
pub struct LintArgs {
    pub dirs: Vec<PathBuf>,
    pub policy: Option<FreshnessPolicy>,
    pub today: Option<CalendarDay>,
    pub reference: Option<CalendarDay>,
}

pub fn run_lint(cfg: &PkgVerifyConfig, args: LintArgs) -> Result<bool> {
    let dirs = if args.dirs.is_empty() {
        cfg.scan_dirs.clone()
    } else {
        args.dirs
    };
    let policy = args.policy.unwrap_or(cfg.freshness);
    let today = args.today.unwrap_or_else(CalendarDay::today);
    tracing::info!(%policy, %today, dirs = ?dirs, "lint started");

    let paths = batch::discover(&dirs)?;
    if paths.is_empty() {
        tracing::warn!("no descriptor documents found");
    }

    let report = match args.reference {
        Some(day) => batch::run(
            &paths,
            &DescriptorValidator::new(policy, today, FixedReference(day)),
        )?,
        None => batch::run(&paths, &DescriptorValidator::new(policy, today, GitOrMtime))?,
    };

    print_report(&report);
    Ok(report.verdict())
}

fn print_report(report: &BatchReport) {
    for doc in &report.documents {
        println!("\nValidating {}:", doc.path.display());
        for finding in &doc.findings {
            println!("{}", finding);
        }
    }
    if report.verdict() {
        println!("\nAll XML files passed validation.");
    } else {
        println!("\nValidation failed. Please fix the errors above.");
    }
}
