//! Tests for the lint subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use pkgverify_core::freshness::FreshnessPolicy;
use std::path::PathBuf;

#[test]
fn cli_parse_lint_defaults() {
    match parse(&["pkgverify", "lint"]) {
        CliCommand::Lint {
            dirs,
            policy,
            today,
            reference,
        } => {
            assert!(dirs.is_empty());
            assert!(policy.is_none());
            assert!(today.is_none());
            assert!(reference.is_none());
        }
        _ => panic!("expected Lint"),
    }
}

#[test]
fn cli_parse_lint_overrides() {
    match parse(&[
        "pkgverify",
        "lint",
        "examples",
        "config",
        "--policy",
        "contains-today",
        "--today",
        "20240131",
        "--reference",
        "20240130",
    ]) {
        CliCommand::Lint {
            dirs,
            policy,
            today,
            reference,
        } => {
            assert_eq!(dirs, vec![PathBuf::from("examples"), PathBuf::from("config")]);
            assert_eq!(policy, Some(FreshnessPolicy::ContainsToday));
            assert_eq!(today.unwrap().as_str(), "20240131");
            assert_eq!(reference.unwrap().as_str(), "20240130");
        }
        _ => panic!("expected Lint with overrides"),
    }
}

#[test]
fn cli_parse_lint_rejects_bad_day() {
    assert!(Cli::try_parse_from(["pkgverify", "lint", "--today", "2024-01-31"]).is_err());
    assert!(Cli::try_parse_from(["pkgverify", "lint", "--policy", "weekly"]).is_err());
}

#[test]
fn cli_parse_global_config() {
    let cli = Cli::try_parse_from(["pkgverify", "lint", "--config", "/tmp/pv.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/pv.toml")));
}
