//! Tests for verify and checksum.

use super::parse;
use crate::cli::CliCommand;
use std::path::PathBuf;

#[test]
fn cli_parse_verify_default_target() {
    match parse(&["pkgverify", "verify"]) {
        CliCommand::Verify { path, download_dir } => {
            assert!(path.is_none());
            assert!(download_dir.is_none());
        }
        _ => panic!("expected Verify"),
    }
}

#[test]
fn cli_parse_verify_with_dir() {
    match parse(&[
        "pkgverify",
        "verify",
        "tests/test-autoconfig.xml",
        "--download-dir",
        "/tmp/artifacts",
    ]) {
        CliCommand::Verify { path, download_dir } => {
            assert_eq!(path, Some(PathBuf::from("tests/test-autoconfig.xml")));
            assert_eq!(download_dir, Some(PathBuf::from("/tmp/artifacts")));
        }
        _ => panic!("expected Verify with --download-dir"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["pkgverify", "checksum", "/tmp/file.bin"]) {
        CliCommand::Checksum { path } => assert_eq!(path, PathBuf::from("/tmp/file.bin")),
        _ => panic!("expected Checksum"),
    }
}
