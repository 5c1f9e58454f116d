//! Release-integrity checks for package descriptor catalogs.
//!
//! Two stages: [`validator`] lints descriptor XML (root tag, required fields,
//! version freshness) and [`verify`] downloads each listed artifact and
//! compares its SHA-256 with the declared digest. [`batch`] runs the linter
//! over every discovered document.

pub mod config;
pub mod logging;

pub mod batch;
pub mod checksum;
pub mod descriptor;
pub mod fetch;
pub mod finding;
pub mod freshness;
pub mod validator;
pub mod verify;
