//! CLI command handlers. Each returns whether its checks passed.

mod checksum;
mod lint;
mod verify;

pub use checksum::run_checksum;
pub use lint::{run_lint, LintArgs};
pub use verify::run_verify;
