use pkgverify_core::logging;
use std::process::ExitCode;

mod cli;

use crate::cli::CliCommand;

fn main() -> ExitCode {
    // Log to the state dir when possible, stderr otherwise.
    logging::init();

    // Parse CLI and dispatch. Only this function turns a verdict into an exit status.
    match CliCommand::run_from_args() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("pkgverify error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
