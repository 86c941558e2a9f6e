use std::process::ExitCode;

use confirm_dialog::cli::{self, EXIT_ERROR};
use confirm_dialog::log_error;

fn main() -> ExitCode {
    match cli::main() {
        Ok(code) => code,
        Err(e) => {
            log_error!("confirm-dialog failed: {:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
