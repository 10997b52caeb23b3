//! This is the main entry point for comment-monitor.

use std::process::ExitCode;

use comment_monitor::cli;

fn main() -> ExitCode {
    match cli::parse(None) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
