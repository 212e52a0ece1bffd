use clap::Parser;
use cqrsgen::cli::{run_cli, Cli};
use cqrsgen::logging::{init_logging, LogConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LogConfig::from_env().verbose(cli.verbose)) {
        eprintln!("{e:#}");
    }

    match run_cli(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            let reason = format!("{e:#}");
            tracing::error!(error = %reason, "generation failed");
            ExitCode::FAILURE
        }
    }
}
