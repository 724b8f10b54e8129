use std::process::ExitCode;

use clap::Parser;

use berth::cli::{Cli, Command};
use berth::{commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init(&log_path, cli.log_directive());

    let command = cli.command.unwrap_or(Command::Console);
    tracing::info!(?command, "berth starting");
    let code = match commands::run(command, cli.yes) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "berth failed");
            eprintln!("berth: {err:#}");
            ExitCode::FAILURE
        }
    };
    tracing::info!("berth exited");
    code
}
