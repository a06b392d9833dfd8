// src/main.rs

use std::process::ExitCode;

use fleetrun::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("fleetrun: failed to set up logging: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = run(args).await {
        eprintln!("fleetrun: {err:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
