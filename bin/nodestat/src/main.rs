use clap::Parser;
use cli::status::{handle_pid_file_command, handle_status_command};
use cli::{Cli, Commands};
use common::util::trace::initialize_tracing;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    if let Err(err) = initialize_tracing() {
        eprintln!("Failed to initialize tracing: {err:#}");
    }

    let args = Cli::parse();
    info!("nodestat started");

    let outcome = match args.command() {
        Commands::Status(args) => handle_status_command(args).await,
        Commands::PidFile(args) => handle_pid_file_command(args).await,
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
