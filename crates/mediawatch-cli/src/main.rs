use mediawatch_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr if the state dir is unusable.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("mediawatch error: {:#}", err);
        std::process::exit(1);
    }
}
