use replayer_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Console logging unless a log file was requested and could be opened.
    if !cli.log_file || logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli.run().await {
        eprintln!("replayer error: {:#}", err);
        std::process::exit(1);
    }
}
