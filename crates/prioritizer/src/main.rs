use clap::Parser;
use utils::version;

use prioritizer::app;
use prioritizer::config::{Cli, Commands};

#[tokio::main]
async fn main() {
    utils::logging::init();

    let cli = Cli::parse();

    tracing::info!("Starting prioritizer {}", &**version::VERSION);

    let result = match cli.command {
        Commands::Prioritize(prioritize_args) => app::run_prioritize(*prioritize_args).await,
        Commands::List(list_args) => app::run_list(list_args).await,
    };

    if let Err(report) = result {
        tracing::error!("{report:?}");
        std::process::exit(1);
    }
}
