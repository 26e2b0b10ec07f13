//! Wine-quality pipeline entry point

use clap::Parser;
use cuvee::cli::{cmd_predict, cmd_prepare, cmd_train, Cli, Commands};
use tracing::error;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cuvee=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Prepare { config } => cmd_prepare(&config),
        Commands::Train { config } => cmd_train(&config),
        Commands::Predict { config, output } => cmd_predict(&config, output.as_deref()),
    };

    if let Err(e) = result {
        error!(error = %e, "stage failed");
        std::process::exit(1);
    }
}
