//! spotify-features - Main Entry Point
//!
//! Engineers hit-prediction features from a song table and previews which of
//! them track the target.

use clap::Parser;
use spotify_features::cli::{
    cmd_engineer, cmd_info, cmd_preview, cmd_sample, cmd_score, load_config, Cli, Commands,
};
use spotify_features::features::OutOfRange;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spotify_features=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Engineer { data, output, clamp_out_of_range }) => {
            if clamp_out_of_range {
                config = config.with_out_of_range(OutOfRange::Clamp);
            }
            cmd_engineer(&config, data.as_deref(), output.as_deref())?;
        }
        Some(Commands::Preview { data, target, top_k }) => {
            cmd_preview(&config, &data, target.as_deref(), top_k)?;
        }
        Some(Commands::Sample { output, rows, seed }) => {
            cmd_sample(&output, rows, seed)?;
        }
        Some(Commands::Score { danceability, energy, valence }) => {
            cmd_score(danceability, energy, valence)?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(&config, &data)?;
        }
        None => {
            // Default: full pipeline with discovered input and default output
            cmd_engineer(&config, None, None)?;
        }
    }

    Ok(())
}
