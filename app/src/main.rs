mod cli;
mod driver;
mod prompt;

use block_portrait_common::config::Config;
use clap::Parser;
use cli::Cli;
use prompt::StdinPrompt;
use tracing::{error, info, warn};

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        behavior_pack = config.paths.behavior_pack.display().to_string(),
        resource_pack = config.paths.resource_pack.display().to_string(),
        namespace = config.block.namespace,
        count = cli.count,
        "starting block-portrait"
    );

    let mut prompt = StdinPrompt::new();
    let mut capture = driver::capture_texture;
    if let Err(e) = driver::run(&cli, &config, &mut prompt, &mut capture) {
        let code = e.exit_code();
        if code == driver::ABORT_EXIT_CODE {
            warn!("capture aborted, exiting");
        } else {
            error!(error = %e, "block-portrait failed");
        }
        std::process::exit(code);
    }
}
