mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gate_director::config::Config;

fn main() {
    let cli = cli::Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load_or_create_at(path),
        None => Config::load_or_create(),
    };
    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(cli, &config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
