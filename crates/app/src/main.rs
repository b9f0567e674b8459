//! Sonit Application CLI

use std::process;

use clap::Parser;
use sonit_app::{config, observability};
use tracing::error;

use crate::cli::Cli;

mod cli;

#[tokio::main]
pub async fn main() {
    config::load_dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init(&cli.config.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        error!("{error}");
        eprintln!("{error}");
        process::exit(1);
    }
}
