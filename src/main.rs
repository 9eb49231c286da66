use std::process::ExitCode;

use clap::Parser;
use colored::{self, Colorize};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod document;
mod editor;
mod error;
mod kube;
mod patch;
mod terminal;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.run().await {
        Ok(cli::Outcome::Canceled) => {
            println!("canceled");
            ExitCode::SUCCESS
        }
        Ok(cli::Outcome::Submitted | cli::Outcome::DryRun) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("kj: {}", format!("{err:#}").red());
            ExitCode::FAILURE
        }
    }
}
