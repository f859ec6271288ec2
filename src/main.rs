mod auth;
mod cli;
mod config;
mod error;
mod output;
mod providers;
mod stats;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Outcome};
use log::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    output::print_banner();
    info!("Starting jenkins-stats");

    match cli.execute().await {
        Ok(Outcome::Exported(_)) => ExitCode::SUCCESS,
        Ok(Outcome::NoData) => ExitCode::FAILURE,
        Err(e) => {
            if cli.verbose {
                eprintln!("{} {e:?}", output::failure("Error:"));
            } else {
                eprintln!("{} {e:#}", output::failure("Error:"));
            }
            ExitCode::FAILURE
        }
    }
}
