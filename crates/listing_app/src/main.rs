mod cli;
mod config;
mod logging;
mod run;

use anyhow::Result;
use chrono::Local;
use clap::Parser;

use crate::cli::Cli;
use crate::config::{AppConfig, FileConfig};
use crate::logging::LogDestination;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(
        LogDestination::from_log_file(cli.log_file.as_deref()),
        logging::level(cli.verbose),
    );

    let file = match &cli.config {
        Some(path) => config::load(path)?,
        None => FileConfig::default(),
    };
    let config = AppConfig::resolve(&cli, file, Local::now().date_naive())?;

    let summary = run::run(config).await?;
    println!(
        "Finished collecting {} job postings into {} ({}).",
        summary.report.unique_records,
        summary.output.display(),
        run::describe(summary.report.reason)
    );
    if let Some(err) = &summary.report.last_error {
        println!("Last fetch error: {err}");
    }
    Ok(())
}
