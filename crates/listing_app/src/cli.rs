use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Crawl paginated job-search results into a CSV file.
#[derive(Parser, Debug, Default)]
#[command(name = "job-harvester", version, about)]
pub struct Cli {
    /// Job title to search for
    #[arg(long)]
    pub title: Option<String>,

    /// Location to search in
    #[arg(long)]
    pub location: Option<String>,

    /// Output CSV path [default: jobs_<YYYYMMDD>.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// How result pages are loaded
    #[arg(long, value_enum)]
    pub transport: Option<TransportKind>,

    /// Upper bound of the random pause between pages, in seconds
    #[arg(long)]
    pub max_delay_secs: Option<f64>,

    /// Scheme and host of the job board
    #[arg(long)]
    pub base_url: Option<String>,

    /// RON file supplying any of the settings above, plus email credentials
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Email the finished file using the credentials from --config
    #[arg(long, default_value_t = false)]
    pub email: bool,

    /// Show the browser window (browser transport only)
    #[arg(long, default_value_t = false)]
    pub headful: bool,

    /// Chrome/Chromium executable (browser transport only)
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Http,
    Browser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from([
            "job-harvester",
            "--title",
            "rust developer",
            "--location",
            "Charlotte NC",
            "--transport",
            "browser",
            "--max-delay-secs",
            "2.5",
            "--headful",
        ])
        .unwrap();

        assert_eq!(cli.title.as_deref(), Some("rust developer"));
        assert_eq!(cli.location.as_deref(), Some("Charlotte NC"));
        assert_eq!(cli.transport, Some(TransportKind::Browser));
        assert_eq!(cli.max_delay_secs, Some(2.5));
        assert!(cli.headful);
        assert!(!cli.email);
    }

    #[test]
    fn rejects_unknown_transport() {
        let result = Cli::try_parse_from(["job-harvester", "--transport", "carrier-pigeon"]);
        assert!(result.is_err());
    }
}
