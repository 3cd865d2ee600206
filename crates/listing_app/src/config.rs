//! Session configuration: an optional RON file overlaid by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use listing_core::{SearchQuery, DEFAULT_BASE_URL};
use listing_engine::{
    BrowserNavigation, BrowserSettings, EmailCredentials, MailSettings, DEFAULT_MAX_DELAY,
};
use serde::Deserialize;

use crate::cli::{Cli, TransportKind};

/// Contents of the `--config` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub title: Option<String>,
    pub location: Option<String>,
    pub base_url: Option<String>,
    pub output: Option<PathBuf>,
    pub max_delay_secs: Option<f64>,
    pub transport: Option<TransportKind>,
    pub browser: BrowserSection,
    pub email: Option<EmailCredentials>,
    pub smtp: MailSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    pub headless: Option<bool>,
    pub chrome_executable: Option<PathBuf>,
    pub navigation: Option<NavigationMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    Goto,
    ClickNext,
}

impl From<NavigationMode> for BrowserNavigation {
    fn from(mode: NavigationMode) -> Self {
        match mode {
            NavigationMode::Goto => BrowserNavigation::Goto,
            NavigationMode::ClickNext => BrowserNavigation::ClickNext,
        }
    }
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    ron::from_str(&content).with_context(|| format!("invalid config file {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct EmailHandoff {
    pub credentials: EmailCredentials,
    pub settings: MailSettings,
}

/// Fully resolved settings for one crawl session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub query: SearchQuery,
    pub base_url: String,
    pub output: PathBuf,
    pub max_delay: Duration,
    pub transport: TransportKind,
    pub browser: BrowserSettings,
    pub email: Option<EmailHandoff>,
}

impl AppConfig {
    /// Flags win over file values; `today` names the default output file.
    pub fn resolve(cli: &Cli, file: FileConfig, today: NaiveDate) -> Result<Self> {
        let Some(title) = cli.title.clone().or(file.title) else {
            bail!("no job title given (use --title or set `title` in the config file)");
        };
        let Some(location) = cli.location.clone().or(file.location) else {
            bail!("no location given (use --location or set `location` in the config file)");
        };

        let max_delay = match cli.max_delay_secs.or(file.max_delay_secs) {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid max delay {secs}"))?,
            None => DEFAULT_MAX_DELAY,
        };

        let mut browser = BrowserSettings::default();
        if let Some(headless) = file.browser.headless {
            browser.headless = headless;
        }
        if cli.headful {
            browser.headless = false;
        }
        browser.chrome_executable = cli.chrome.clone().or(file.browser.chrome_executable);
        if let Some(mode) = file.browser.navigation {
            browser.navigation = mode.into();
        }

        let email = if cli.email {
            let Some(credentials) = file.email else {
                bail!("--email needs an `email` credentials section in the config file");
            };
            Some(EmailHandoff {
                credentials,
                settings: file.smtp,
            })
        } else {
            None
        };

        Ok(Self {
            query: SearchQuery::new(title, location),
            base_url: cli
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output: cli
                .output
                .clone()
                .or(file.output)
                .unwrap_or_else(|| default_output(today)),
            max_delay,
            transport: cli.transport.or(file.transport).unwrap_or_default(),
            browser,
            email,
        })
    }
}

pub fn default_output(today: NaiveDate) -> PathBuf {
    PathBuf::from(format!("jobs_{}.csv", today.format("%Y%m%d")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn search_cli() -> Cli {
        Cli {
            title: Some("rust developer".to_string()),
            location: Some("Charlotte NC".to_string()),
            ..Cli::default()
        }
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = AppConfig::resolve(&search_cli(), FileConfig::default(), today()).unwrap();

        assert_eq!(config.query, SearchQuery::new("rust developer", "Charlotte NC"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output, PathBuf::from("jobs_20240309.csv"));
        assert_eq!(config.max_delay, DEFAULT_MAX_DELAY);
        assert_eq!(config.transport, TransportKind::Http);
        assert!(config.browser.headless);
        assert!(config.email.is_none());
    }

    #[test]
    fn flags_override_file_values() {
        let file: FileConfig = ron::from_str(
            r#"(
                title: Some("data engineer"),
                location: Some("Austin TX"),
                output: Some("from_file.csv"),
                max_delay_secs: Some(4.0),
                transport: Some(browser),
                browser: (headless: Some(true), navigation: Some(goto)),
            )"#,
        )
        .unwrap();
        let cli = Cli {
            title: Some("rust developer".to_string()),
            output: Some(PathBuf::from("from_flag.csv")),
            max_delay_secs: Some(0.5),
            headful: true,
            ..Cli::default()
        };

        let config = AppConfig::resolve(&cli, file, today()).unwrap();

        assert_eq!(config.query, SearchQuery::new("rust developer", "Austin TX"));
        assert_eq!(config.output, PathBuf::from("from_flag.csv"));
        assert_eq!(config.max_delay, Duration::from_millis(500));
        assert_eq!(config.transport, TransportKind::Browser);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.navigation, BrowserNavigation::Goto);
    }

    #[test]
    fn missing_title_is_an_error() {
        let cli = Cli {
            location: Some("Charlotte NC".to_string()),
            ..Cli::default()
        };
        let err = AppConfig::resolve(&cli, FileConfig::default(), today()).unwrap_err();
        assert!(err.to_string().contains("job title"));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let cli = Cli {
            max_delay_secs: Some(-1.0),
            ..search_cli()
        };
        assert!(AppConfig::resolve(&cli, FileConfig::default(), today()).is_err());
    }

    #[test]
    fn email_flag_requires_credentials() {
        let cli = Cli {
            email: true,
            ..search_cli()
        };
        let err = AppConfig::resolve(&cli, FileConfig::default(), today()).unwrap_err();
        assert!(err.to_string().contains("credentials"));
    }

    #[test]
    fn email_section_is_read_with_smtp_defaults() {
        let file: FileConfig = ron::from_str(
            r#"(
                email: Some((
                    username: "me@example.com",
                    password: "hunter2",
                    sender: "me@example.com",
                    recipient: "you@example.com",
                )),
                smtp: (subject: "Fresh jobs"),
            )"#,
        )
        .unwrap();
        let cli = Cli {
            email: true,
            ..search_cli()
        };

        let config = AppConfig::resolve(&cli, file, today()).unwrap();
        let handoff = config.email.unwrap();

        assert_eq!(handoff.credentials.recipient, "you@example.com");
        assert_eq!(handoff.settings.subject, "Fresh jobs");
        assert_eq!(handoff.settings.smtp_host, "smtp.gmail.com");
        assert_eq!(handoff.settings.smtp_port, 587);
    }

    #[test]
    fn load_reports_the_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(title: 42)").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }
}
