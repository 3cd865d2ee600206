use std::path::PathBuf;

use anyhow::{Context, Result};
use crawl_logging::{crawl_error, crawl_info};
use listing_core::DoneReason;
use listing_engine::{
    BrowserTransport, CardExtractor, CardSelectors, ChromiumDriver, CrawlController, CrawlReport,
    CsvRecordSink, FetchSettings, RateLimiter, ReqwestTransport, SmtpMailer, Transport,
};

use crate::cli::TransportKind;
use crate::config::{AppConfig, EmailHandoff};

pub struct RunSummary {
    pub output: PathBuf,
    pub report: CrawlReport,
}

/// Runs one crawl session, then hands the finished file to the mailer if
/// configured. Mail failures are logged and do not fail the run.
pub async fn run(config: AppConfig) -> Result<RunSummary> {
    let start_url = config
        .query
        .start_url(&config.base_url)
        .with_context(|| format!("invalid base URL {}", config.base_url))?;
    crawl_info!(
        "Searching for `{}` in `{}`",
        config.query.job_title,
        config.query.location
    );

    let mut sink = CsvRecordSink::initialize(&config.output)
        .with_context(|| format!("cannot create {}", config.output.display()))?;
    let extractor =
        CardExtractor::new(&CardSelectors::default()).context("invalid card selectors")?;
    let limiter = RateLimiter::new(config.max_delay);

    let report = match config.transport {
        TransportKind::Http => {
            let transport = ReqwestTransport::new(FetchSettings::default())
                .context("cannot build HTTP client")?;
            crawl(transport, &mut sink, extractor, limiter, start_url.as_str()).await?
        }
        TransportKind::Browser => {
            let driver = ChromiumDriver::launch(&config.browser)
                .await
                .context("cannot start browser")?;
            let transport = BrowserTransport::new(driver, &config.browser);
            crawl(transport, &mut sink, extractor, limiter, start_url.as_str()).await?
        }
    };

    let output = sink
        .finish()
        .with_context(|| format!("cannot finish {}", config.output.display()))?;

    if let Some(handoff) = config.email {
        send_email(output.clone(), handoff).await;
    }

    Ok(RunSummary { output, report })
}

async fn crawl<T: Transport>(
    transport: T,
    sink: &mut CsvRecordSink,
    extractor: CardExtractor,
    limiter: RateLimiter,
    start_url: &str,
) -> Result<CrawlReport> {
    let report = CrawlController::new(transport, sink, extractor)
        .with_rate_limiter(limiter)
        .run(start_url)
        .await
        .context("crawl aborted")?;
    Ok(report)
}

async fn send_email(path: PathBuf, handoff: EmailHandoff) {
    let EmailHandoff {
        credentials,
        settings,
    } = handoff;
    let recipient = credentials.recipient.clone();
    let mailer = SmtpMailer::new(settings);
    let sent = tokio::task::spawn_blocking(move || mailer.send(&path, &credentials)).await;
    match sent {
        Ok(Ok(())) => crawl_info!("Emailed results to {}", recipient),
        Ok(Err(err)) => crawl_error!("Failed to email results: {}", err),
        Err(err) => crawl_error!("Mail task failed: {}", err),
    }
}

pub fn describe(reason: DoneReason) -> &'static str {
    match reason {
        DoneReason::NoMorePages => "no more result pages",
        DoneReason::FetchFailed => "a page could not be fetched",
    }
}
