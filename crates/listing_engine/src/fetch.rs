use std::time::Duration;

use crawl_logging::crawl_debug;
use futures_util::StreamExt;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::StatusCode;

use crate::decode::decode_html;
use crate::{FailureKind, FetchError, PageContent};

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/87.0.4280.67 Safari/537.36 Edg/87.0.664.47";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,\
                     image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Delivers results pages to the crawl controller.
///
/// A transport is owned by one session. `close` releases its resource
/// (connection pool or browser process) and is called exactly once when the
/// session ends, whatever the outcome.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn fetch(&mut self, url: &str) -> Result<PageContent, FetchError>;

    async fn close(&mut self) -> Result<(), FetchError>;
}

/// Plain HTTP transport. One GET per page, no retries: anything but `200 OK`
/// is a failure.
#[derive(Debug)]
pub struct ReqwestTransport {
    settings: FetchSettings,
    client: Option<reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = build_client(&settings)?;
        Ok(Self {
            settings,
            client: Some(client),
        })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }
}

fn build_client(settings: &FetchSettings) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .user_agent(settings.user_agent.as_str())
        .default_headers(browser_headers(settings)?)
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

fn browser_headers(settings: &FetchSettings) -> Result<HeaderMap, FetchError> {
    let invalid = |err: reqwest::header::InvalidHeaderValue| {
        FetchError::new(FailureKind::Network, format!("invalid header value: {err}"))
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_str(&settings.accept).map_err(invalid)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&settings.accept_language).map_err(invalid)?,
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    for (name, value) in [
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    Ok(headers)
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&mut self, url: &str) -> Result<PageContent, FetchError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| FetchError::new(FailureKind::Network, "transport closed"))?;
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let decoded = decode_html(&bytes, content_type.as_deref())
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        crawl_debug!(
            "fetched {} ({} bytes, {})",
            final_url,
            bytes.len(),
            decoded.encoding_label
        );

        Ok(PageContent::new(final_url, decoded.html))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        // Dropping the last client handle tears down its connection pool.
        self.client.take();
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
