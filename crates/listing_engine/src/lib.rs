//! Listing engine: transports, card extraction, persistence and the crawl loop.
mod browser;
mod crawl;
mod decode;
mod extract;
mod fetch;
mod mail;
mod paginate;
mod sink;
mod throttle;
mod types;

pub use browser::{
    BrowserDriver, BrowserNavigation, BrowserSettings, BrowserTransport, ChromiumDriver,
    DriverError,
};
pub use crawl::{CrawlController, CrawlError, CrawlReport};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use extract::{
    find_attr, find_text, CardExtractor, CardSelectors, ExtractionFailure, FieldSource, RawCard,
    SelectorError,
};
pub use fetch::{FetchSettings, ReqwestTransport, Transport, DESKTOP_USER_AGENT};
pub use mail::{build_message, EmailCredentials, MailError, MailSettings, SmtpMailer};
pub use paginate::PaginationResolver;
pub use sink::{ensure_output_dir, CsvRecordSink, PersistError, RecordSink};
pub use throttle::{RateLimiter, DEFAULT_MAX_DELAY};
pub use types::{FailureKind, FetchError, PageContent};
