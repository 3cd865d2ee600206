use std::collections::VecDeque;

use crawl_logging::{crawl_debug, crawl_info, crawl_trace, crawl_warn, set_crawl_page};
use listing_core::{update, CrawlState, DedupStore, DoneReason, Effect, Msg};

use crate::extract::CardExtractor;
use crate::fetch::Transport;
use crate::paginate::PaginationResolver;
use crate::sink::{PersistError, RecordSink};
use crate::throttle::RateLimiter;
use crate::{FetchError, PageContent};

/// What a finished session reports to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub unique_records: usize,
    pub pages_fetched: usize,
    pub reason: DoneReason,
    /// The transport failure that ended the session, if any.
    pub last_error: Option<FetchError>,
}

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("failed to persist record: {0}")]
    Persist(#[from] PersistError),
    #[error("crawl stopped without reaching a terminal state")]
    Stalled,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PageTally {
    accepted: usize,
    duplicates: usize,
    skipped: usize,
}

/// One crawl session: fetch, extract, dedup, persist, paginate, throttle.
///
/// The controller owns every stateful collaborator. The transport is closed
/// before [`CrawlController::run`] returns, on success and on error alike.
pub struct CrawlController<T, S> {
    transport: T,
    sink: S,
    extractor: CardExtractor,
    paginator: PaginationResolver,
    limiter: RateLimiter,
    dedup: DedupStore,
}

impl<T: Transport, S: RecordSink> CrawlController<T, S> {
    pub fn new(transport: T, sink: S, extractor: CardExtractor) -> Self {
        Self {
            transport,
            sink,
            extractor,
            paginator: PaginationResolver::default(),
            limiter: RateLimiter::default(),
            dedup: DedupStore::new(),
        }
    }

    pub fn with_paginator(mut self, paginator: PaginationResolver) -> Self {
        self.paginator = paginator;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Crawls from `start_url` until the last page or the first fetch failure.
    pub async fn run(mut self, start_url: &str) -> Result<CrawlReport, CrawlError> {
        crawl_info!("starting crawl at {}", start_url);
        let result = self.drive(start_url).await;

        if let Err(err) = self.transport.close().await {
            crawl_warn!("failed to release transport: {}", err);
        }

        match &result {
            Ok(report) => crawl_info!(
                "finished: {} unique records from {} pages ({:?})",
                report.unique_records,
                report.pages_fetched,
                report.reason
            ),
            Err(err) => crawl_warn!("crawl aborted: {}", err),
        }
        result
    }

    async fn drive(&mut self, start_url: &str) -> Result<CrawlReport, CrawlError> {
        let (mut state, effects) = update(
            CrawlState::new(),
            Msg::Start {
                start_url: start_url.to_string(),
            },
        );
        let mut queue: VecDeque<Effect> = effects.into();
        let mut page: Option<PageContent> = None;
        let mut last_error = None;

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::Fetch { url } => {
                    set_crawl_page(state.pages_fetched() as u64 + 1);
                    crawl_info!("fetching {}", url);
                    match self.transport.fetch(&url).await {
                        Ok(content) => {
                            page = Some(content);
                            Msg::PageFetched
                        }
                        Err(err) => {
                            crawl_warn!("fetch failed for {}: {}", url, err);
                            page = None;
                            last_error = Some(err);
                            Msg::FetchFailed
                        }
                    }
                }
                Effect::ExtractCards => {
                    let tally = match page.as_ref() {
                        Some(content) => self.process_page(content)?,
                        None => PageTally::default(),
                    };
                    crawl_debug!(
                        "{} new, {} duplicate, {} skipped",
                        tally.accepted,
                        tally.duplicates,
                        tally.skipped
                    );
                    Msg::CardsProcessed {
                        accepted: tally.accepted,
                    }
                }
                Effect::ResolveNextPage => {
                    let next = page
                        .as_ref()
                        .and_then(|content| self.paginator.next_page_url(content));
                    if next.is_none() {
                        crawl_info!("no next page control");
                    }
                    Msg::NextPageResolved(next)
                }
                Effect::Throttle => {
                    self.limiter.wait().await;
                    Msg::ThrottleElapsed
                }
                Effect::Finish {
                    reason,
                    unique_records,
                } => {
                    return Ok(CrawlReport {
                        unique_records,
                        pages_fetched: state.pages_fetched(),
                        reason,
                        last_error,
                    });
                }
            };

            let (next_state, effects) = update(state, msg);
            state = next_state;
            queue.extend(effects);
        }

        Err(CrawlError::Stalled)
    }

    fn process_page(&mut self, content: &PageContent) -> Result<PageTally, PersistError> {
        let mut tally = PageTally::default();
        for card in self.extractor.extract_cards(content) {
            let record = match self.extractor.to_record(&card, &content.url) {
                Ok(record) => record,
                Err(failure) => {
                    crawl_trace!("skipping card: {}", failure);
                    tally.skipped += 1;
                    continue;
                }
            };
            if self.dedup.seen(record.url()) {
                crawl_trace!("duplicate {}", record.url());
                tally.duplicates += 1;
                continue;
            }
            self.sink.append(&record)?;
            self.dedup.mark_seen(record.url());
            tally.accepted += 1;
        }
        Ok(tally)
    }
}
