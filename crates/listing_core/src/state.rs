/// Why a crawl session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The last fetched page had no "next page" control.
    NoMorePages,
    /// The transport could not deliver a page.
    FetchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Fetching {
        url: String,
    },
    Extracting,
    AdvancingPage,
    Throttling {
        url: String,
    },
    Done(DoneReason),
}

/// Crawl controller state. Owned by a single session and never shared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlState {
    phase: Phase,
    current_url: Option<String>,
    unique_records: usize,
    pages_fetched: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// URL of the page being fetched or last fetched; `None` once the crawl has stopped.
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn unique_records(&self) -> usize {
        self.unique_records
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    pub fn done_reason(&self) -> Option<DoneReason> {
        match self.phase {
            Phase::Done(reason) => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn begin_fetch(&mut self, url: String) {
        self.current_url = Some(url.clone());
        self.phase = Phase::Fetching { url };
    }

    pub(crate) fn page_fetched(&mut self) {
        self.pages_fetched += 1;
        self.phase = Phase::Extracting;
    }

    pub(crate) fn cards_processed(&mut self, accepted: usize) {
        self.unique_records += accepted;
        self.phase = Phase::AdvancingPage;
    }

    pub(crate) fn throttle(&mut self, url: String) {
        self.phase = Phase::Throttling { url };
    }

    pub(crate) fn finish(&mut self, reason: DoneReason) {
        self.current_url = None;
        self.phase = Phase::Done(reason);
    }
}
