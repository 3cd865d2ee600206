#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin a session at the first results page.
    Start { start_url: String },
    /// Transport delivered the current page.
    PageFetched,
    /// Transport failed on the current page.
    FetchFailed,
    /// Every card of the current page went through extraction and dedup.
    CardsProcessed { accepted: usize },
    /// Result of looking for the "next page" control on the current page.
    NextPageResolved(Option<String>),
    /// The politeness delay has elapsed.
    ThrottleElapsed,
}
