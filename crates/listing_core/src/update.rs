use crate::{CrawlState, DoneReason, Effect, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not belong to the current phase are ignored. `Done` is
/// terminal: nothing moves a finished session.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Vec<Effect>) {
    let effects = match (state.phase().clone(), msg) {
        (Phase::Idle, Msg::Start { start_url }) => {
            state.begin_fetch(start_url.clone());
            vec![Effect::Fetch { url: start_url }]
        }
        (Phase::Fetching { .. }, Msg::PageFetched) => {
            state.page_fetched();
            vec![Effect::ExtractCards]
        }
        (Phase::Fetching { .. }, Msg::FetchFailed) => finish(&mut state, DoneReason::FetchFailed),
        (Phase::Extracting, Msg::CardsProcessed { accepted }) => {
            state.cards_processed(accepted);
            vec![Effect::ResolveNextPage]
        }
        (Phase::AdvancingPage, Msg::NextPageResolved(None)) => {
            finish(&mut state, DoneReason::NoMorePages)
        }
        (Phase::AdvancingPage, Msg::NextPageResolved(Some(url))) => {
            state.throttle(url);
            vec![Effect::Throttle]
        }
        (Phase::Throttling { url }, Msg::ThrottleElapsed) => {
            state.begin_fetch(url.clone());
            vec![Effect::Fetch { url }]
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn finish(state: &mut CrawlState, reason: DoneReason) -> Vec<Effect> {
    state.finish(reason);
    vec![Effect::Finish {
        reason,
        unique_records: state.unique_records(),
    }]
}
