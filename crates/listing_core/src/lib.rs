//! Listing core: pure crawl state machine and the job record domain.
mod dedup;
mod effect;
mod msg;
mod record;
mod search;
mod state;
mod update;

pub use dedup::DedupStore;
pub use effect::Effect;
pub use msg::Msg;
pub use record::{Record, RECORD_HEADER};
pub use search::{SearchQuery, DEFAULT_BASE_URL};
pub use state::{CrawlState, DoneReason, Phase};
pub use update::update;
