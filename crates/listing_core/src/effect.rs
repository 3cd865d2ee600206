use crate::DoneReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { url: String },
    ExtractCards,
    ResolveNextPage,
    Throttle,
    Finish {
        reason: DoneReason,
        unique_records: usize,
    },
}
