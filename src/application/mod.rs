pub mod aggregator;
pub mod poller;

pub use aggregator::{
    merge_listings, AggregateError, AggregatorSettings, RankedListings, TokenAggregator,
    DEFAULT_MAX_RESULTS,
};
pub use poller::{RadarSnapshot, RefreshOutcome, TokenPoller, DEFAULT_POLL_INTERVAL, MOCK_NOTICE};
