pub mod collector;
pub mod enricher;
pub mod feed;
pub mod fingerprint;
pub mod numeric;
pub mod pipeline;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use collector::{collect, CollectTuning, RawPost};
pub use enricher::{enrich, EnrichBudget};
pub use feed::{EngagementCandidates, GroupFeed};
pub use pipeline::{spawn_scrape, ScrapeOutcome, ScrapeRequest, ScrapeWorker};
pub use stats::RunStats;
