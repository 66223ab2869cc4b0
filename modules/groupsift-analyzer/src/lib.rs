//! Downstream analysis of enriched posts: clean the text, rank by
//! engagement, and turn the top of the ranking into a Markdown report via
//! Gemini. Consumes scrape output as-is; the scraper knows nothing about
//! this crate.

pub mod clean;
pub mod gemini;
pub mod prompt;
pub mod rank;

use anyhow::Result;
use tracing::info;

use groupsift_common::EnrichedPost;

pub use clean::clean_text;
pub use gemini::GeminiClient;
pub use rank::{prepare, RankOptions, RankedPost};

/// Clean, filter, rank, and summarize in one pass. Returns the Markdown
/// report, or an explanation when there is nothing to report on.
pub async fn summarize(
    client: &GeminiClient,
    posts: &[EnrichedPost],
    options: &RankOptions,
    criteria: &str,
) -> Result<String> {
    let ranked = prepare(posts, options);
    if ranked.is_empty() {
        return Ok("Brak postów spełniających kryteria.".to_string());
    }
    info!(posts = ranked.len(), "Requesting report");
    let system = prompt::system_prompt(criteria);
    let user = prompt::summary_prompt(&ranked, criteria)?;
    client.generate(&system, &user).await
}
