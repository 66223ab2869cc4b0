//! Engagement enrichment: revisit each harvested post, expand truncated
//! text, and extract reaction and comment counts. Time-bounded per item
//! and overall; any item the budget or the page denies degrades to zero
//! counts instead of failing the run.

use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

use groupsift_common::{CancelFlag, EnrichedPost, ProgressSink};

use crate::collector::RawPost;
use crate::feed::{EngagementCandidates, GroupFeed};
use crate::numeric::{comment_count, is_relative_time, leading_count};

/// Time limits on the enrichment phase.
#[derive(Debug, Clone)]
pub struct EnrichBudget {
    /// Ceiling on any single post's expansion plus extraction.
    pub per_item: Duration,
    /// Ceiling on the whole phase. Once it lapses, every remaining post is
    /// degraded in place.
    pub total: Duration,
}

impl Default for EnrichBudget {
    fn default() -> Self {
        Self {
            per_item: Duration::from_secs(5),
            total: Duration::from_secs(60),
        }
    }
}

/// Enrichment output plus the counts the run summary reports.
pub struct EnrichReport {
    pub posts: Vec<EnrichedPost>,
    pub degraded: usize,
}

/// Enrich every harvested post, preserving order and count: the output
/// always has exactly one entry per input.
pub async fn enrich<F: GroupFeed>(
    feed: &F,
    raw: Vec<RawPost<F::Handle>>,
    budget: &EnrichBudget,
    cancel: &CancelFlag,
    progress: &ProgressSink,
) -> EnrichReport {
    let total = raw.len();
    let start = Instant::now();
    let mut posts: Vec<EnrichedPost> = Vec::with_capacity(total);
    let mut degraded = 0usize;
    let mut iter = raw.into_iter();

    while let Some(post) = iter.next() {
        if cancel.is_cancelled() {
            let remaining = 1 + iter.len();
            progress.line(format!(
                "Enrichment stopped by user, {remaining} posts kept without counts."
            ));
            degraded += remaining;
            posts.push(EnrichedPost::degraded(post.text));
            posts.extend(iter.map(|p| EnrichedPost::degraded(p.text)));
            break;
        }
        if start.elapsed() >= budget.total {
            let remaining = 1 + iter.len();
            progress.line(format!(
                "Enrichment time limit reached, {remaining} posts kept without counts."
            ));
            warn!(remaining, "Total enrichment budget exhausted");
            degraded += remaining;
            posts.push(EnrichedPost::degraded(post.text));
            posts.extend(iter.map(|p| EnrichedPost::degraded(p.text)));
            break;
        }

        match timeout(budget.per_item, enrich_one(feed, &post)).await {
            Ok(enriched) => posts.push(enriched),
            Err(_) => {
                debug!(index = posts.len(), "Per-post enrichment timeout");
                degraded += 1;
                posts.push(EnrichedPost::degraded(post.text));
            }
        }

        if posts.len() % 10 == 0 {
            progress.line(format!(
                "Enriched {}/{} posts ({}s elapsed)",
                posts.len(),
                total,
                start.elapsed().as_secs()
            ));
        }
    }

    EnrichReport { posts, degraded }
}

/// Enrich a single post. Page-level failures degrade the affected field
/// rather than surfacing an error.
async fn enrich_one<F: GroupFeed>(feed: &F, post: &RawPost<F::Handle>) -> EnrichedPost {
    let text = match feed.expand_post(&post.handle).await {
        Ok(Some(expanded)) if !expanded.is_empty() => expanded,
        Ok(_) => post.text.clone(),
        Err(err) => {
            debug!(error = %err, "Expansion failed, keeping truncated text");
            post.text.clone()
        }
    };
    let candidates = match feed.engagement_candidates(&post.handle).await {
        Ok(c) => c,
        Err(err) => {
            debug!(error = %err, "Candidate harvest failed");
            return EnrichedPost::degraded(text);
        }
    };
    EnrichedPost {
        text,
        reactions: extract_reactions(&candidates),
        comments: extract_comments(&candidates),
    }
}

/// Reaction count, by strategy order: the summary control's label, then
/// per-reaction-type labels summed, then icon-adjacent sibling text. Zero
/// when every strategy comes up empty.
pub fn extract_reactions(candidates: &EngagementCandidates) -> u64 {
    if let Some(label) = &candidates.summary_label {
        if let Some(n) = leading_count(label) {
            return n;
        }
    }

    // "Lubię to!: 12" per-type labels; the count sits after the colon.
    let per_type: u64 = candidates
        .per_type_labels
        .iter()
        .filter_map(|label| {
            let (_, rhs) = label.split_once(':')?;
            leading_count(rhs)
        })
        .sum();
    if per_type > 0 {
        return per_type;
    }

    candidates
        .sibling_texts
        .iter()
        .filter(|t| !is_relative_time(t))
        .find_map(|t| leading_count(t))
        .unwrap_or(0)
}

/// Comment count from the first footer control mentioning comments, in
/// either language. Zero when none does.
pub fn extract_comments(candidates: &EngagementCandidates) -> u64 {
    candidates
        .clickable_texts
        .iter()
        .find_map(|t| comment_count(t))
        .unwrap_or(0)
}
