//! Feed collection: incremental scroll-and-harvest over a dynamically
//! loading feed, bounded by a target count, a stall budget, and a round
//! ceiling. Every way out of the loop is a normal outcome — a partial
//! harvest is a valid harvest.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use groupsift_common::{CancelFlag, ProgressSink};

use crate::feed::GroupFeed;
use crate::fingerprint::dedup_key;

/// Knobs for a collection run.
#[derive(Debug, Clone)]
pub struct CollectTuning {
    /// Stop once this many unique posts are harvested.
    pub target_count: usize,
    /// Pause after each scroll so lazy content can render. Larger values
    /// trade latency for completeness.
    pub scroll_wait: Duration,
    /// Hard ceiling on scroll rounds — the safety valve against feeds that
    /// never stop loading.
    pub max_rounds: u32,
    /// Consecutive no-growth rounds before declaring end of feed.
    pub max_stalls: u32,
    /// Rendered text shorter than this is noise (icons, timestamps), not a
    /// post body.
    pub min_post_len: usize,
}

impl Default for CollectTuning {
    fn default() -> Self {
        Self {
            target_count: 100,
            scroll_wait: Duration::from_millis(1500),
            max_rounds: 100,
            max_stalls: 5,
            min_post_len: 10,
        }
    }
}

/// A harvested post body plus the opaque handle to its live DOM node. The
/// handle is only valid while the originating session is open and is
/// consumed by enrichment.
pub struct RawPost<H> {
    pub text: String,
    pub handle: H,
}

/// The result of the collection phase.
pub struct Harvest<H> {
    pub posts: Vec<RawPost<H>>,
    pub rounds: u32,
}

/// Scroll the feed and harvest unique post bodies, in discovery order.
///
/// Terminates on: target reached, end of feed (stall budget), round
/// ceiling, or cancellation — all normal. The returned order is collector
/// order; the source feed makes no ordering promises of its own.
pub async fn collect<F: GroupFeed>(
    feed: &F,
    tuning: &CollectTuning,
    cancel: &CancelFlag,
    progress: &ProgressSink,
) -> Result<Harvest<F::Handle>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut posts: Vec<RawPost<F::Handle>> = Vec::new();
    let mut last_height: i64 = 0;
    let mut stalls: u32 = 0;
    let mut round: u32 = 0;

    while posts.len() < tuning.target_count {
        if cancel.is_cancelled() {
            progress.line("Collection stopped by user.");
            info!(round, collected = posts.len(), "Collection cancelled");
            break;
        }
        round += 1;

        let rendered = feed.rendered_posts().await?;
        let mut new_this_round = 0usize;
        for (text, handle) in rendered {
            if posts.len() >= tuning.target_count {
                break;
            }
            if text.chars().count() < tuning.min_post_len {
                continue;
            }
            let key = dedup_key(&text);
            if key.is_empty() || !seen.insert(key) {
                continue;
            }
            posts.push(RawPost { text, handle });
            new_this_round += 1;
        }

        progress.line(format!(
            "Round {round}: {new_this_round} new unique posts | total {}/{}",
            posts.len(),
            tuning.target_count
        ));

        if posts.len() >= tuning.target_count {
            info!(round, collected = posts.len(), "Collection target reached");
            break;
        }

        feed.scroll_to_bottom().await?;
        tokio::time::sleep(tuning.scroll_wait).await;

        let height = feed.page_height().await?;
        if height <= last_height {
            stalls += 1;
            progress.line(format!("No new content ({stalls}/{})", tuning.max_stalls));
            if stalls >= tuning.max_stalls {
                progress.line("Reached end of feed.");
                info!(round, collected = posts.len(), "Feed exhausted");
                break;
            }
        } else {
            stalls = 0;
        }
        last_height = height;

        if round >= tuning.max_rounds {
            progress.line("Reached maximum scroll rounds.");
            info!(round, collected = posts.len(), "Round ceiling hit");
            break;
        }
    }

    Ok(Harvest { posts, rounds: round })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::dedup_key;
    use crate::testing::SimFeed;
    use groupsift_common::progress_channel;

    fn tuning(target: usize) -> CollectTuning {
        CollectTuning {
            target_count: target,
            scroll_wait: Duration::from_millis(10),
            max_rounds: 50,
            max_stalls: 3,
            min_post_len: 5,
        }
    }

    fn batch(prefix: &str, n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("{prefix} post number {i} with enough text"))
            .collect()
    }

    #[tokio::test]
    async fn stall_budget_ends_a_short_feed() {
        // 25 posts over 3 rounds, then the page stops growing.
        let feed = SimFeed::new(vec![batch("a", 10), batch("b", 10), batch("c", 5)]);
        let (progress, rx) = progress_channel();
        let cancel = CancelFlag::new();

        let harvest = collect(&feed, &tuning(100), &cancel, &progress)
            .await
            .unwrap();

        assert_eq!(harvest.posts.len(), 25);
        drop(progress);
        let lines: Vec<String> = rx.iter().flatten().collect();
        // Per-round new counts decline to zero before the end-of-feed line.
        assert!(lines.iter().any(|l| l.contains("10 new unique")));
        assert!(lines.iter().any(|l| l.contains("5 new unique")));
        assert!(lines.iter().any(|l| l.contains("0 new unique")));
        assert!(lines.last().unwrap().contains("end of feed"));
    }

    #[tokio::test]
    async fn target_reached_in_first_round_stops_immediately() {
        let feed = SimFeed::new(vec![batch("a", 15)]);
        let (progress, _rx) = progress_channel();
        let cancel = CancelFlag::new();

        let harvest = collect(&feed, &tuning(10), &cancel, &progress)
            .await
            .unwrap();

        assert_eq!(harvest.posts.len(), 10);
        assert_eq!(harvest.rounds, 1);
        assert_eq!(feed.scroll_count(), 0); // stopped without further scrolling
        // Discovery order is preserved.
        assert!(harvest.posts[0].text.contains("number 0"));
        assert!(harvest.posts[9].text.contains("number 9"));
    }

    #[tokio::test]
    async fn duplicates_and_noise_are_skipped() {
        let feed = SimFeed::new(vec![vec![
            "Szukam polecenia hydraulika w okolicy".to_string(),
            "  szukam   POLECENIA hydraulika w okolicy ".to_string(), // dup modulo normalization
            "ok".to_string(),                                         // below min length
            "Another real post with plenty of text".to_string(),
        ]]);
        let (progress, _rx) = progress_channel();
        let cancel = CancelFlag::new();

        let harvest = collect(&feed, &tuning(100), &cancel, &progress)
            .await
            .unwrap();

        assert_eq!(harvest.posts.len(), 2);
        let keys: HashSet<String> = harvest.posts.iter().map(|p| dedup_key(&p.text)).collect();
        assert_eq!(keys.len(), harvest.posts.len());
    }

    #[tokio::test]
    async fn cancellation_mid_run_returns_partial_harvest() {
        let mut feed = SimFeed::new(vec![batch("a", 5), batch("b", 5), batch("c", 5)]);
        let cancel = CancelFlag::new();
        feed.cancel_on_scroll(2, cancel.clone());
        let (progress, rx) = progress_channel();

        let harvest = collect(&feed, &tuning(100), &cancel, &progress)
            .await
            .unwrap();

        // Rounds 1 and 2 harvested; round 3's top-of-round check observed
        // the flag.
        assert_eq!(harvest.posts.len(), 10);
        drop(progress);
        let lines: Vec<String> = rx.iter().flatten().collect();
        assert!(lines.iter().any(|l| l.contains("stopped by user")));
    }

    #[tokio::test]
    async fn round_ceiling_is_a_safety_valve() {
        // A feed that grows forever: every scroll reveals a fresh batch.
        let batches: Vec<Vec<String>> = (0..100).map(|i| batch(&format!("r{i}"), 1)).collect();
        let feed = SimFeed::new(batches);
        let (progress, _rx) = progress_channel();
        let cancel = CancelFlag::new();

        let mut t = tuning(1000);
        t.max_rounds = 4;
        let harvest = collect(&feed, &t, &cancel, &progress).await.unwrap();

        assert_eq!(harvest.rounds, 4);
        assert_eq!(harvest.posts.len(), 4);
    }
}
