//! In-process feed simulation for driving the collector and enricher
//! without a browser. Deterministic by construction: post `i` reports
//! `i + 1` reactions and `2 * (i + 1)` comments.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use groupsift_common::CancelFlag;

use crate::feed::{EngagementCandidates, GroupFeed};

/// A simulated feed that reveals one batch of posts per scroll and stops
/// growing when the batches run out. Handles are flat post indices.
pub struct SimFeed {
    batches: Vec<Vec<String>>,
    round: Mutex<usize>,
    scrolls: Mutex<u32>,
    cancel_on_scroll: Option<(u32, CancelFlag)>,
    enrich_delay: Duration,
    slow_items: HashMap<usize, Duration>,
    expanded_text: Option<String>,
}

impl SimFeed {
    pub fn new(batches: Vec<Vec<String>>) -> Self {
        Self {
            batches,
            round: Mutex::new(0),
            scrolls: Mutex::new(0),
            cancel_on_scroll: None,
            enrich_delay: Duration::ZERO,
            slow_items: HashMap::new(),
            expanded_text: None,
        }
    }

    /// Request cancellation on the `nth` (1-based) scroll, simulating a
    /// user stopping the run mid-collection.
    pub fn cancel_on_scroll(&mut self, nth: u32, flag: CancelFlag) {
        self.cancel_on_scroll = Some((nth, flag));
    }

    /// Every candidate harvest takes this long.
    pub fn with_enrich_delay(mut self, delay: Duration) -> Self {
        self.enrich_delay = delay;
        self
    }

    /// One specific post's candidate harvest takes this long instead.
    pub fn with_slow_item(mut self, index: usize, delay: Duration) -> Self {
        self.slow_items.insert(index, delay);
        self
    }

    /// Make every post expandable; post `i` expands to `"{prefix} {i}"`.
    pub fn with_expanded_text(mut self, prefix: &str) -> Self {
        self.expanded_text = Some(prefix.to_string());
        self
    }

    pub fn scroll_count(&self) -> u32 {
        *self.scrolls.lock().unwrap()
    }
}

#[async_trait]
impl GroupFeed for SimFeed {
    type Handle = usize;

    async fn rendered_posts(&self) -> Result<Vec<(String, usize)>> {
        let round = *self.round.lock().unwrap();
        let posts = self
            .batches
            .iter()
            .take(round + 1)
            .flatten()
            .cloned()
            .enumerate()
            .map(|(i, text)| (text, i))
            .collect();
        Ok(posts)
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let mut scrolls = self.scrolls.lock().unwrap();
        *scrolls += 1;
        if let Some((nth, flag)) = &self.cancel_on_scroll {
            if *scrolls == *nth {
                flag.request();
            }
        }
        let mut round = self.round.lock().unwrap();
        if *round + 1 < self.batches.len() {
            *round += 1;
        }
        Ok(())
    }

    async fn page_height(&self) -> Result<i64> {
        let round = *self.round.lock().unwrap();
        let visible: usize = self.batches.iter().take(round + 1).map(Vec::len).sum();
        Ok(visible as i64 * 120)
    }

    async fn expand_post(&self, handle: &usize) -> Result<Option<String>> {
        Ok(self
            .expanded_text
            .as_ref()
            .map(|prefix| format!("{prefix} {handle}")))
    }

    async fn engagement_candidates(&self, handle: &usize) -> Result<EngagementCandidates> {
        let delay = self
            .slow_items
            .get(handle)
            .copied()
            .unwrap_or(self.enrich_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(EngagementCandidates {
            summary_label: Some(format!("Like: {} people", handle + 1)),
            per_type_labels: Vec::new(),
            sibling_texts: Vec::new(),
            clickable_texts: vec![format!("{} comments", 2 * (handle + 1))],
        })
    }
}
