//! The seam between scrape logic and the live page. `GroupFeed` is what
//! the collector and enricher are written against; `ChromeFeed` is the
//! production implementation over a CDP page, and tests drive the same
//! logic through an in-process simulated feed.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::{Element, Page};
use serde::Deserialize;
use tracing::debug;

/// Post-body selectors, most specific first. These attributes mark the
/// story message itself, not comments or shared-link previews.
const POST_BODY_SELECTOR: &str = concat!(
    r#"[data-ad-rendering-role="story_message"], "#,
    r#"[data-ad-comet-preview="message"], "#,
    r#"[data-ad-preview="message"]"#,
);

/// Raw strings harvested from a post's subtree in one DOM pass. All
/// parsing happens on the Rust side so the strategy chain stays pure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngagementCandidates {
    /// Accessible label of the reaction-summary control, if present.
    #[serde(default)]
    pub summary_label: Option<String>,
    /// Accessible labels of per-reaction-type controls ("Lubię to!: 12").
    #[serde(default)]
    pub per_type_labels: Vec<String>,
    /// Text content of containers adjacent to reaction iconography.
    #[serde(default)]
    pub sibling_texts: Vec<String>,
    /// Text of clickable controls in the post footer (comment counts live
    /// here).
    #[serde(default)]
    pub clickable_texts: Vec<String>,
}

/// A group feed rendered in some browsing context. `Handle` is an opaque
/// reference to the live node backing a post — valid only while the feed
/// is open, never compared or hashed.
#[async_trait]
pub trait GroupFeed: Send + Sync {
    type Handle: Send + Sync;

    /// All post bodies currently rendered, in DOM order.
    async fn rendered_posts(&self) -> Result<Vec<(String, Self::Handle)>>;

    async fn scroll_to_bottom(&self) -> Result<()>;

    async fn page_height(&self) -> Result<i64>;

    /// Click a "see more" affordance inside the post, if any, and return
    /// the re-read text. `None` means nothing was truncated.
    async fn expand_post(&self, handle: &Self::Handle) -> Result<Option<String>>;

    /// Harvest engagement label/text candidates from the post's subtree.
    async fn engagement_candidates(&self, handle: &Self::Handle) -> Result<EngagementCandidates>;
}

// --- Live implementation ---

/// "See more" click, bound to the post element. Returns whether a control
/// was clicked.
const EXPAND_JS: &str = r#"function() {
    const root = this.closest('div[role="article"]') || this;
    const labels = ['See more', 'Wyświetl więcej', 'Więcej', 'More'];
    for (const el of root.querySelectorAll('div[role="button"], span[role="button"], span')) {
        const t = (el.textContent || '').trim();
        if (labels.includes(t)) { el.click(); return true; }
    }
    return false;
}"#;

/// Candidate harvest, bound to the post element. Emits the field names of
/// [`EngagementCandidates`]; arrays are capped because footers of shared
/// posts can nest hundreds of controls.
const CANDIDATES_JS: &str = r#"function() {
    const root = this.closest('div[role="article"]') || this;
    const out = { summary_label: null, per_type_labels: [], sibling_texts: [], clickable_texts: [] };

    const summary = root.querySelector(
        '[role="button"][aria-label*="osób"], [role="button"][aria-label*="people"], ' +
        '[role="button"][aria-label*="osoba"], [role="button"][aria-label*="reakc"], ' +
        '[role="button"][aria-label*="reaction"]');
    if (summary) out.summary_label = summary.getAttribute('aria-label');

    const toolbar = root.querySelector('[role="toolbar"]');
    if (toolbar) {
        for (const el of toolbar.querySelectorAll('[aria-label]')) {
            out.per_type_labels.push(el.getAttribute('aria-label'));
            if (out.per_type_labels.length >= 20) break;
        }
    }

    for (const icon of root.querySelectorAll('span[role="img"][aria-label], img[role="presentation"]')) {
        const container = (icon.closest('span') || icon).parentElement;
        if (container) out.sibling_texts.push((container.textContent || '').trim());
        if (out.sibling_texts.length >= 20) break;
    }

    for (const el of root.querySelectorAll('[role="button"], [role="link"]')) {
        const t = (el.textContent || '').trim();
        if (t && t.length < 80) out.clickable_texts.push(t);
        if (out.clickable_texts.length >= 40) break;
    }

    return out;
}"#;

/// Production feed over a live CDP page.
pub struct ChromeFeed {
    page: Page,
}

impl ChromeFeed {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl GroupFeed for ChromeFeed {
    type Handle = Element;

    async fn rendered_posts(&self) -> Result<Vec<(String, Element)>> {
        let elements = self
            .page
            .find_elements(POST_BODY_SELECTOR)
            .await
            .context("Post body query failed")?;
        let mut posts = Vec::with_capacity(elements.len());
        for el in elements {
            // A detached element mid-rerender is normal churn, skip it.
            let Ok(Some(text)) = el.inner_text().await else {
                continue;
            };
            let text = text.trim().to_string();
            posts.push((text, el));
        }
        Ok(posts)
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .context("Scroll failed")?;
        Ok(())
    }

    async fn page_height(&self) -> Result<i64> {
        let height = self
            .page
            .evaluate("document.body.scrollHeight")
            .await
            .context("Height query failed")?
            .into_value::<i64>()
            .context("Height was not a number")?;
        Ok(height)
    }

    async fn expand_post(&self, handle: &Element) -> Result<Option<String>> {
        let clicked = handle
            .call_js_fn(EXPAND_JS, false)
            .await
            .context("See-more click failed")?
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !clicked {
            return Ok(None);
        }
        // Give the expanded text a moment to render.
        tokio::time::sleep(Duration::from_millis(500)).await;
        let text = handle
            .inner_text()
            .await
            .context("Re-read after expand failed")?
            .map(|t| t.trim().to_string());
        debug!(expanded = text.is_some(), "Post expansion");
        Ok(text)
    }

    async fn engagement_candidates(&self, handle: &Element) -> Result<EngagementCandidates> {
        let value = handle
            .call_js_fn(CANDIDATES_JS, false)
            .await
            .context("Candidate harvest failed")?
            .result
            .value
            .context("Candidate harvest returned nothing")?;
        let candidates = serde_json::from_value(value).context("Unexpected candidate shape")?;
        Ok(candidates)
    }
}
