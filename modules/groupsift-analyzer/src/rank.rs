//! Keyword pre-filter and engagement-weighted ranking.

use serde::Serialize;

use groupsift_common::EnrichedPost;

use crate::clean::clean_text;

#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Keep only posts mentioning at least one keyword. Empty means keep
    /// everything.
    pub keywords: Vec<String>,
    /// Ranking length after sorting. Zero means unlimited.
    pub top_n: usize,
}

/// A cleaned post with its ranking score, ready for prompting.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPost {
    pub text: String,
    pub reactions: u64,
    pub comments: u64,
    #[serde(skip)]
    pub score: u64,
}

/// Comments are weighted double: a comment takes more intent than a tap
/// on a reaction.
fn score(post: &EnrichedPost) -> u64 {
    post.reactions + 2 * post.comments
}

/// Clean, filter, and rank posts for the report. The sort is stable, so
/// equally scored posts keep their collection order.
pub fn prepare(posts: &[EnrichedPost], options: &RankOptions) -> Vec<RankedPost> {
    let keywords: Vec<String> = options.keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut ranked: Vec<RankedPost> = posts
        .iter()
        .filter_map(|post| {
            let text = clean_text(&post.text);
            if text.is_empty() {
                return None;
            }
            if !keywords.is_empty() {
                let lower = text.to_lowercase();
                if !keywords.iter().any(|kw| lower.contains(kw.as_str())) {
                    return None;
                }
            }
            Some(RankedPost {
                text,
                reactions: post.reactions,
                comments: post.comments,
                score: score(post),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    if options.top_n > 0 {
        ranked.truncate(options.top_n);
    }
    ranked
}
