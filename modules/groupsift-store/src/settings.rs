use serde::{Deserialize, Serialize};

pub const DEFAULT_CRITERIA: &str = "z czym ludzie mają największe zmagania, \
jakiej szukają pomocy, \
z jakimi problemami mierzą się na codzień";

/// User-facing settings persisted between runs. Every field has a serde
/// default so a settings file from an older version still loads, and
/// unknown keys from a newer version are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub group_url: String,
    pub email: String,
    pub save_session: bool,
    pub max_posts: usize,
    pub top_n: usize,
    pub criteria_description: String,
    pub custom_keywords: String,
    pub gemini_api_key: String,
    pub headless: bool,
    pub scroll_wait_ms: u64,
    pub per_post_timeout: f64,
    pub enrich_total_timeout: f64,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            group_url: String::new(),
            email: String::new(),
            save_session: true,
            max_posts: 100,
            top_n: 20,
            criteria_description: DEFAULT_CRITERIA.to_string(),
            custom_keywords: String::new(),
            gemini_api_key: String::new(),
            headless: true,
            scroll_wait_ms: 1500,
            per_post_timeout: 5.0,
            enrich_total_timeout: 60.0,
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Split a comma-separated keyword field into trimmed, non-empty keywords.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keywords_trims_and_drops_empties() {
        assert_eq!(parse_keywords("foo, bar, baz "), vec!["foo", "bar", "baz"]);
        assert_eq!(parse_keywords("  test  "), vec!["test"]);
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , ,").is_empty());
    }
}
