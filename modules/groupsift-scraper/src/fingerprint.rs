//! Dedup fingerprinting. The same post can re-render with different
//! surrounding whitespace, different casing of auto-linked fragments, or a
//! truncation ellipsis, so uniqueness is decided on a normalized key
//! rather than exact text.

/// Fingerprint cap. Two genuinely distinct posts sharing a prefix this long
/// will collide and the later one is dropped — a known, accepted
/// limitation.
pub const DEDUP_KEY_MAX_CHARS: usize = 400;

/// Case-folded, whitespace-collapsed, ellipsis-stripped, length-capped
/// fingerprint of a post body. Used only for in-run uniqueness; never
/// persisted.
pub fn dedup_key(text: &str) -> String {
    let collapsed = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let trimmed = collapsed
        .trim_end_matches('…')
        .trim_end_matches("...")
        .trim_end();
    trimmed.chars().take(DEDUP_KEY_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_and_case_variants_collapse() {
        assert_eq!(
            dedup_key("  Szukam   polecenia\nhydraulika "),
            dedup_key("szukam polecenia hydraulika")
        );
    }

    #[test]
    fn truncation_ellipsis_collapses() {
        assert_eq!(dedup_key("Długi post o czymś…"), dedup_key("Długi post o czymś"));
        assert_eq!(dedup_key("Long post..."), dedup_key("Long post"));
    }

    #[test]
    fn distinct_short_posts_stay_distinct() {
        assert_ne!(dedup_key("first post"), dedup_key("second post"));
    }

    #[test]
    fn key_is_capped_in_chars_not_bytes() {
        let long = "ż".repeat(1000);
        let key = dedup_key(&long);
        assert_eq!(key.chars().count(), DEDUP_KEY_MAX_CHARS);
    }

    #[test]
    fn long_shared_prefix_collides_by_design() {
        let prefix = "a ".repeat(DEDUP_KEY_MAX_CHARS); // collapses past the cap
        let a = format!("{prefix} unique tail one");
        let b = format!("{prefix} unique tail two");
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }
}
