//! Text normalization before ranking and prompting. Feed text arrives
//! with markup fragments, pictographs, and layout whitespace that only
//! cost tokens downstream.

use std::sync::LazyLock;

use regex::Regex;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Strip markup and pictographs, collapse all whitespace runs (newlines
/// included) to single spaces, and trim. Letters of any alphabet survive,
/// so Polish diacritics are kept while emoji are not.
pub fn clean_text(text: &str) -> String {
    let text = HTML_TAG.replace_all(text, "");
    let text: String = text
        .chars()
        .filter(|c| c.is_ascii() || c.is_alphabetic())
        .collect();
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_collapses_whitespace() {
        assert_eq!(
            clean_text("<b>Szukam</b>\n\n  hydraulika\r\n w   Gdańsku"),
            "Szukam hydraulika w Gdańsku"
        );
    }

    #[test]
    fn drops_emoji_but_keeps_diacritics() {
        assert_eq!(clean_text("Polecam 👍🔥 tę firmę! 😀"), "Polecam tę firmę!");
        assert_eq!(clean_text("zażółć gęślą jaźń"), "zażółć gęślą jaźń");
    }

    #[test]
    fn empty_and_whitespace_only_become_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("  \n\t "), "");
        assert_eq!(clean_text("🔥🔥🔥"), "");
    }
}
