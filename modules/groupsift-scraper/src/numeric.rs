//! Numeric normalization for engagement labels. The source renders counts
//! with locale digit grouping ("1 234", "1,234", "1.234") and magnitude
//! suffixes ("1.2K", "3M"); every extraction strategy funnels through the
//! same parse so the convention is applied uniformly.

use std::sync::LazyLock;

use regex::Regex;

/// First count-like token in a string: digits with optional grouping
/// separators and an optional K/M magnitude suffix.
static COUNT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d[\d\s\x{00A0}.,]*[KkMm]?)").expect("valid count regex")
});

/// A relative-time token ("2h", "5 d", "3 tyg.") — looks like a bare count
/// but is a timestamp, never an engagement number.
static RELATIVE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d+\s*(h|m|s|d|w|y|min|godz|tyg|dni)\.?$").expect("valid time regex")
});

/// Clickable text announcing a comment count in a supported language.
static COMMENT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d\s\x{00A0}.,]*[KkMm]?)\s*(komentarz|koment|comment)")
        .expect("valid comment regex")
});

/// Parse one count token. Grouping separators (space, NBSP, comma, dot)
/// are stripped; a trailing `K`/`M` multiplies by 1 000 / 1 000 000, with
/// the last separator before the suffix read as a decimal point. Returns
/// `None` for anything that is not a count.
pub fn parse_count(token: &str) -> Option<u64> {
    let compact: String = token
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{00A0}')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let (digits, multiplier) = match compact.chars().last() {
        Some('k') | Some('K') => (&compact[..compact.len() - 1], 1_000u64),
        Some('m') | Some('M') => (&compact[..compact.len() - 1], 1_000_000u64),
        _ => (compact.as_str(), 1),
    };
    if digits.is_empty() || !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    if multiplier == 1 {
        // Separators are grouping only: "1 234" == "1,234" == "1.234".
        let plain: String = digits.chars().filter(char::is_ascii_digit).collect();
        return plain.parse().ok();
    }

    // With a magnitude suffix the last separator is the decimal point:
    // "1.2K" -> 1200, "1,2K" -> 1200.
    let normalized = digits.replace(',', ".");
    let decimal = match normalized.rfind('.') {
        Some(pos) => {
            let integer: String = normalized[..pos].chars().filter(char::is_ascii_digit).collect();
            format!("{integer}.{}", &normalized[pos + 1..])
        }
        None => normalized,
    };
    let value: f64 = decimal.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier as f64).floor() as u64)
}

/// First parseable count anywhere in `text`.
pub fn leading_count(text: &str) -> Option<u64> {
    let m = COUNT_TOKEN.find(text)?;
    parse_count(m.as_str())
}

/// Whether `text` as a whole is a relative-time token rather than a count.
pub fn is_relative_time(text: &str) -> bool {
    RELATIVE_TIME.is_match(text.trim())
}

/// Comment count from a clickable label like "16 komentarzy" / "3 comments".
pub fn comment_count(text: &str) -> Option<u64> {
    let caps = COMMENT_LABEL.captures(text)?;
    parse_count(caps.get(1)?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_separators_are_equivalent() {
        assert_eq!(parse_count("1 234"), Some(1234));
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("1.234"), Some(1234));
        assert_eq!(parse_count("1\u{00A0}234"), Some(1234));
    }

    #[test]
    fn magnitude_suffixes_scale() {
        assert_eq!(parse_count("1.2K"), Some(1200));
        assert_eq!(parse_count("1,2k"), Some(1200));
        assert_eq!(parse_count("3M"), Some(3_000_000));
        assert_eq!(parse_count("2K"), Some(2000));
    }

    #[test]
    fn parse_is_idempotent_on_plain_integers() {
        assert_eq!(parse_count("1234"), Some(1234));
        assert_eq!(parse_count("1200"), Some(1200));
        assert_eq!(parse_count(&1200.to_string()), Some(1200));
    }

    #[test]
    fn junk_is_rejected() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("K"), None);
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn leading_count_finds_embedded_numbers() {
        assert_eq!(leading_count("Lubię to!: 12 osób"), Some(12));
        assert_eq!(leading_count("Like: 12 people"), Some(12));
        assert_eq!(leading_count("1.2K osób"), Some(1200));
        assert_eq!(leading_count("no numbers here"), None);
    }

    #[test]
    fn relative_time_tokens_detected() {
        assert!(is_relative_time("2h"));
        assert!(is_relative_time("5 d"));
        assert!(is_relative_time("3 tyg."));
        assert!(is_relative_time("12 min"));
        assert!(!is_relative_time("12"));
        assert!(!is_relative_time("12 osób"));
    }

    #[test]
    fn comment_labels_in_both_languages() {
        assert_eq!(comment_count("16 komentarzy"), Some(16));
        assert_eq!(comment_count("1 komentarz"), Some(1));
        assert_eq!(comment_count("3 comments"), Some(3));
        assert_eq!(comment_count("1.2K comments"), Some(1200));
        assert_eq!(comment_count("Udostępnij"), None);
        assert_eq!(comment_count("Like"), None);
    }
}
