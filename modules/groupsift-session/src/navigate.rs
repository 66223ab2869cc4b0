//! Target-page navigation glue: open the group feed, clear blocking
//! dialogs, and discover a human-readable group name. Everything here is
//! best-effort — a slow or partially broken page load downgrades to a
//! warning and the scrape continues against whatever rendered.

use std::time::Duration;

use tracing::warn;

use groupsift_common::ProgressSink;

use crate::session::Session;

const DISMISS_SELECTORS: &[&str] = &[
    r#"[aria-label="Close"]"#,
    r#"[aria-label="Zamknij"]"#,
];

/// og:title → first h1 → JSON-LD name, evaluated in one pass.
const GROUP_NAME_JS: &str = r#"(() => {
    const og = document.querySelector('meta[property="og:title"]');
    if (og && og.content && og.content.trim().toLowerCase() !== 'facebook') {
        return og.content.trim();
    }
    const h1 = document.querySelector('h1');
    if (h1 && h1.textContent.trim()) return h1.textContent.trim();
    for (const s of document.querySelectorAll('script[type="application/ld+json"]')) {
        try {
            const d = JSON.parse(s.textContent);
            if (d && d.name && /Group|Place/.test(d['@type'] || '')) return d.name;
        } catch (e) {}
    }
    return '';
})()"#;

/// Navigate to the group feed. Navigation failure is the transient error
/// class: logged, reported on the progress channel, never fatal.
pub async fn goto_group(session: &Session, group_url: &str, progress: &ProgressSink) {
    progress.line(format!("Navigating to group: {group_url}"));
    if let Err(e) = session.goto(group_url, Duration::from_secs(60)).await {
        warn!(group_url, error = %e, "Group navigation failed, continuing best-effort");
        progress.line(format!("Navigation warning (continuing): {e}"));
    }
    tokio::time::sleep(Duration::from_secs(4)).await;
    dismiss_dialogs(session).await;
}

/// Best-effort group name; empty when undiscoverable.
pub async fn discover_group_name(session: &Session) -> String {
    let raw = session
        .page()
        .evaluate(GROUP_NAME_JS)
        .await
        .ok()
        .and_then(|v| v.into_value::<String>().ok())
        .unwrap_or_default();
    clean_group_name(&raw)
}

async fn dismiss_dialogs(session: &Session) {
    for sel in DISMISS_SELECTORS {
        if let Ok(el) = session.page().find_element(*sel).await {
            if el.click().await.is_ok() {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}

/// Strip the site's own branding from a discovered title.
pub fn clean_group_name(raw: &str) -> String {
    let mut name = raw.trim();
    for suffix in ["| Facebook", "- Facebook"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.trim_end();
        }
    }
    for prefix in ["Facebook -", "Facebook |"] {
        if let Some(stripped) = name.strip_prefix(prefix) {
            name = stripped.trim_start();
        }
    }
    if name.eq_ignore_ascii_case("facebook") {
        return String::new();
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_site_branding() {
        assert_eq!(clean_group_name("Mamy z Krakowa | Facebook"), "Mamy z Krakowa");
        assert_eq!(clean_group_name("Facebook - Mamy z Krakowa"), "Mamy z Krakowa");
        assert_eq!(clean_group_name("  Mamy z Krakowa  "), "Mamy z Krakowa");
    }

    #[test]
    fn bare_site_name_is_no_name() {
        assert_eq!(clean_group_name("Facebook"), "");
        assert_eq!(clean_group_name(""), "");
    }
}
