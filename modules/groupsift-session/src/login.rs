//! Credential login flow: consent dismissal, form fill, submit, and a
//! bounded wait for checkpoint/2FA resolution. The markup is obfuscated and
//! locale-dependent, so every selector comes as an ordered list of known
//! variants and the first hit wins.

use std::time::Duration;

use tracing::{info, warn};

use groupsift_common::{Credentials, ProgressSink};

use crate::error::{Result, SessionError};
use crate::session::Session;

pub const BASE_URL: &str = "https://www.facebook.com/";
pub const LOGIN_URL: &str = "https://www.facebook.com/login";

/// Cookie-consent accept buttons across regions and page versions.
const CONSENT_SELECTORS: &[&str] = &[
    r#"[data-testid="cookie-policy-manage-dialog-accept-button"]"#,
    r#"button[data-cookiebanner="accept_button"]"#,
    r#"[aria-label="Allow all cookies"]"#,
    r#"[aria-label="Zezwól na wszystkie pliki cookie"]"#,
    r#"[title="Allow all cookies"]"#,
    r#"[title="Zezwól na wszystkie pliki cookie"]"#,
];

const LOGIN_BUTTON_SELECTORS: &[&str] = &[
    r#"button[name="login"]"#,
    "#loginbutton",
    r#"[data-testid="royal_login_button"]"#,
];

/// URL fragments that mark a checkpoint / two-factor interstitial.
const CHECKPOINT_MARKERS: &[&str] = &[
    "checkpoint",
    "challenge",
    "two_step",
    "login/device",
    "login/identify",
    "approval",
];

/// How long to watch for a post-submit redirect before concluding.
const REDIRECT_WATCH_SECS: u64 = 15;
/// How long the user gets to resolve a detected 2FA challenge.
const TWO_FACTOR_WAIT_SECS: u64 = 90;

pub fn url_is_checkpoint(url: &str) -> bool {
    let url = url.to_lowercase();
    CHECKPOINT_MARKERS.iter().any(|m| url.contains(m))
}

/// A URL that is on-site and past every login/recovery interstitial.
pub fn url_is_logged_in(url: &str) -> bool {
    let url = url.to_lowercase();
    url.contains("facebook.com")
        && !url.contains("login")
        && !url.contains("recover")
        && !url_is_checkpoint(&url)
}

/// Probe whether the current browser context carries a valid session.
pub async fn is_logged_in(session: &Session) -> bool {
    if session.goto(BASE_URL, Duration::from_secs(20)).await.is_err() {
        return false;
    }
    tokio::time::sleep(Duration::from_secs(2)).await;
    session
        .page()
        .evaluate(
            r#"(() => !document.querySelector('input[name="email"]')
                 && !!document.querySelector('div[role="navigation"]'))()"#,
        )
        .await
        .ok()
        .and_then(|v| v.into_value::<bool>().ok())
        .unwrap_or(false)
}

/// Log in with credentials. Fails with [`SessionError::Auth`] when the
/// credentials are rejected or a 2FA challenge is not resolved in time.
pub async fn login(session: &Session, creds: &Credentials, progress: &ProgressSink) -> Result<()> {
    progress.line("Navigating to login page...");
    session.goto(LOGIN_URL, Duration::from_secs(20)).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    dismiss_consent(session, progress).await;

    progress.line("Entering credentials...");
    fill_input(session, r#"input[name="email"]"#, &creds.email).await?;
    fill_input(session, r#"input[name="pass"]"#, &creds.password).await?;

    if !click_first(session, LOGIN_BUTTON_SELECTORS).await {
        warn!("No login button matched, submitting with Enter");
        if let Ok(el) = session.page().find_element(r#"input[name="pass"]"#).await {
            let _ = el.press_key("Enter").await;
        }
    }

    progress.line("Waiting for login redirect...");
    let mut checkpoint = false;
    for _ in 0..REDIRECT_WATCH_SECS {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let url = current_url(session).await;
        if url_is_checkpoint(&url) {
            checkpoint = true;
            break;
        }
        if url_is_logged_in(&url) {
            break;
        }
    }

    if checkpoint {
        progress.line(format!(
            "2FA/checkpoint detected — approve in your app, waiting up to {TWO_FACTOR_WAIT_SECS}s..."
        ));
        let mut resolved = false;
        for _ in 0..TWO_FACTOR_WAIT_SECS {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if !url_is_checkpoint(&current_url(session).await) {
                resolved = true;
                break;
            }
        }
        if !resolved {
            return Err(SessionError::Auth(
                "2FA challenge not resolved in time".to_string(),
            ));
        }
        progress.line("2FA passed.");
    }

    let url = current_url(session).await;
    if !url_is_logged_in(&url) {
        return Err(SessionError::Auth(format!(
            "Login did not complete (stuck at {url})"
        )));
    }

    info!("Login completed");
    progress.line("Logged in successfully.");
    Ok(())
}

async fn current_url(session: &Session) -> String {
    session
        .page()
        .url()
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn dismiss_consent(session: &Session, progress: &ProgressSink) {
    if click_first(session, CONSENT_SELECTORS).await {
        progress.line("Cookie consent accepted.");
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// Click the first element matching any of the selectors, in order.
/// Best-effort: a stale or covered element is skipped, not an error.
async fn click_first(session: &Session, selectors: &[&str]) -> bool {
    for sel in selectors {
        if let Ok(el) = session.page().find_element(*sel).await {
            if el.click().await.is_ok() {
                return true;
            }
        }
    }
    false
}

async fn fill_input(session: &Session, selector: &str, value: &str) -> Result<()> {
    let el = session
        .page()
        .find_element(selector)
        .await
        .map_err(|e| SessionError::Auth(format!("Login form field {selector} not found: {e}")))?;
    el.click().await?;
    el.type_str(value).await?;
    tokio::time::sleep(Duration::from_millis(600)).await;
    Ok(())
}
