//! Cookie persistence for session reuse. Cookies are stored as a JSON array
//! of CDP cookie params keyed by identity (see `groupsift-store` for the
//! file naming); a valid cookie file lets a run skip the login flow
//! entirely.

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};

/// Load cookies from `path` into the page's browser context. Returns
/// `false` (without error) when the file is missing or unparseable — the
/// caller falls back to a fresh login.
pub async fn load_into(page: &Page, path: &Path) -> Result<bool> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Ok(false),
    };
    let cookies: Vec<CookieParam> = match serde_json::from_str(&raw) {
        Ok(cookies) => cookies,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unparseable cookie file, ignoring");
            return Ok(false);
        }
    };
    if cookies.is_empty() {
        return Ok(false);
    }
    let count = cookies.len();
    page.set_cookies(cookies).await?;
    debug!(count, path = %path.display(), "Session cookies loaded");
    Ok(true)
}

/// Persist the page's current cookies to `path`.
pub async fn save_from(page: &Page, path: &Path) -> Result<()> {
    let cookies = page.get_cookies().await?;
    // CDP's Cookie and CookieParam share their field names; the serde
    // round-trip drops the read-only fields (size, session, ...) that
    // CookieParam does not accept.
    let params: Vec<CookieParam> = cookies
        .iter()
        .filter_map(|c| {
            serde_json::to_value(c)
                .ok()
                .and_then(|v| serde_json::from_value(v).ok())
        })
        .collect();
    let raw = serde_json::to_string_pretty(&params)
        .map_err(|e| SessionError::CookieStore(e.to_string()))?;
    std::fs::write(path, raw)
        .map_err(|e| SessionError::CookieStore(format!("{}: {e}", path.display())))?;
    debug!(count = params.len(), path = %path.display(), "Session cookies saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_garbage_files_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(std::fs::read_to_string(&missing).is_err());

        let garbage = dir.path().join("bad.json");
        std::fs::write(&garbage, "not json at all").unwrap();
        // Parsing is the part that must tolerate garbage; exercised via the
        // same serde path load_into uses.
        let parsed: std::result::Result<Vec<CookieParam>, _> =
            serde_json::from_str(&std::fs::read_to_string(&garbage).unwrap());
        assert!(parsed.is_err());
    }

    #[test]
    fn cookie_params_round_trip_through_json() {
        let raw = r#"[{"name": "sid", "value": "abc", "domain": ".example.com", "path": "/"}]"#;
        let cookies: Vec<CookieParam> = serde_json::from_str(raw).unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "sid");
        let back = serde_json::to_string(&cookies).unwrap();
        let again: Vec<CookieParam> = serde_json::from_str(&back).unwrap();
        assert_eq!(again[0].value, "abc");
    }
}
