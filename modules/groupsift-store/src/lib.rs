//! Flat-file persistence for the app: settings, group history, presets,
//! and the per-identity session cookie file. Everything is plain JSON
//! read-modify-write; corruption or absence falls back to defaults.

pub mod history;
pub mod presets;
pub mod settings;

pub use history::GroupEntry;
pub use settings::{parse_keywords, Settings};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "groups_history.json";
const PRESETS_FILE: &str = "presets.json";

/// File-backed store rooted at a directory (the working directory in
/// production, a temp dir in tests).
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn in_current_dir() -> Self {
        Self::new(".")
    }

    // --- Settings ---

    /// Load settings, merging the file over defaults. A missing or
    /// unreadable file yields defaults.
    pub fn load_settings(&self) -> Settings {
        let path = self.root.join(SETTINGS_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Unparseable settings file, using defaults");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(self.root.join(SETTINGS_FILE), raw).context("Failed to write settings")
    }

    // --- Group history ---

    pub fn load_history(&self) -> Vec<GroupEntry> {
        let path = self.root.join(HISTORY_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Prepend a group to the history, de-duplicating by URL and keeping at
    /// most [`history::MAX_ENTRIES`]. A name of `None` derives one from the
    /// URL slug.
    pub fn record_group(&self, url: &str, name: Option<&str>) -> Result<()> {
        let mut entries = self.load_history();
        history::push_entry(&mut entries, url, name);
        let raw = serde_json::to_string_pretty(&entries)?;
        fs::write(self.root.join(HISTORY_FILE), raw).context("Failed to write group history")
    }

    // --- Presets ---

    pub fn load_presets(&self, key: &str) -> Vec<String> {
        let path = self.root.join(PRESETS_FILE);
        let data: serde_json::Value = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => return Vec::new(),
        };
        data.get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Prepend a preset value under `key`, de-duplicating and keeping at
    /// most [`presets::MAX_PER_KEY`]. Blank values are ignored.
    pub fn save_preset(&self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        let path = self.root.join(PRESETS_FILE);
        let mut data: serde_json::Map<String, serde_json::Value> = match fs::read_to_string(&path)
        {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => Default::default(),
        };
        let mut existing: Vec<String> = data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        presets::push_value(&mut existing, value);
        data.insert(key.to_string(), serde_json::to_value(existing)?);
        let raw = serde_json::to_string_pretty(&data)?;
        fs::write(&path, raw).context("Failed to write presets")
    }

    // --- Session cookie file ---

    pub fn session_file(&self, email: &str) -> PathBuf {
        self.root.join(session_file_name(email))
    }

    pub fn session_exists(&self, email: &str) -> bool {
        self.session_file(email).exists()
    }

    pub fn clear_session(&self, email: &str) -> Result<bool> {
        let path = self.session_file(email);
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove session file")?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Session cookie file name for an identity. The empty identity keeps the
/// legacy single-session name; otherwise every non-alphanumeric character
/// of the e-mail becomes `_`.
pub fn session_file_name(email: &str) -> String {
    if email.is_empty() {
        return ".fb_session.json".to_string();
    }
    let slug: String = email
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!(".fb_session_{slug}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn session_file_names() {
        assert_eq!(session_file_name(""), ".fb_session.json");
        assert_eq!(
            session_file_name("test@example.com"),
            ".fb_session_test_example_com.json"
        );
        assert_eq!(
            session_file_name("user+alias@gmail.com"),
            ".fb_session_user_alias_gmail_com.json"
        );
    }

    #[test]
    fn settings_round_trip_preserves_defaults() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());

        // Missing file yields defaults
        let defaults = store.load_settings();
        assert_eq!(defaults.max_posts, 100);
        assert!(defaults.headless);

        let mut settings = defaults;
        settings.group_url = "https://example.com/groups/test".to_string();
        settings.max_posts = 50;
        store.save_settings(&settings).unwrap();

        let loaded = store.load_settings();
        assert_eq!(loaded.group_url, "https://example.com/groups/test");
        assert_eq!(loaded.max_posts, 50);
        // Untouched fields keep their defaults
        assert_eq!(loaded.top_n, 20);
        assert!(loaded.headless);
    }

    #[test]
    fn settings_ignore_unknown_and_fill_missing_keys() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"max_posts": 7, "someone_elses_key": true}"#,
        )
        .unwrap();

        let loaded = store.load_settings();
        assert_eq!(loaded.max_posts, 7);
        assert_eq!(loaded.scroll_wait_ms, 1500);
    }

    #[test]
    fn history_dedups_and_caps() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());

        store
            .record_group("https://example.com/groups/alpha-group/", None)
            .unwrap();
        store
            .record_group("https://example.com/groups/beta", Some("Beta"))
            .unwrap();
        // Re-record alpha — it should move to the front, not duplicate
        store
            .record_group("https://example.com/groups/alpha-group", None)
            .unwrap();

        let entries = store.load_history();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://example.com/groups/alpha-group");
        assert_eq!(entries[0].name, "Alpha Group");
        assert_eq!(entries[1].name, "Beta");

        for i in 0..30 {
            store
                .record_group(&format!("https://example.com/groups/g{i}"), None)
                .unwrap();
        }
        assert_eq!(store.load_history().len(), history::MAX_ENTRIES);
    }

    #[test]
    fn presets_dedup_cap_and_isolate_keys() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());

        store.save_preset("criteria", "first").unwrap();
        store.save_preset("criteria", "second").unwrap();
        store.save_preset("criteria", "first").unwrap();
        store.save_preset("keywords", "pomoc, porada").unwrap();
        store.save_preset("criteria", "   ").unwrap(); // ignored

        assert_eq!(store.load_presets("criteria"), vec!["first", "second"]);
        assert_eq!(store.load_presets("keywords"), vec!["pomoc, porada"]);

        for i in 0..20 {
            store.save_preset("criteria", &format!("v{i}")).unwrap();
        }
        assert_eq!(store.load_presets("criteria").len(), presets::MAX_PER_KEY);
    }

    #[test]
    fn clear_session_reports_presence() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        assert!(!store.clear_session("a@b.c").unwrap());
        std::fs::write(store.session_file("a@b.c"), "[]").unwrap();
        assert!(store.session_exists("a@b.c"));
        assert!(store.clear_session("a@b.c").unwrap());
        assert!(!store.session_exists("a@b.c"));
    }
}
