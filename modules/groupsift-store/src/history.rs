use serde::{Deserialize, Serialize};

pub const MAX_ENTRIES: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEntry {
    pub name: String,
    pub url: String,
}

/// Prepend an entry, de-duplicating by URL and capping the list.
pub fn push_entry(entries: &mut Vec<GroupEntry>, url: &str, name: Option<&str>) {
    let url = url.trim().trim_end_matches('/').to_string();
    let name = match name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => name_from_url(&url),
    };
    entries.retain(|e| e.url != url);
    entries.insert(0, GroupEntry { name, url });
    entries.truncate(MAX_ENTRIES);
}

/// Derive a human-readable group name from the URL slug.
fn name_from_url(url: &str) -> String {
    let slug = match url.split_once("/groups/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or(rest),
        None => url.rsplit('/').next().unwrap_or(url),
    };
    let name = slug
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        url.to_string()
    } else {
        name
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Display string for a dropdown-style chooser.
pub fn display_choice(entry: &GroupEntry) -> String {
    format!("{} — {}", entry.name, entry.url)
}

/// Inverse of [`display_choice`]; a plain URL passes through unchanged.
pub fn url_from_choice(choice: &str) -> &str {
    match choice.split_once(" — ") {
        Some((_, url)) => url,
        None => choice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_from_group_slug() {
        let mut entries = Vec::new();
        push_entry(
            &mut entries,
            "https://example.com/groups/mamy-z-krakowa/posts",
            None,
        );
        assert_eq!(entries[0].name, "Mamy Z Krakowa");
        assert_eq!(entries[0].url, "https://example.com/groups/mamy-z-krakowa/posts");
    }

    #[test]
    fn explicit_name_wins_over_slug() {
        let mut entries = Vec::new();
        push_entry(
            &mut entries,
            "https://example.com/groups/12345",
            Some("Mamy z Krakowa"),
        );
        assert_eq!(entries[0].name, "Mamy z Krakowa");
    }

    #[test]
    fn choice_round_trip() {
        let entry = GroupEntry {
            name: "My Group".to_string(),
            url: "https://example.com/groups/123".to_string(),
        };
        let choice = display_choice(&entry);
        assert_eq!(url_from_choice(&choice), entry.url);
        assert_eq!(url_from_choice("just a string"), "just a string");
    }
}
