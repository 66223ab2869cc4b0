use serde::{Deserialize, Serialize};

/// A post with best-effort engagement counts attached. This is the unit
/// handed downstream to the analyzer; the order of a run's output matches
/// collection order exactly.
///
/// `0` for either count means "unknown or truly zero" — the markup gives
/// us no way to tell the two apart, and callers must not try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub text: String,
    pub reactions: u64,
    pub comments: u64,
}

impl EnrichedPost {
    /// An enriched post that carries no engagement data — used when
    /// extraction failed, timed out, or the budget ran out.
    pub fn degraded(text: String) -> Self {
        Self {
            text,
            reactions: 0,
            comments: 0,
        }
    }
}

/// Credentials for a login attempt. Both fields may be empty when a
/// persisted session is expected to still be valid.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() || self.password.is_empty()
    }
}
