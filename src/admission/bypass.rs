//! Bypass authority: operator-issued tokens that skip CAPTCHA and rate
//! limiting, for trusted integration testing against a live deployment.
//!
//! Built from the immutable config snapshot. Fail closed: an unknown or
//! out-of-window token simply isn't authorized; nothing here can error.

use crate::config::schema::BypassTokenConfig;

/// Time-bounded token allow-list.
#[derive(Debug, Clone, Default)]
pub struct BypassAuthority {
    entries: Vec<BypassTokenConfig>,
}

impl BypassAuthority {
    pub fn from_config(entries: &[BypassTokenConfig]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// True iff an entry's token exactly matches and `now_secs` falls
    /// inside its activation window (open-ended when a bound is absent).
    pub fn is_authorized(&self, token: &str, now_secs: i64) -> bool {
        self.entries.iter().any(|entry| {
            entry.token == token
                && entry.starts_at.map_or(true, |start| start < now_secs)
                && entry.ends_at.map_or(true, |end| end > now_secs)
        })
    }
}
