//! Identity normalization and trust-tier resolution.

use crate::admission::types::TrustTier;
use crate::config::schema::LimitsConfig;
use crate::config::RatePolicy;

/// Canonicalize a raw client IP into a stable rate-limit key.
///
/// Strips the address-family punctuation: every `:` for IPv6-form input,
/// every `.` for IPv4-form input. Pure and total; malformed input just
/// yields a different stable key, which is self-consistent.
pub fn normalize_ip(raw: &str) -> String {
    if raw.contains(':') {
        raw.replace(':', "")
    } else {
        raw.replace('.', "")
    }
}

impl TrustTier {
    /// Classify a request by whether it carries a verified external
    /// identity.
    pub fn for_identity(external_identity: Option<&str>) -> Self {
        match external_identity {
            Some(id) if !id.is_empty() => TrustTier::Elevated,
            _ => TrustTier::Default,
        }
    }
}

/// Select the rate-limit policy for a trust tier. Additional tiers slot
/// in here without touching the pipeline's control flow.
pub fn policy_for_tier(limits: &LimitsConfig, tier: TrustTier) -> RatePolicy {
    match tier {
        TrustTier::Default => limits.default,
        TrustTier::Elevated => limits.elevated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_loses_dots() {
        assert_eq!(normalize_ip("203.0.113.7"), "20301137");
    }

    #[test]
    fn test_ipv6_loses_colons() {
        assert_eq!(normalize_ip("2001:db8::1"), "2001db81");
        // Mapped addresses take the IPv6 branch; dots survive.
        assert_eq!(normalize_ip("::ffff:1.2.3.4"), "ffff1.2.3.4");
    }

    #[test]
    fn test_deterministic() {
        for input in ["203.0.113.7", "2001:db8::1", "garbage-input", ""] {
            assert_eq!(normalize_ip(input), normalize_ip(input));
        }
    }

    #[test]
    fn test_tier_resolution() {
        assert_eq!(TrustTier::for_identity(None), TrustTier::Default);
        assert_eq!(TrustTier::for_identity(Some("")), TrustTier::Default);
        assert_eq!(TrustTier::for_identity(Some("8675309")), TrustTier::Elevated);
    }

    #[test]
    fn test_policy_selection() {
        let mut limits = LimitsConfig::default();
        limits.elevated.allowed_requests = 10;

        assert_eq!(policy_for_tier(&limits, TrustTier::Default).allowed_requests, 2);
        assert_eq!(policy_for_tier(&limits, TrustTier::Elevated).allowed_requests, 10);
    }
}
