use hyperhook_core::WebhookConfig;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::net::IpAddr;

/// Webhook authentication state: shared password plus source-IP allowlist.
#[derive(Debug, Clone)]
pub struct WebhookAuth {
    password_digest: [u8; 32],
    password_set: bool,
    allowed_ips: HashSet<IpAddr>,
    enforce_ip_allowlist: bool,
}

impl WebhookAuth {
    #[must_use]
    pub fn new(config: &WebhookConfig) -> Self {
        let mut allowed_ips = HashSet::new();
        for entry in &config.allowed_ips {
            match entry.parse::<IpAddr>() {
                Ok(ip) => {
                    allowed_ips.insert(ip);
                }
                Err(_) => tracing::warn!("Ignoring unparseable allowlist entry: {entry}"),
            }
        }

        Self {
            password_digest: Sha256::digest(config.password.as_bytes()).into(),
            password_set: !config.password.is_empty(),
            allowed_ips,
            enforce_ip_allowlist: config.enforce_ip_allowlist,
        }
    }

    /// Constant-time password check. Comparing fixed-length digests keeps the
    /// comparison independent of where a candidate diverges. An unconfigured
    /// password rejects everything.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        if !self.password_set {
            tracing::error!("Webhook password not configured, rejecting request");
            return false;
        }

        let candidate_digest: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        let mut diff = 0u8;
        for (a, b) in self.password_digest.iter().zip(candidate_digest.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }

    #[must_use]
    pub fn ip_allowed(&self, ip: IpAddr) -> bool {
        if !self.enforce_ip_allowlist {
            return true;
        }
        self.allowed_ips.contains(&ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(password: &str, enforce: bool) -> WebhookConfig {
        WebhookConfig {
            password: password.to_string(),
            allowed_ips: vec!["52.89.214.238".to_string(), "not-an-ip".to_string()],
            enforce_ip_allowlist: enforce,
            default_percent: 5,
        }
    }

    #[test]
    fn accepts_correct_password_only() {
        let auth = WebhookAuth::new(&config("hunter2", true));
        assert!(auth.verify_password("hunter2"));
        assert!(!auth.verify_password("hunter3"));
        assert!(!auth.verify_password(""));
    }

    #[test]
    fn empty_configured_password_rejects_everything() {
        let auth = WebhookAuth::new(&config("", true));
        assert!(!auth.verify_password(""));
        assert!(!auth.verify_password("anything"));
    }

    #[test]
    fn allowlist_enforced_and_bad_entries_skipped() {
        let auth = WebhookAuth::new(&config("pw", true));
        assert!(auth.ip_allowed("52.89.214.238".parse().unwrap()));
        assert!(!auth.ip_allowed("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn allowlist_disabled_admits_any_ip() {
        let auth = WebhookAuth::new(&config("pw", false));
        assert!(auth.ip_allowed("10.0.0.1".parse().unwrap()));
    }
}
