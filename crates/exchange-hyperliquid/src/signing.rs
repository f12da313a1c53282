use anyhow::Result;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Signature;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sign a Hyperliquid exchange action
///
/// # Errors
/// Returns error if signing fails
pub async fn sign_action(
    wallet: &LocalWallet,
    action: &serde_json::Value,
    nonce: u64,
) -> Result<Signature> {
    let envelope = json!({
        "action": action,
        "nonce": nonce,
    });

    let message = serde_json::to_string(&envelope)?;
    let signature = wallet.sign_message(message.as_bytes()).await?;

    Ok(signature)
}

/// Convert signature to hex string for the Hyperliquid API
#[must_use]
pub fn signature_to_hex(signature: &Signature) -> String {
    format!("0x{}", hex::encode(signature.to_vec()))
}

/// Monotonic millisecond nonces. The exchange requires each signed action's
/// nonce to exceed the previous one, so concurrent intents must not reuse a
/// timestamp.
pub struct NonceSource {
    next: AtomicU64,
}

impl NonceSource {
    #[must_use]
    pub fn new() -> Self {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        Self {
            next: AtomicU64::new(now),
        }
    }

    pub fn next_nonce(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for NonceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_strictly_increase() {
        let source = NonceSource::new();
        let a = source.next_nonce();
        let b = source.next_nonce();
        let c = source.next_nonce();
        assert!(a < b && b < c);
    }
}
