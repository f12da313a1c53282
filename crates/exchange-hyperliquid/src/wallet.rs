use anyhow::{Context, Result};
use ethers::signers::{LocalWallet, Signer};
use std::str::FromStr;

/// Create wallet from private key (with or without 0x prefix)
///
/// # Errors
/// Returns error if private key format is invalid
pub fn create_wallet_from_private_key(private_key: &str) -> Result<LocalWallet> {
    let key = private_key.strip_prefix("0x").unwrap_or(private_key);

    LocalWallet::from_str(key).context("Failed to create wallet from private key")
}

/// Load wallet from environment variable
///
/// Expected env var: `HYPERLIQUID_PRIVATE_KEY` (64 hex chars, with or without 0x)
///
/// # Errors
/// Returns error if environment variable is missing or invalid
pub fn load_wallet_from_env() -> Result<LocalWallet> {
    let private_key = std::env::var("HYPERLIQUID_PRIVATE_KEY")
        .context("Missing HYPERLIQUID_PRIVATE_KEY env var")?;

    create_wallet_from_private_key(&private_key)
}

/// Hex-encoded (0x-prefixed, lowercase) address for the wallet, the form the
/// info endpoint expects for user-state queries.
#[must_use]
pub fn wallet_address(wallet: &LocalWallet) -> String {
    format!("{:#x}", wallet.address())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x0123456789012345678901234567890123456789012345678901234567890123";

    #[test]
    fn accepts_key_with_and_without_prefix() {
        let with = create_wallet_from_private_key(TEST_KEY).unwrap();
        let without = create_wallet_from_private_key(&TEST_KEY[2..]).unwrap();
        assert_eq!(with.address(), without.address());
    }

    #[test]
    fn address_is_lowercase_hex() {
        let wallet = create_wallet_from_private_key(TEST_KEY).unwrap();
        let addr = wallet_address(&wallet);
        assert!(addr.starts_with("0x"));
        assert_eq!(addr.len(), 42);
        assert_eq!(addr, addr.to_lowercase());
    }
}
