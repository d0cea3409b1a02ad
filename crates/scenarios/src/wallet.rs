//! Wallet loading.
//!
//! Keypairs are read from the JSON byte-array files written by
//! `solana-keygen`. Intermediate copies of the secret are zeroized.

use crate::error::ScenarioError;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use zeroize::Zeroizing;

/// Default keypair location of the Solana CLI, relative to `$HOME`.
pub const DEFAULT_KEYPAIR_PATH: &str = ".config/solana/id.json";

/// Resolves the default keypair path of the Solana CLI.
pub fn default_keypair_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_KEYPAIR_PATH),
        None => PathBuf::from(DEFAULT_KEYPAIR_PATH),
    }
}

/// Reads a keypair from a JSON byte-array file.
pub fn load_keypair(path: &Path) -> Result<Keypair, ScenarioError> {
    let wallet_error = |reason: String| ScenarioError::Wallet {
        path: path.to_path_buf(),
        reason,
    };

    let contents = Zeroizing::new(fs::read_to_string(path).map_err(|e| wallet_error(e.to_string()))?);
    let bytes: Zeroizing<Vec<u8>> =
        Zeroizing::new(serde_json::from_str(&contents).map_err(|e| wallet_error(e.to_string()))?);
    Keypair::try_from(bytes.as_slice()).map_err(|e| wallet_error(e.to_string()))
}

/// The fee payer of a harness run.
pub struct Wallet {
    keypair: Keypair,
    source: PathBuf,
}

impl Wallet {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ScenarioError> {
        let source = path.into();
        let keypair = load_keypair(&source)?;
        info!(wallet = %keypair.pubkey(), path = %source.display(), "Wallet loaded");
        Ok(Self { keypair, source })
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// File the keypair was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("moai-wallet-{}-{name}", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_keypair() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        let path = temp_file("ok.json", &json);

        let wallet = Wallet::load(&path).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
        assert_eq!(wallet.source(), path.as_path());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_keypair_errors() {
        let missing = std::env::temp_dir().join("moai-wallet-does-not-exist.json");
        assert!(matches!(load_keypair(&missing), Err(ScenarioError::Wallet { .. })));

        let short = temp_file("short.json", "[1, 2, 3]");
        assert!(matches!(load_keypair(&short), Err(ScenarioError::Wallet { .. })));
        fs::remove_file(short).unwrap();

        let garbage = temp_file("garbage.json", "not json");
        assert!(matches!(load_keypair(&garbage), Err(ScenarioError::Wallet { .. })));
        fs::remove_file(garbage).unwrap();
    }

    #[test]
    fn test_default_keypair_path() {
        assert!(default_keypair_path().ends_with(DEFAULT_KEYPAIR_PATH));
    }
}
