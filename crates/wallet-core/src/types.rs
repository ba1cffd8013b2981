use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Symbol of the Ethereum signing strategy.
pub const ETH: &str = "ETH";
/// Symbol of the Solana signing strategy.
pub const SOL: &str = "SOL";

/// Signature curve an asset's keys live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curve {
    Secp256k1,
    Ed25519,
}

/// Wallet construction options.
///
/// Every field has a default, so `{}` is a valid JSON configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalletOptions {
    /// BIP-44 account used for every asset.
    pub account: u32,
    /// BIP-44 address index used for every asset that has one.
    pub index: u32,
    /// EIP-155 chain id for ETH signatures. When absent, ETH transactions get
    /// legacy `v = 27 | 28` signatures that any chain accepts.
    pub eth_chain_id: Option<u64>,
    /// Symbols to register signing strategies for.
    pub assets: Vec<String>,
}

impl Default for WalletOptions {
    fn default() -> Self {
        Self {
            account: 0,
            index: 0,
            eth_chain_id: None,
            assets: vec![ETH.to_string(), SOL.to_string()],
        }
    }
}

impl WalletOptions {
    /// Parses options from JSON, e.g. `{"eth_chain_id": 1337}`.
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        let options: WalletOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        for symbol in &self.assets {
            if symbol != ETH && symbol != SOL {
                return Err(WalletError::Config(format!(
                    "no signing strategy for asset {symbol:?}"
                )));
            }
        }
        if self.eth_chain_id == Some(0) {
            return Err(WalletError::Config("eth_chain_id must be positive".into()));
        }
        Ok(())
    }
}
