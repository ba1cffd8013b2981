//! Symbol-keyed signing wallet.
//!
//! A [`Wallet`] owns a BIP-39 seed and a set of [`ChainSigner`] strategies.
//! Callers hand it an asset symbol and an opaque payload; the wallet derives
//! (and caches) that asset's key and lets the strategy produce transport-ready
//! output. For "ETH" the payload is an unsigned RLP transaction from
//! `chain_eth` and the output is the raw signed transaction hex.

pub mod error;
pub mod eth_signer;
pub mod hd_derivation;
pub mod mnemonic;
pub mod signer;
pub mod sol_signer;
pub mod types;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretSlice};
use zeroize::Zeroizing;

pub use error::WalletError;
pub use eth_signer::EthSigner;
pub use hd_derivation::PrivateKey;
pub use mnemonic::{generate_mnemonic, mnemonic_to_seed, validate_mnemonic};
pub use signer::ChainSigner;
pub use sol_signer::SolSigner;
pub use types::{Curve, WalletOptions};

/// BIP-32 accepts seeds of 128 to 512 bits.
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

pub struct Wallet {
    seed: SecretSlice<u8>,
    account: u32,
    index: u32,
    signers: HashMap<String, Arc<dyn ChainSigner>>,
    keys: RwLock<HashMap<String, PrivateKey>>,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("account", &self.account)
            .field("index", &self.index)
            .field("assets", &self.supported_assets())
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Opens a wallet from a BIP-39 phrase and optional passphrase.
    pub fn from_mnemonic(
        phrase: &str,
        passphrase: &str,
        options: WalletOptions,
    ) -> Result<Self, WalletError> {
        let seed = mnemonic::mnemonic_to_seed(phrase, passphrase)?;
        Self::from_seed(&seed, options)
    }

    /// Opens a wallet from raw seed bytes. The bytes are copied into a secret
    /// buffer; the caller keeps ownership of (and should zeroize) its copy.
    pub fn from_seed(seed: &[u8], options: WalletOptions) -> Result<Self, WalletError> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(WalletError::InvalidArgument(format!(
                "seed must be {MIN_SEED_LEN} to {MAX_SEED_LEN} bytes, got {}",
                seed.len()
            )));
        }
        options.validate()?;

        let mut signers: HashMap<String, Arc<dyn ChainSigner>> = HashMap::new();
        for symbol in &options.assets {
            let signer: Arc<dyn ChainSigner> = match symbol.as_str() {
                types::ETH => Arc::new(EthSigner::new(options.eth_chain_id)),
                types::SOL => Arc::new(SolSigner),
                other => {
                    return Err(WalletError::Config(format!(
                        "no signing strategy for asset {other:?}"
                    )))
                }
            };
            signers.insert(symbol.clone(), signer);
        }

        tracing::debug!(
            account = options.account,
            index = options.index,
            assets = ?options.assets,
            "wallet opened"
        );

        Ok(Self {
            seed: SecretSlice::from(seed.to_vec()),
            account: options.account,
            index: options.index,
            signers,
            keys: RwLock::new(HashMap::new()),
        })
    }

    /// Registers (or replaces) the strategy for `signer.symbol()`.
    pub fn with_signer(mut self, signer: impl ChainSigner + 'static) -> Self {
        let symbol = signer.symbol().to_string();
        self.keys
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&symbol);
        self.signers.insert(symbol, Arc::new(signer));
        self
    }

    /// Registered symbols, sorted.
    pub fn supported_assets(&self) -> Vec<String> {
        let mut assets: Vec<String> = self.signers.keys().cloned().collect();
        assets.sort();
        assets
    }

    /// Signs `payload` with the key for `symbol`.
    pub fn sign(&self, symbol: &str, payload: &[u8]) -> Result<String, WalletError> {
        let signer = self.signer(symbol)?;
        let key = self.key(symbol, signer.as_ref())?;
        tracing::trace!(symbol, payload_len = payload.len(), "signing");
        signer.sign(&key, payload)
    }

    /// Like [`sign`](Self::sign), for a hex payload with optional `0x`.
    pub fn sign_hex(&self, symbol: &str, payload_hex: &str) -> Result<String, WalletError> {
        let stripped = payload_hex.strip_prefix("0x").unwrap_or(payload_hex);
        let payload = hex::decode(stripped)
            .map_err(|e| WalletError::InvalidValue(format!("payload hex: {e}")))?;
        self.sign(symbol, &payload)
    }

    /// Address owned by this wallet on the chain behind `symbol`.
    pub fn address(&self, symbol: &str) -> Result<String, WalletError> {
        let signer = self.signer(symbol)?;
        let key = self.key(symbol, signer.as_ref())?;
        signer.address(&key)
    }

    /// Exports the private key for `symbol` as lowercase hex.
    ///
    /// The result is sensitive: it zeroizes on drop, and callers should not
    /// copy it anywhere that does not.
    pub fn derive_private_key(&self, symbol: &str) -> Result<Zeroizing<String>, WalletError> {
        let signer = self.signer(symbol)?;
        let key = self.key(symbol, signer.as_ref())?;
        tracing::debug!(symbol, "private key exported");
        Ok(key.to_hex())
    }

    fn signer(&self, symbol: &str) -> Result<Arc<dyn ChainSigner>, WalletError> {
        self.signers
            .get(symbol)
            .cloned()
            .ok_or_else(|| WalletError::UnknownAsset(symbol.to_string()))
    }

    fn key(&self, symbol: &str, signer: &dyn ChainSigner) -> Result<PrivateKey, WalletError> {
        {
            let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(key) = keys.get(symbol) {
                return Ok(key.clone());
            }
        }

        let path = signer.derivation_path(self.account, self.index);
        let key = hd_derivation::derive_key(self.seed.expose_secret(), signer.curve(), &path)?;
        tracing::trace!(symbol, path = %path, "derived key");

        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        Ok(keys.entry(symbol.to_string()).or_insert(key).clone())
    }
}
