use crate::error::WalletError;
use crate::hd_derivation::PrivateKey;
use crate::types::Curve;

/// A per-chain signing strategy.
///
/// The wallet routes `sign(symbol, payload)` to the strategy registered under
/// `symbol`, handing it the key derived at `derivation_path`. Strategies hold
/// no key material themselves and must be callable from many threads at once.
pub trait ChainSigner: Send + Sync {
    /// Asset symbol this strategy answers to, e.g. "ETH".
    fn symbol(&self) -> &str;

    fn curve(&self) -> Curve;

    /// BIP-44 style path for the given account and address index.
    fn derivation_path(&self, account: u32, index: u32) -> String;

    /// Chain-native rendering of the address owned by `key`.
    fn address(&self, key: &PrivateKey) -> Result<String, WalletError>;

    /// Signs `payload` and returns transport-ready output.
    fn sign(&self, key: &PrivateKey, payload: &[u8]) -> Result<String, WalletError>;
}
