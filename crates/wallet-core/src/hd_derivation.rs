use std::fmt;

use bip32::{DerivationPath, XPrv};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::WalletError;
use crate::types::Curve;

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;

/// A 32-byte private key, zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Derive the private key at `path` on the given curve.
///
/// secp256k1 keys follow BIP-32; Ed25519 keys follow SLIP-0010, which only
/// defines hardened children.
pub fn derive_key(seed: &[u8], curve: Curve, path: &str) -> Result<PrivateKey, WalletError> {
    match curve {
        Curve::Secp256k1 => derive_secp256k1_key(seed, path),
        Curve::Ed25519 => derive_ed25519_key(seed, path),
    }
}

fn derive_secp256k1_key(seed: &[u8], path: &str) -> Result<PrivateKey, WalletError> {
    let path: DerivationPath = path
        .parse()
        .map_err(|e: bip32::Error| WalletError::KeyUnavailable(e.to_string()))?;

    let xprv = XPrv::derive_from_path(seed, &path)
        .map_err(|e| WalletError::KeyUnavailable(e.to_string()))?;

    Ok(PrivateKey(xprv.to_bytes().into()))
}

fn derive_ed25519_key(seed: &[u8], path: &str) -> Result<PrivateKey, WalletError> {
    // Master key: HMAC-SHA512(key="ed25519 seed", data=seed)
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| WalletError::KeyUnavailable(e.to_string()))?;
    mac.update(seed);
    let result = mac.finalize().into_bytes();

    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    for (child_index, hardened) in parse_derivation_path(path)? {
        if !hardened {
            return Err(WalletError::KeyUnavailable(format!(
                "ed25519 derivation requires hardened indices, got {child_index} in {path}"
            )));
        }

        let mut mac = HmacSha512::new_from_slice(chain_code.as_slice())
            .map_err(|e| WalletError::KeyUnavailable(e.to_string()))?;
        mac.update(&[0x00]);
        mac.update(key.as_slice());
        mac.update(&(child_index | HARDENED).to_be_bytes());
        let result = mac.finalize().into_bytes();

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
    }

    Ok(PrivateKey(*key))
}

/// Parse "m/44'/501'/0'/0'" into [(44, true), (501, true), (0, true), (0, true)]
fn parse_derivation_path(path: &str) -> Result<Vec<(u32, bool)>, WalletError> {
    let rest = path
        .strip_prefix("m/")
        .ok_or_else(|| WalletError::KeyUnavailable("Path must start with m/".into()))?;

    rest.split('/')
        .map(|component| {
            let (num_str, hardened) = match component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
            {
                Some(num) => (num, true),
                None => (component, false),
            };
            let index = num_str.parse::<u32>().map_err(|e| {
                WalletError::KeyUnavailable(format!("Invalid path component {component:?}: {e}"))
            })?;
            if index >= HARDENED {
                return Err(WalletError::KeyUnavailable(format!(
                    "Path component {component:?} out of range"
                )));
            }
            Ok((index, hardened))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;

    // BIP-39 test vector: "abandon" x11 + "about"
    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_seed() -> Zeroizing<Vec<u8>> {
        mnemonic_to_seed(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn test_derive_eth_key_known_vector() {
        use chain_eth::Address;
        use k256::ecdsa::SigningKey;

        let key = derive_key(&test_seed(), Curve::Secp256k1, "m/44'/60'/0'/0/0").unwrap();
        let signing_key = SigningKey::from_bytes(key.as_bytes().into()).unwrap();
        let mut uncompressed = [0u8; 65];
        uncompressed.copy_from_slice(
            signing_key.verifying_key().to_encoded_point(false).as_bytes(),
        );

        assert_eq!(
            Address::from_uncompressed_public_key(&uncompressed).unwrap().to_hex(),
            "0x9858effd232b4033e47d90003d41ec34ecaeda94"
        );
    }

    #[test]
    fn test_derivation_deterministic() {
        let seed = test_seed();
        let key1 = derive_key(&seed, Curve::Secp256k1, "m/44'/60'/0'/0/0").unwrap();
        let key2 = derive_key(&seed, Curve::Secp256k1, "m/44'/60'/0'/0/0").unwrap();
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_paths_different_keys() {
        let seed = test_seed();
        let key0 = derive_key(&seed, Curve::Secp256k1, "m/44'/60'/0'/0/0").unwrap();
        let key1 = derive_key(&seed, Curve::Secp256k1, "m/44'/60'/1'/0/0").unwrap();
        assert_ne!(key0, key1);
    }

    #[test]
    fn test_derive_ed25519_key() {
        let seed = test_seed();
        let key = derive_key(&seed, Curve::Ed25519, "m/44'/501'/0'/0'").unwrap();
        let again = derive_key(&seed, Curve::Ed25519, "m/44'/501'/0'/0'").unwrap();
        let other = derive_key(&seed, Curve::Ed25519, "m/44'/501'/1'/0'").unwrap();
        assert_eq!(key, again);
        assert_ne!(key, other);
    }

    #[test]
    fn test_ed25519_rejects_soft_derivation() {
        let err = derive_key(&test_seed(), Curve::Ed25519, "m/44'/501'/0'/0").unwrap_err();
        assert!(matches!(err, WalletError::KeyUnavailable(_)));
    }

    #[test]
    fn test_slip10_master_vector() {
        // SLIP-0010 test vector 1 for ed25519, chain m/0'.
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let key = derive_key(&seed, Curve::Ed25519, "m/0'").unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
    }

    #[test]
    fn test_invalid_path_errors() {
        let seed = test_seed();
        assert!(derive_key(&seed, Curve::Secp256k1, "44'/60'").is_err());
        assert!(derive_key(&seed, Curve::Ed25519, "m/abc'").is_err());
        assert!(derive_key(&seed, Curve::Ed25519, "44'/501'").is_err());
    }

    #[test]
    fn test_parse_derivation_path() {
        let components = parse_derivation_path("m/44'/60'/0'/0/0").unwrap();
        assert_eq!(
            components,
            vec![(44, true), (60, true), (0, true), (0, false), (0, false)]
        );
        assert!(parse_derivation_path("m/2147483648'").is_err());
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = PrivateKey::from_bytes([7u8; 32]);
        assert_eq!(format!("{key:?}"), "PrivateKey(<redacted>)");
        assert_eq!(key.to_hex().as_str(), "07".repeat(32));
    }
}
