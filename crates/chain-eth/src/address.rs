use std::fmt;
use std::str::FromStr;

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// A 20-byte Ethereum account or contract address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EthError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| {
            EthError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Parses a hex address. The `0x` prefix is optional and letter case is
    /// ignored, so EIP-55 checksummed input is accepted but not verified.
    pub fn from_hex(s: &str) -> Result<Self, EthError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if hex_part.len() != 40 {
            return Err(EthError::InvalidAddress(format!(
                "expected 40 hex characters, got {}",
                hex_part.len()
            )));
        }

        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EthError::InvalidAddress(
                "address contains non-hex characters".into(),
            ));
        }

        let mut addr = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut addr)
            .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
        Ok(Self(addr))
    }

    /// Replaces the address in place. On error `self` is left untouched.
    pub fn set_hex(&mut self, s: &str) -> Result<(), EthError> {
        *self = Self::from_hex(s)?;
        Ok(())
    }

    /// Lowercase `0x`-prefixed rendering.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Derives the address of an uncompressed secp256k1 public key
    /// (65 bytes, starting with 0x04): the last 20 bytes of the Keccak-256
    /// hash of the 64-byte point.
    pub fn from_uncompressed_public_key(pubkey: &[u8; 65]) -> Result<Self, EthError> {
        if pubkey[0] != 0x04 {
            return Err(EthError::InvalidArgument(
                "uncompressed key must start with 0x04".into(),
            ));
        }

        let hash = Keccak256::digest(&pubkey[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hash[12..]);
        Ok(Self(addr))
    }

    /// Derives the address of a k256 public key.
    pub fn from_public_key(pubkey: &PublicKey) -> Self {
        let uncompressed = pubkey.to_encoded_point(false);
        let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hash[12..]);
        Self(addr)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for alloy_primitives::Address {
    fn from(addr: Address) -> Self {
        alloy_primitives::Address::from(addr.0)
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(addr: alloy_primitives::Address) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(addr.as_slice());
        Self(bytes)
    }
}
