//! Solana signing strategy.
//!
//! Wire layout of a signed transaction:
//!
//! ```text
//!   num_signatures      compact-u16 (always 1 here)
//!   signature           64 bytes
//!   message
//!     header            3 bytes: required sigs, readonly signed, readonly unsigned
//!     num_accounts      compact-u16
//!     account_keys      32 bytes each, fee payer first
//!     ...
//! ```
//!
//! Only single-signer messages are accepted, and the fee payer must be the
//! wallet's own key.

use ed25519_dalek::{Signer, SigningKey};

use crate::error::WalletError;
use crate::hd_derivation::PrivateKey;
use crate::signer::ChainSigner;
use crate::types::{Curve, SOL};

/// Solana strategy: the payload is a serialized message, the output is the
/// base58 wire transaction accepted by `sendTransaction`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolSigner;

impl SolSigner {
    fn signing_key(key: &PrivateKey) -> SigningKey {
        SigningKey::from_bytes(key.as_bytes())
    }
}

impl ChainSigner for SolSigner {
    fn symbol(&self) -> &str {
        SOL
    }

    fn curve(&self) -> Curve {
        Curve::Ed25519
    }

    // Solana wallets stop at the account level; the index is unused.
    fn derivation_path(&self, account: u32, _index: u32) -> String {
        format!("m/44'/501'/{account}'/0'")
    }

    fn address(&self, key: &PrivateKey) -> Result<String, WalletError> {
        let pubkey = Self::signing_key(key).verifying_key().to_bytes();
        Ok(bs58::encode(pubkey).into_string())
    }

    fn sign(&self, key: &PrivateKey, payload: &[u8]) -> Result<String, WalletError> {
        let signing_key = Self::signing_key(key);
        let our_pubkey = signing_key.verifying_key().to_bytes();

        let fee_payer = single_signer_fee_payer(payload)?;
        if fee_payer != our_pubkey {
            return Err(WalletError::SigningFailure(
                "wallet pubkey is not the message fee payer".into(),
            ));
        }

        let signature = signing_key.sign(payload);

        let mut wire = Vec::with_capacity(1 + 64 + payload.len());
        wire.extend_from_slice(&encode_compact_u16(1));
        wire.extend_from_slice(&signature.to_bytes());
        wire.extend_from_slice(payload);

        tracing::debug!(payload_len = payload.len(), "signed SOL transaction");

        Ok(bs58::encode(wire).into_string())
    }
}

/// Checks the message header and returns the fee payer's key.
fn single_signer_fee_payer(message: &[u8]) -> Result<[u8; 32], WalletError> {
    if message.len() < 4 {
        return Err(WalletError::EncodingFailure("message too short".into()));
    }

    let num_required_sigs = message[0];
    if num_required_sigs != 1 {
        return Err(WalletError::InvalidArgument(format!(
            "expected a single-signer message, got {num_required_sigs} required signatures"
        )));
    }

    let (num_accounts, compact_len) = decode_compact_u16(&message[3..])?;
    if num_accounts == 0 {
        return Err(WalletError::EncodingFailure("message has no account keys".into()));
    }

    let start = 3 + compact_len;
    let fee_payer = message
        .get(start..start + 32)
        .ok_or_else(|| WalletError::EncodingFailure("message too short for account keys".into()))?;

    let mut key = [0u8; 32];
    key.copy_from_slice(fee_payer);
    Ok(key)
}

/// Encode a `u16` value in Solana's compact-u16 format.
fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(3);
    let mut rem = value;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return out;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Returns `(value, bytes_consumed)`.
fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), WalletError> {
    let mut value: u32 = 0;
    for (i, byte) in data.iter().take(3).enumerate() {
        value |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return u16::try_from(value)
                .map(|v| (v, i + 1))
                .map_err(|_| WalletError::EncodingFailure("compact-u16 value overflow".into()));
        }
    }
    Err(WalletError::EncodingFailure(
        "unexpected end of data while decoding compact-u16".into(),
    ))
}
