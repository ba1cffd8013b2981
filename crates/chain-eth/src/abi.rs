//! Fixed-layout ABI packing for contract calls.
//!
//! Only static 32-byte argument types are supported; this is not a general
//! ABI codec. New calls get their own packing function on top of
//! [`encode_function_call`].

use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::bigint::BigInt;
use crate::error::EthError;

/// A single static ABI argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer as a big-endian 32-byte word.
    Uint256([u8; 32]),
}

impl AbiParam {
    /// A `uint256` argument. Fails with `InvalidArgument` if `value` is
    /// negative or wider than 256 bits.
    pub fn uint256(value: &BigInt) -> Result<Self, EthError> {
        Ok(AbiParam::Uint256(value.to_be_bytes_32()?))
    }

    fn to_word(&self) -> [u8; 32] {
        match self {
            AbiParam::Address(addr) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(addr.as_bytes());
                word
            }
            AbiParam::Uint256(value) => *value,
        }
    }
}

/// First four bytes of the Keccak-256 hash of a canonical function signature
/// such as `"transfer(address,uint256)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `selector || word(params[0]) || word(params[1]) || ...`
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);
    for param in params {
        data.extend_from_slice(&param.to_word());
    }
    data
}

/// Reads the `index`-th 32-byte word of ABI return data as a `uint256`.
pub fn decode_uint256_word(data: &[u8], index: usize) -> Result<BigInt, EthError> {
    let end = index
        .checked_add(1)
        .and_then(|words| words.checked_mul(32))
        .ok_or_else(|| EthError::EncodingError(format!("word index {index} out of range")))?;
    let word = data.get(end - 32..end).ok_or_else(|| {
        EthError::EncodingError(format!(
            "expected at least {end} bytes of return data, got {}",
            data.len()
        ))
    })?;
    Ok(BigInt::from_be_bytes(word))
}
