//! Arbitrary-precision integer used for amounts, gas prices and signature
//! components.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use num_bigint::Sign;

use crate::error::EthError;

/// A signed arbitrary-precision integer.
///
/// Values that reach the wire (amounts, gas price, r/s) must be non-negative;
/// the encoding helpers enforce that. Negative values only exist so that a bad
/// input can be represented long enough to be rejected with a typed error.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigInt(num_bigint::BigInt);

impl BigInt {
    /// The value zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Interprets `bytes` as an unsigned big-endian integer. Leading zeros are
    /// allowed; an empty slice is zero.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self(num_bigint::BigInt::from_bytes_be(Sign::Plus, bytes))
    }

    /// Parses a decimal string, or a `0x`-prefixed hex string.
    pub fn parse(s: &str) -> Result<Self, EthError> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let parsed = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            Some(hex_digits) => num_bigint::BigInt::parse_bytes(hex_digits.as_bytes(), 16),
            None => num_bigint::BigInt::parse_bytes(body.as_bytes(), 10),
        };

        // parse_bytes tolerates an inner sign and underscores; reject both.
        let clean = !body.is_empty() && !body.contains(['+', '-', '_']);
        match parsed {
            Some(value) if clean => Ok(Self(if negative { -value } else { value })),
            _ => Err(EthError::InvalidValue(format!("not an integer: {s:?}"))),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    /// Number of significant bits in the magnitude.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Returns `self` unchanged, or `InvalidValue` if it is negative.
    ///
    /// `field` names the value in the error message.
    pub fn ensure_non_negative(self, field: &str) -> Result<Self, EthError> {
        if self.is_negative() {
            return Err(EthError::InvalidValue(format!(
                "{field} must be non-negative, got {self}"
            )));
        }
        Ok(self)
    }

    /// Canonical minimal big-endian encoding: no leading zero byte, and zero
    /// encodes as an empty byte sequence.
    pub fn to_be_bytes_minimal(&self) -> Result<Vec<u8>, EthError> {
        match self.0.sign() {
            Sign::Minus => Err(EthError::InvalidValue(format!(
                "cannot encode negative integer {self}"
            ))),
            Sign::NoSign => Ok(Vec::new()),
            Sign::Plus => Ok(self.0.magnitude().to_bytes_be()),
        }
    }

    /// Converts to a 256-bit unsigned integer.
    ///
    /// Fails with `InvalidArgument` when the value is negative or does not fit
    /// in 256 bits.
    pub fn to_u256(&self) -> Result<U256, EthError> {
        if self.is_negative() {
            return Err(EthError::InvalidArgument(format!(
                "{self} is negative, expected uint256"
            )));
        }
        if self.bits() > 256 {
            return Err(EthError::InvalidArgument(format!(
                "{self} does not fit in 256 bits"
            )));
        }
        let bytes = self.0.magnitude().to_bytes_be();
        U256::try_from_be_slice(&bytes)
            .ok_or_else(|| EthError::InvalidArgument(format!("{self} does not fit in 256 bits")))
    }

    /// Left-padded 32-byte big-endian form, as used by ABI words.
    pub fn to_be_bytes_32(&self) -> Result<[u8; 32], EthError> {
        Ok(self.to_u256()?.to_be_bytes::<32>())
    }

    pub fn to_u64(&self) -> Option<u64> {
        u64::try_from(&self.0).ok()
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BigInt {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! impl_from_native {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BigInt {
                fn from(value: $t) -> Self {
                    Self(num_bigint::BigInt::from(value))
                }
            }
        )*
    };
}

impl_from_native!(i32, i64, i128, u8, u32, u64, u128);

impl From<U256> for BigInt {
    fn from(value: U256) -> Self {
        Self::from_be_bytes(&value.to_be_bytes::<32>())
    }
}
