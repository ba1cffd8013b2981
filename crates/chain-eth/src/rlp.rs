//! Recursive Length Prefix items.
//!
//! Transactions are assembled as a small tree of [`RlpItem`]s and serialized
//! with `alloy-rlp`'s header and byte-string rules, which are the canonical
//! Ethereum ones: a single byte below 0x80 is its own encoding, strings up to
//! 55 bytes get a `0x80 + len` prefix, and longer strings and all lists use
//! the length-of-length form.

use alloy_rlp::{BufMut, Encodable, Header};

use crate::bigint::BigInt;
use crate::error::EthError;

/// Deepest list nesting accepted by [`RlpItem::decode`]. Transactions need two.
pub const MAX_DEPTH: usize = 16;

/// A decoded or to-be-encoded RLP value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// A byte string holding the canonical encoding of a non-negative integer.
    pub fn uint(value: &BigInt) -> Result<Self, EthError> {
        Ok(RlpItem::Bytes(value.to_be_bytes_minimal()?))
    }

    pub fn u64(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        RlpItem::Bytes(bytes[start..].to_vec())
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        RlpItem::Bytes(data.into())
    }

    /// Serializes the item.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Encodable::length(self));
        Encodable::encode(self, &mut out);
        out
    }

    /// Parses exactly one item; trailing bytes are an error.
    pub fn decode(buf: &[u8]) -> Result<Self, EthError> {
        let mut cursor = buf;
        let item = decode_item(&mut cursor, 0)?;
        if !cursor.is_empty() {
            return Err(EthError::EncodingError(format!(
                "{} trailing bytes after rlp item",
                cursor.len()
            )));
        }
        Ok(item)
    }

    pub fn as_bytes(&self) -> Result<&[u8], EthError> {
        match self {
            RlpItem::Bytes(b) => Ok(b),
            RlpItem::List(_) => Err(EthError::EncodingError(
                "expected rlp string, found list".into(),
            )),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem], EthError> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(EthError::EncodingError(
                "expected rlp list, found string".into(),
            )),
        }
    }

    /// Reads a canonical integer: no leading zero byte.
    pub fn as_uint(&self) -> Result<BigInt, EthError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(EthError::EncodingError(
                "integer has a leading zero byte".into(),
            ));
        }
        Ok(BigInt::from_be_bytes(bytes))
    }

    pub fn as_u64(&self) -> Result<u64, EthError> {
        self.as_uint()?
            .to_u64()
            .ok_or_else(|| EthError::EncodingError("integer overflows u64".into()))
    }

    fn payload_length(items: &[RlpItem]) -> usize {
        items.iter().map(Encodable::length).sum()
    }
}

impl Encodable for RlpItem {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            RlpItem::Bytes(bytes) => bytes.as_slice().encode(out),
            RlpItem::List(items) => {
                Header {
                    list: true,
                    payload_length: Self::payload_length(items),
                }
                .encode(out);
                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    fn length(&self) -> usize {
        match self {
            RlpItem::Bytes(bytes) => bytes.as_slice().length(),
            RlpItem::List(items) => {
                let payload_length = Self::payload_length(items);
                payload_length + alloy_rlp::length_of_length(payload_length)
            }
        }
    }
}

fn decode_item(buf: &mut &[u8], depth: usize) -> Result<RlpItem, EthError> {
    let header = Header::decode(buf)?;
    if header.payload_length > buf.len() {
        return Err(EthError::EncodingError(format!(
            "rlp payload of {} bytes exceeds remaining {}",
            header.payload_length,
            buf.len()
        )));
    }

    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;

    if !header.list {
        return Ok(RlpItem::Bytes(payload.to_vec()));
    }

    if depth >= MAX_DEPTH {
        return Err(EthError::EncodingError(format!(
            "rlp lists nested deeper than {MAX_DEPTH}"
        )));
    }

    let mut inner = payload;
    let mut items = Vec::new();
    while !inner.is_empty() {
        items.push(decode_item(&mut inner, depth + 1)?);
    }
    Ok(RlpItem::List(items))
}
