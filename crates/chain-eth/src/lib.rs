//! Ethereum transaction core for the wallet.
//!
//! This crate provides:
//! - An arbitrary-precision integer with canonical minimal encoding
//! - 20-byte addresses parsed from and rendered to hex
//! - RLP items over `alloy-rlp`
//! - Legacy and EIP-155 transaction encoding, signing and sender recovery
//! - ERC-20 calldata packing on a minimal static ABI encoder
//!
//! Everything here is pure and synchronous; nonce, gas price and chain id
//! come from the caller.

pub mod abi;
pub mod address;
pub mod bigint;
pub mod erc20;
pub mod error;
pub mod rlp;
pub mod transaction;

pub use address::Address;
pub use bigint::BigInt;
pub use erc20::Erc20Abi;
pub use error::EthError;
pub use transaction::{Signature, SignedTransaction, Transaction};
