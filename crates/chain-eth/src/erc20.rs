use crate::abi::{decode_uint256_word, encode_function_call, selector, AbiParam};
use crate::address::Address;
use crate::bigint::BigInt;
use crate::error::EthError;

pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";
pub const APPROVE_SIGNATURE: &str = "approve(address,uint256)";
pub const TRANSFER_FROM_SIGNATURE: &str = "transferFrom(address,address,uint256)";
pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";

/// Calldata packer for the ERC-20 token interface.
///
/// Selectors are derived once from the canonical signatures. The value is
/// immutable and can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Erc20Abi {
    transfer: [u8; 4],
    approve: [u8; 4],
    transfer_from: [u8; 4],
    balance_of: [u8; 4],
}

impl Default for Erc20Abi {
    fn default() -> Self {
        Self::new()
    }
}

impl Erc20Abi {
    pub fn new() -> Self {
        Self {
            transfer: selector(TRANSFER_SIGNATURE),
            approve: selector(APPROVE_SIGNATURE),
            transfer_from: selector(TRANSFER_FROM_SIGNATURE),
            balance_of: selector(BALANCE_OF_SIGNATURE),
        }
    }

    /// Packs `transfer(to, amount)`: 4-byte selector followed by two 32-byte
    /// words, 68 bytes in total.
    ///
    /// Fails with `InvalidArgument` if `amount` is negative or does not fit in
    /// 256 bits.
    pub fn packed_transfer(&self, to: &Address, amount: &BigInt) -> Result<Vec<u8>, EthError> {
        let params = [AbiParam::Address(*to), AbiParam::uint256(amount)?];
        Ok(encode_function_call(self.transfer, &params))
    }

    /// Packs `approve(spender, amount)`.
    pub fn packed_approve(&self, spender: &Address, amount: &BigInt) -> Result<Vec<u8>, EthError> {
        let params = [AbiParam::Address(*spender), AbiParam::uint256(amount)?];
        Ok(encode_function_call(self.approve, &params))
    }

    /// Packs `transferFrom(from, to, amount)`.
    pub fn packed_transfer_from(
        &self,
        from: &Address,
        to: &Address,
        amount: &BigInt,
    ) -> Result<Vec<u8>, EthError> {
        let params = [
            AbiParam::Address(*from),
            AbiParam::Address(*to),
            AbiParam::uint256(amount)?,
        ];
        Ok(encode_function_call(self.transfer_from, &params))
    }

    /// Packs `balanceOf(owner)`.
    pub fn packed_balance_of(&self, owner: &Address) -> Vec<u8> {
        encode_function_call(self.balance_of, &[AbiParam::Address(*owner)])
    }

    /// Decodes the single `uint256` returned by `balanceOf` and friends.
    pub fn decode_uint256(&self, data: &[u8]) -> Result<BigInt, EthError> {
        decode_uint256_word(data, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x9461d8c5D4d7567E889eAB278851ce6556Ce05d9";
    const E18: u128 = 1_000_000_000_000_000_000;

    fn recipient() -> Address {
        Address::from_hex(RECIPIENT).unwrap()
    }

    #[test]
    fn packed_transfer_layout() {
        let amount = BigInt::from(2 * E18 + E18 / 10);
        let data = Erc20Abi::new().packed_transfer(&recipient(), &amount).unwrap();

        assert_eq!(data.len(), 68);
        assert_eq!(hex::encode(&data[..4]), "a9059cbb");
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], recipient().as_bytes());
        // 2.1e18 = 0x1d24b2dfac520000
        assert_eq!(
            hex::encode(&data[36..68]),
            "0000000000000000000000000000000000000000000000001d24b2dfac520000"
        );
    }

    #[test]
    fn packed_transfer_full_calldata() {
        let data = Erc20Abi::new()
            .packed_transfer(&recipient(), &BigInt::from(E18))
            .unwrap();
        assert_eq!(
            hex::encode(data),
            concat!(
                "a9059cbb",
                "0000000000000000000000009461d8c5d4d7567e889eab278851ce6556ce05d9",
                "0000000000000000000000000000000000000000000000000de0b6b3a7640000",
            )
        );
    }

    #[test]
    fn packed_transfer_rejects_negative_amount() {
        let err = Erc20Abi::new()
            .packed_transfer(&recipient(), &BigInt::from(-1i64))
            .unwrap_err();
        assert!(matches!(err, EthError::InvalidArgument(_)));
    }

    #[test]
    fn packed_transfer_rejects_amount_over_256_bits() {
        let too_big = BigInt::from_be_bytes(&[0x01; 33]);
        let err = Erc20Abi::new().packed_transfer(&recipient(), &too_big).unwrap_err();
        assert!(matches!(err, EthError::InvalidArgument(_)));
    }

    #[test]
    fn packed_approve_layout() {
        let data = Erc20Abi::new()
            .packed_approve(&recipient(), &BigInt::from(100u64))
            .unwrap();
        assert_eq!(data.len(), 68);
        assert_eq!(hex::encode(&data[..4]), "095ea7b3");
        assert_eq!(data[67], 100);
    }

    #[test]
    fn packed_transfer_from_layout() {
        let from = Address::from_bytes([0x11; 20]);
        let data = Erc20Abi::new()
            .packed_transfer_from(&from, &recipient(), &BigInt::from(5u64))
            .unwrap();
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(hex::encode(&data[..4]), "23b872dd");
        assert_eq!(&data[16..36], &[0x11; 20]);
        assert_eq!(&data[48..68], recipient().as_bytes());
        assert_eq!(data[99], 5);
    }

    #[test]
    fn packed_balance_of_layout() {
        let data = Erc20Abi::new().packed_balance_of(&recipient());
        assert_eq!(data.len(), 36);
        assert_eq!(hex::encode(&data[..4]), "70a08231");
    }

    #[test]
    fn decode_balance() {
        let mut ret = [0u8; 32];
        ret[24..].copy_from_slice(&0x1d24b2dfac520000u64.to_be_bytes());
        let balance = Erc20Abi::new().decode_uint256(&ret).unwrap();
        assert_eq!(balance, BigInt::from(2 * E18 + E18 / 10));
    }
}
