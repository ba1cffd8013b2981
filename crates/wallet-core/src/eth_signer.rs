use chain_eth::{Address, EthError, Transaction};
use k256::ecdsa::SigningKey;

use crate::error::WalletError;
use crate::hd_derivation::PrivateKey;
use crate::signer::ChainSigner;
use crate::types::{Curve, ETH};

/// Ethereum strategy: the payload is an unsigned legacy transaction in RLP
/// form, the output is the signed raw transaction as `0x`-hex.
#[derive(Debug, Clone, Default)]
pub struct EthSigner {
    chain_id: Option<u64>,
}

impl EthSigner {
    /// `chain_id = None` signs with legacy `v = 27 | 28`; `Some(id)` applies
    /// EIP-155 replay protection.
    pub fn new(chain_id: Option<u64>) -> Self {
        Self { chain_id }
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }
}

impl ChainSigner for EthSigner {
    fn symbol(&self) -> &str {
        ETH
    }

    fn curve(&self) -> Curve {
        Curve::Secp256k1
    }

    fn derivation_path(&self, account: u32, index: u32) -> String {
        format!("m/44'/60'/{account}'/0/{index}")
    }

    fn address(&self, key: &PrivateKey) -> Result<String, WalletError> {
        let signing_key = SigningKey::from_bytes(key.as_bytes().into())
            .map_err(|e| WalletError::KeyUnavailable(e.to_string()))?;

        let mut uncompressed = [0u8; 65];
        uncompressed.copy_from_slice(
            signing_key.verifying_key().to_encoded_point(false).as_bytes(),
        );
        Ok(Address::from_uncompressed_public_key(&uncompressed)?.to_hex())
    }

    fn sign(&self, key: &PrivateKey, payload: &[u8]) -> Result<String, WalletError> {
        let tx = Transaction::decode_unsigned(payload).map_err(|e| match e {
            EthError::EncodingError(msg) => {
                WalletError::InvalidValue(format!("unsigned ETH transaction: {msg}"))
            }
            other => other.into(),
        })?;
        let signed = tx.sign(key.as_bytes(), self.chain_id)?;

        tracing::debug!(
            chain_id = ?self.chain_id,
            nonce = tx.nonce(),
            payload_len = payload.len(),
            tx_hash = %signed.tx_hash,
            "signed ETH transaction"
        );

        Ok(signed.raw_tx_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_eth::BigInt;

    const KEY_ONE: [u8; 32] = {
        let mut k = [0u8; 32];
        k[31] = 1;
        k
    };

    fn sample_tx() -> Transaction {
        Transaction::new(
            9,
            Address::from_hex("0x3535353535353535353535353535353535353535").unwrap(),
            BigInt::parse("1000000000000000000").unwrap(),
            21_000,
            BigInt::parse("20000000000").unwrap(),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn derivation_path_follows_bip44() {
        assert_eq!(EthSigner::default().derivation_path(0, 0), "m/44'/60'/0'/0/0");
        assert_eq!(EthSigner::default().derivation_path(3, 5), "m/44'/60'/3'/0/5");
    }

    #[test]
    fn address_of_key_one() {
        let key = PrivateKey::from_bytes(KEY_ONE);
        assert_eq!(
            EthSigner::default().address(&key).unwrap(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn sign_matches_transaction_sign() {
        let key = PrivateKey::from_bytes(KEY_ONE);
        let tx = sample_tx();
        let payload = tx.encode_unsigned().unwrap();

        for chain_id in [None, Some(1)] {
            let raw = EthSigner::new(chain_id).sign(&key, &payload).unwrap();
            let expected = tx.sign(&KEY_ONE, chain_id).unwrap().raw_tx_hex();
            assert_eq!(raw, expected);
        }
    }

    #[test]
    fn legacy_signature_recovers_sender() {
        let key = PrivateKey::from_bytes(KEY_ONE);
        let payload = sample_tx().encode_unsigned().unwrap();
        let raw = EthSigner::new(None).sign(&key, &payload).unwrap();

        let bytes = hex::decode(raw.trim_start_matches("0x")).unwrap();
        let (decoded, sig) = Transaction::decode_signed(&bytes).unwrap();
        assert!(sig.v == 27 || sig.v == 28);
        assert_eq!(
            decoded.recover_signer(&sig).unwrap().to_hex(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn malformed_payload_is_invalid_value() {
        let key = PrivateKey::from_bytes(KEY_ONE);
        let signer = EthSigner::default();
        for payload in [&[0xde, 0xad][..], &[0xc0][..], &[0x83, b'd', b'o', b'g'][..]] {
            assert!(matches!(
                signer.sign(&key, payload),
                Err(WalletError::InvalidValue(_))
            ));
        }
    }

    #[test]
    fn deeply_nested_payload_is_rejected() {
        let mut headers = Vec::new();
        let mut len = 1;
        for _ in 0..200_000 {
            let mut header = Vec::new();
            alloy_rlp::Header { list: true, payload_length: len }.encode(&mut header);
            len += header.len();
            headers.push(header);
        }
        let mut payload: Vec<u8> = headers.into_iter().rev().flatten().collect();
        payload.push(0xc0);

        let key = PrivateKey::from_bytes(KEY_ONE);
        assert!(matches!(
            EthSigner::default().sign(&key, &payload),
            Err(WalletError::InvalidValue(_))
        ));
    }

    #[test]
    fn accepts_unsigned_form_with_empty_signature_fields() {
        let key = PrivateKey::from_bytes(KEY_ONE);
        let tx = sample_tx();
        let blank = chain_eth::Signature {
            v: 0,
            r: BigInt::zero(),
            s: BigInt::zero(),
        };
        let nine_fields = tx.encode_signed(&blank).unwrap();
        let six_fields = tx.encode_unsigned().unwrap();

        let signer = EthSigner::new(Some(1));
        assert_eq!(
            signer.sign(&key, &nine_fields).unwrap(),
            signer.sign(&key, &six_fields).unwrap()
        );
    }

    #[test]
    fn zero_key_is_unavailable() {
        let key = PrivateKey::from_bytes([0u8; 32]);
        let payload = sample_tx().encode_unsigned().unwrap();
        assert!(matches!(
            EthSigner::default().sign(&key, &payload),
            Err(WalletError::KeyUnavailable(_))
        ));
        assert!(matches!(
            EthSigner::default().address(&key),
            Err(WalletError::KeyUnavailable(_))
        ));
    }
}
