use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::address::Address;
use crate::bigint::BigInt;
use crate::error::EthError;
use crate::rlp::RlpItem;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// An unsigned legacy Ethereum transaction.
///
/// All fields are fixed at construction. The unsigned form is the 6-field RLP
/// list `[nonce, gas_price, gas_limit, to, value, data]`; the signed form
/// appends `[v, r, s]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    nonce: u64,
    to: Address,
    value: BigInt,
    gas_limit: u64,
    gas_price: BigInt,
    data: Vec<u8>,
}

/// A recoverable secp256k1 signature in Ethereum's `(v, r, s)` form.
///
/// `v` is `27 + y_parity` for legacy signatures and
/// `chain_id * 2 + 35 + y_parity` for EIP-155 ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub v: u64,
    pub r: BigInt,
    pub s: BigInt,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// RLP-encoded 9-field list.
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx` as a 0x-prefixed hex string.
    pub tx_hash: String,
    pub signature: Signature,
}

impl SignedTransaction {
    /// The raw transaction as `0x`-prefixed hex.
    pub fn raw_tx_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }
}

impl Transaction {
    /// Builds a transaction. `value` and `gas_price` must be non-negative
    /// (`InvalidValue`) and fit in 256 bits (`InvalidArgument`).
    pub fn new(
        nonce: u64,
        to: Address,
        value: BigInt,
        gas_limit: u64,
        gas_price: BigInt,
        data: Vec<u8>,
    ) -> Result<Self, EthError> {
        let value = value.ensure_non_negative("value")?;
        let gas_price = gas_price.ensure_non_negative("gas price")?;
        value.to_u256()?;
        gas_price.to_u256()?;

        Ok(Self {
            nonce,
            to,
            value,
            gas_limit,
            gas_price,
            data,
        })
    }

    /// A plain value transfer with the fixed 21000 gas limit and no calldata.
    pub fn transfer(
        nonce: u64,
        to: Address,
        value: BigInt,
        gas_price: BigInt,
    ) -> Result<Self, EthError> {
        Self::new(nonce, to, value, TRANSFER_GAS_LIMIT, gas_price, Vec::new())
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn to(&self) -> &Address {
        &self.to
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn gas_price(&self) -> &BigInt {
        &self.gas_price
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn fields(&self) -> Result<Vec<RlpItem>, EthError> {
        Ok(vec![
            RlpItem::u64(self.nonce),
            RlpItem::uint(&self.gas_price)?,
            RlpItem::u64(self.gas_limit),
            RlpItem::bytes(self.to.as_bytes().to_vec()),
            RlpItem::uint(&self.value)?,
            RlpItem::bytes(self.data.clone()),
        ])
    }

    /// RLP of the 6-field unsigned list. This is the payload handed to a
    /// signer.
    pub fn encode_unsigned(&self) -> Result<Vec<u8>, EthError> {
        Ok(RlpItem::List(self.fields()?).to_bytes())
    }

    /// [`encode_unsigned`](Self::encode_unsigned) as `0x`-prefixed hex.
    pub fn encode_rlp_hex(&self) -> Result<String, EthError> {
        Ok(format!("0x{}", hex::encode(self.encode_unsigned()?)))
    }

    /// RLP of the 9-field signed list.
    pub fn encode_signed(&self, signature: &Signature) -> Result<Vec<u8>, EthError> {
        let mut fields = self.fields()?;
        fields.push(RlpItem::u64(signature.v));
        fields.push(RlpItem::uint(&signature.r)?);
        fields.push(RlpItem::uint(&signature.s)?);
        Ok(RlpItem::List(fields).to_bytes())
    }

    /// The digest that gets signed.
    ///
    /// Without a chain id this is the Keccak-256 of the unsigned encoding.
    /// With one it follows EIP-155 and hashes
    /// `[nonce, gas_price, gas_limit, to, value, data, chain_id, 0, 0]`.
    pub fn signing_hash(&self, chain_id: Option<u64>) -> Result<[u8; 32], EthError> {
        let mut fields = self.fields()?;
        if let Some(id) = chain_id {
            fields.push(RlpItem::u64(id));
            fields.push(RlpItem::bytes(Vec::new()));
            fields.push(RlpItem::bytes(Vec::new()));
        }
        let encoded = RlpItem::List(fields).to_bytes();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&Keccak256::digest(&encoded));
        Ok(hash)
    }

    /// Signs the transaction with a secp256k1 private key.
    ///
    /// `chain_id = None` produces a legacy (Homestead) signature with
    /// `v ∈ {27, 28}`; `Some(id)` produces an EIP-155 signature.
    pub fn sign(
        &self,
        private_key: &[u8; 32],
        chain_id: Option<u64>,
    ) -> Result<SignedTransaction, EthError> {
        let msg_hash = self.signing_hash(chain_id)?;

        let mut key_bytes = *private_key;
        let signing_key = SigningKey::from_bytes((&key_bytes).into())
            .map_err(|e| EthError::InvalidPrivateKey(e.to_string()));
        key_bytes.zeroize();
        let signing_key = signing_key?;

        let (signature, recovery_id): (EcdsaSignature, RecoveryId) = signing_key
            .sign_prehash(&msg_hash)
            .map_err(|e| EthError::SigningError(e.to_string()))?;

        let signature = Signature::from_parts(&signature, recovery_id, chain_id)?;
        let raw_tx = self.encode_signed(&signature)?;
        let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

        Ok(SignedTransaction {
            raw_tx,
            tx_hash,
            signature,
        })
    }

    /// Recovers the sender address from a signature over this transaction.
    pub fn recover_signer(&self, signature: &Signature) -> Result<Address, EthError> {
        let (y_parity, chain_id) = signature.recovery()?;
        let msg_hash = self.signing_hash(chain_id)?;

        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&signature.r.to_be_bytes_32()?);
        rs[32..].copy_from_slice(&signature.s.to_be_bytes_32()?);

        let sig = EcdsaSignature::from_slice(&rs)
            .map_err(|e| EthError::SigningError(format!("invalid signature: {e}")))?;
        let recid = RecoveryId::from_byte(y_parity)
            .ok_or_else(|| EthError::SigningError("invalid recovery id".into()))?;

        let key = VerifyingKey::recover_from_prehash(&msg_hash, &sig, recid)
            .map_err(|e| EthError::SigningError(format!("recovery failed: {e}")))?;

        let mut uncompressed = [0u8; 65];
        uncompressed.copy_from_slice(key.to_encoded_point(false).as_bytes());
        Address::from_uncompressed_public_key(&uncompressed)
    }

    /// Parses the 6-field unsigned encoding produced by
    /// [`encode_unsigned`](Self::encode_unsigned).
    ///
    /// The 9-field form with empty `v`, `r` and `s` (what go-ethereum emits
    /// for a transaction that has not been signed yet) is accepted too.
    pub fn decode_unsigned(bytes: &[u8]) -> Result<Self, EthError> {
        let item = RlpItem::decode(bytes)?;
        let fields = item.as_list()?;
        match fields.len() {
            6 => {}
            9 if fields[6..].iter().all(|f| f.as_bytes().is_ok_and(<[u8]>::is_empty)) => {}
            9 => {
                return Err(EthError::EncodingError(
                    "transaction is already signed".into(),
                ))
            }
            n => {
                return Err(EthError::EncodingError(format!(
                    "unsigned transaction has {n} fields, expected 6"
                )))
            }
        }
        Self::from_fields(&fields[..6])
    }

    /// Parses the 9-field signed encoding produced by
    /// [`encode_signed`](Self::encode_signed).
    pub fn decode_signed(bytes: &[u8]) -> Result<(Self, Signature), EthError> {
        let item = RlpItem::decode(bytes)?;
        let fields = item.as_list()?;
        if fields.len() != 9 {
            return Err(EthError::EncodingError(format!(
                "signed transaction has {} fields, expected 9",
                fields.len()
            )));
        }

        let tx = Self::from_fields(&fields[..6])?;
        let signature = Signature {
            v: fields[6].as_u64()?,
            r: fields[7].as_uint()?,
            s: fields[8].as_uint()?,
        };
        Ok((tx, signature))
    }

    fn from_fields(fields: &[RlpItem]) -> Result<Self, EthError> {
        let to_bytes = fields[3].as_bytes()?;
        if to_bytes.is_empty() {
            return Err(EthError::InvalidAddress(
                "contract creation transactions are not supported".into(),
            ));
        }

        Self::new(
            fields[0].as_u64()?,
            Address::from_slice(to_bytes)?,
            fields[4].as_uint()?,
            fields[2].as_u64()?,
            fields[1].as_uint()?,
            fields[5].as_bytes()?.to_vec(),
        )
    }
}

impl Signature {
    fn from_parts(
        signature: &EcdsaSignature,
        recovery_id: RecoveryId,
        chain_id: Option<u64>,
    ) -> Result<Self, EthError> {
        let y_parity = u64::from(recovery_id.is_y_odd());
        let v = match chain_id {
            None => 27 + y_parity,
            Some(id) => id
                .checked_mul(2)
                .and_then(|v| v.checked_add(35 + y_parity))
                .ok_or_else(|| EthError::SigningError(format!("chain id {id} is too large")))?,
        };

        Ok(Self {
            v,
            r: BigInt::from_be_bytes(&signature.r().to_bytes()),
            s: BigInt::from_be_bytes(&signature.s().to_bytes()),
        })
    }

    /// Splits `v` into the y-parity bit and the EIP-155 chain id, if any.
    pub fn recovery(&self) -> Result<(u8, Option<u64>), EthError> {
        match self.v {
            27 | 28 => Ok(((self.v - 27) as u8, None)),
            v if v >= 35 => Ok((((v - 35) % 2) as u8, Some((v - 35) / 2))),
            v => Err(EthError::SigningError(format!("unsupported v value {v}"))),
        }
    }
}
