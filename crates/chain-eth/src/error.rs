use thiserror::Error;

/// Ethereum transaction core errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EthError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

impl From<alloy_rlp::Error> for EthError {
    fn from(e: alloy_rlp::Error) -> Self {
        EthError::EncodingError(format!("rlp: {e}"))
    }
}
