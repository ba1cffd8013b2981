use chain_eth::EthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("Signing failed: {0}")]
    SigningFailure(String),

    #[error("Encoding failed: {0}")]
    EncodingFailure(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<EthError> for WalletError {
    fn from(e: EthError) -> Self {
        match e {
            EthError::InvalidValue(msg) => WalletError::InvalidValue(msg),
            EthError::InvalidAddress(msg) => WalletError::InvalidValue(format!("address: {msg}")),
            EthError::InvalidArgument(msg) => WalletError::InvalidArgument(msg),
            EthError::InvalidPrivateKey(msg) => WalletError::KeyUnavailable(msg),
            EthError::SigningError(msg) => WalletError::SigningFailure(msg),
            EthError::EncodingError(msg) => WalletError::EncodingFailure(msg),
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Config(e.to_string())
    }
}
