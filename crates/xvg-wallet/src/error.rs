//! Wallet error types.

use crate::state::WalletState;
use thiserror::Error;
use xvg_crypto::{CryptoError, DerivationError};
use xvg_rpc::RpcError;
use xvg_tx::TxError;

/// Coarse error category, for callers that react by class rather than
/// by variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Seed missing or invalid, bad derivation path.
    Derivation,
    /// Encryption, decryption, signing or encoding failure.
    Crypto,
    /// The service answered with something the client cannot use.
    Protocol,
    /// The service handed out data the client could not verify.
    Trust,
    /// Inputs do not cover amount plus fee.
    Funds,
    /// Network failure or non-service HTTP error.
    Transport,
    /// Typed error body from the service.
    Service,
    /// Operation not allowed in the current wallet state.
    State,
    /// Local wallet record could not be read or written.
    Storage,
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("key derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("transaction error: {0}")]
    Tx(#[from] TxError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("untrusted address received for path {path}: service sent {received}, derived {expected}")]
    UntrustedAddressReceived {
        path: String,
        received: String,
        expected: String,
    },

    #[error("{operation} is not allowed while the wallet is {state}")]
    InvalidState {
        operation: &'static str,
        state: WalletState,
    },

    #[error("invalid wallet secret: {0}")]
    InvalidSecret(String),

    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Derivation(_) => ErrorKind::Derivation,
            WalletError::Crypto(_) | WalletError::InvalidSecret(_) => ErrorKind::Crypto,
            WalletError::Tx(e) => match e {
                TxError::InsufficientFunds { .. } => ErrorKind::Funds,
                TxError::Signing(_) => ErrorKind::Crypto,
                TxError::UnsupportedAddress(_) | TxError::Malformed(_) => ErrorKind::Protocol,
            },
            WalletError::Rpc(e) => match e {
                RpcError::Service { .. } => ErrorKind::Service,
                RpcError::Protocol { .. } | RpcError::Json(_) => ErrorKind::Protocol,
                RpcError::Http { .. } | RpcError::HttpStatus { .. } | RpcError::Connection(_) => {
                    ErrorKind::Transport
                }
            },
            WalletError::UntrustedAddressReceived { .. } => ErrorKind::Trust,
            WalletError::InvalidState { .. } => ErrorKind::State,
            WalletError::InvalidAddress { .. } => ErrorKind::Protocol,
            WalletError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The service error code, when the service rejected the call.
    pub fn service_code(&self) -> Option<&str> {
        match self {
            WalletError::Rpc(e) => e.service_code(),
            _ => None,
        }
    }
}
