//! Verge transaction construction and signing.
//!
//! Turns a wallet-service transaction proposal plus the outputs it spends
//! into an unsigned transaction (Verge serialization carries a timestamp
//! after the version), and produces legacy SIGHASH_ALL input signatures
//! with whichever derived keys own the spent outputs.

pub mod builder;
pub mod script;
pub mod sign;
pub mod types;

pub use builder::{build_unsigned, Destination, ProposalSpec, UnsignedTransaction, Utxo};
pub use sign::{signature_hash, sign_transaction, InputSignature};
pub use types::{OutPoint, Transaction, TxIn, TxOut};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("cannot derive a locking script for address {0}")]
    UnsupportedAddress(String),

    #[error("insufficient funds: need {need}, have {have}")]
    InsufficientFunds { need: u64, have: u64 },

    #[error("malformed proposal: {0}")]
    Malformed(String),

    #[error("signing error: {0}")]
    Signing(String),
}
