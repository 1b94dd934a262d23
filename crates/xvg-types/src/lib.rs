//! Core types and constants for Verge (XVG) wallets.
//!
//! This crate provides the foundational types used across the xvg crates:
//! network parameters, Bitcoin-style Base58 / Base58Check encoding, legacy
//! address parsing and amount unit conversion.

pub mod address;
pub mod base58;
pub mod constants;
pub mod units;

pub use address::{Address, AddressError, AddressKind};
pub use constants::{Network, NetworkParams};
pub use units::{format_amount, parse_amount, AmountError};
