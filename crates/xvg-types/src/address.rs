//! Legacy (Base58Check) address parsing and creation.
//!
//! Supports pay-to-pubkey-hash and pay-to-script-hash addresses; the version
//! byte selects both the kind and the network.

use crate::base58::{self, Base58Error};
use crate::constants::{Network, NetworkParams};
use thiserror::Error;

/// Length of a HASH160 payload.
pub const HASH_SIZE: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must be a non-empty string")]
    Empty,

    #[error("base58 decode error: {0}")]
    Base58(#[from] Base58Error),

    #[error("invalid payload length: expected 21 bytes, got {0}")]
    InvalidLength(usize),

    #[error("unknown version byte 0x{0:02x} for {1}")]
    UnknownVersion(u8, Network),
}

/// Address kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    PubkeyHash,
    ScriptHash,
}

/// A decoded legacy address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub network: Network,
    pub kind: AddressKind,
    pub hash: [u8; HASH_SIZE],
}

impl Address {
    /// P2PKH address for a HASH160 of a public key.
    pub fn p2pkh(hash: [u8; HASH_SIZE], network: Network) -> Self {
        Self {
            network,
            kind: AddressKind::PubkeyHash,
            hash,
        }
    }

    /// P2SH address for a HASH160 of a redeem script.
    pub fn p2sh(hash: [u8; HASH_SIZE], network: Network) -> Self {
        Self {
            network,
            kind: AddressKind::ScriptHash,
            hash,
        }
    }

    /// Parse a Base58Check address for the given network.
    pub fn parse(address: &str, network: Network) -> Result<Self, AddressError> {
        if address.is_empty() {
            return Err(AddressError::Empty);
        }

        let payload = base58::decode_check(address)?;
        if payload.len() != HASH_SIZE + 1 {
            return Err(AddressError::InvalidLength(payload.len()));
        }

        let params = network.params();
        let kind = match payload[0] {
            v if v == params.pubkey_hash => AddressKind::PubkeyHash,
            v if v == params.script_hash => AddressKind::ScriptHash,
            v => return Err(AddressError::UnknownVersion(v, network)),
        };

        let mut hash = [0u8; HASH_SIZE];
        hash.copy_from_slice(&payload[1..]);
        Ok(Self {
            network,
            kind,
            hash,
        })
    }

    /// Whether a string is a valid address for the network.
    pub fn is_valid(address: &str, network: Network) -> bool {
        Self::parse(address, network).is_ok()
    }

    fn version(&self, params: &NetworkParams) -> u8 {
        match self.kind {
            AddressKind::PubkeyHash => params.pubkey_hash,
            AddressKind::ScriptHash => params.script_hash,
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut payload = Vec::with_capacity(HASH_SIZE + 1);
        payload.push(self.version(self.network.params()));
        payload.extend_from_slice(&self.hash);
        f.write_str(&base58::encode_check(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mainnet_p2pkh() {
        let addr = Address::parse("DHe3mTNQztY1wWokdtMprdeCKNoMxyThoV", Network::Mainnet)
            .expect("valid mainnet address");
        assert_eq!(addr.kind, AddressKind::PubkeyHash);
        assert_eq!(addr.to_string(), "DHe3mTNQztY1wWokdtMprdeCKNoMxyThoV");
    }

    #[test]
    fn test_p2pkh_prefix() {
        let addr = Address::p2pkh([0x42; HASH_SIZE], Network::Mainnet);
        assert!(addr.to_string().starts_with('D'));
        let parsed = Address::parse(&addr.to_string(), Network::Mainnet).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_p2sh_roundtrip() {
        let addr = Address::p2sh([7u8; HASH_SIZE], Network::Mainnet);
        let parsed = Address::parse(&addr.to_string(), Network::Mainnet).unwrap();
        assert_eq!(parsed.kind, AddressKind::ScriptHash);
        assert_eq!(parsed.hash, [7u8; HASH_SIZE]);
    }

    #[test]
    fn test_wrong_network() {
        let addr = Address::p2pkh([1u8; HASH_SIZE], Network::Testnet).to_string();
        assert_eq!(
            Address::parse(&addr, Network::Mainnet),
            Err(AddressError::UnknownVersion(0x73, Network::Mainnet))
        );
    }

    #[test]
    fn test_bitcoin_address_rejected() {
        assert!(!Address::is_valid("1NS17iag9jJgTHD1VXjvLCEnZuQ3rJDE9L", Network::Mainnet));
        assert_eq!(Address::parse("", Network::Mainnet), Err(AddressError::Empty));
    }
}
