//! Standard locking scripts.

use crate::TxError;
use xvg_types::{Address, AddressKind, Network};

pub const OP_DUP: u8 = 0x76;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_CHECKSIG: u8 = 0xac;
const PUSH_20: u8 = 0x14;

/// `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG`
pub fn p2pkh_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut s = Vec::with_capacity(25);
    s.extend_from_slice(&[OP_DUP, OP_HASH160, PUSH_20]);
    s.extend_from_slice(pubkey_hash);
    s.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    s
}

/// `OP_HASH160 <20> OP_EQUAL`
pub fn p2sh_script(script_hash: &[u8; 20]) -> Vec<u8> {
    let mut s = Vec::with_capacity(23);
    s.extend_from_slice(&[OP_HASH160, PUSH_20]);
    s.extend_from_slice(script_hash);
    s.push(OP_EQUAL);
    s
}

pub fn script_for_address(address: &Address) -> Vec<u8> {
    match address.kind {
        AddressKind::PubkeyHash => p2pkh_script(&address.hash),
        AddressKind::ScriptHash => p2sh_script(&address.hash),
    }
}

/// Parse `address` for `network` and return its locking script.
pub fn locking_script(address: &str, network: Network) -> Result<Vec<u8>, TxError> {
    let parsed = Address::parse(address, network)
        .map_err(|e| TxError::UnsupportedAddress(format!("{} ({})", address, e)))?;
    Ok(script_for_address(&parsed))
}

/// The public-key hash of a P2PKH locking script, if it is one.
pub fn p2pkh_pubkey_hash(script: &[u8]) -> Option<[u8; 20]> {
    if script.len() == 25
        && script[0] == OP_DUP
        && script[1] == OP_HASH160
        && script[2] == PUSH_20
        && script[23] == OP_EQUALVERIFY
        && script[24] == OP_CHECKSIG
    {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&script[3..23]);
        Some(hash)
    } else {
        None
    }
}
