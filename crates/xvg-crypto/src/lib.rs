//! Crypto primitives for xvg-rs.
//!
//! Hashing (SHA-256, double SHA-256, HMAC, HASH160), secp256k1 ECDSA,
//! BIP32 extended private keys, SJCL-compatible AES-128-CCM envelopes, and
//! the hex / Base58 codecs the wallet service speaks. Everything here is
//! pure and side-effect free apart from IV generation in `sjcl::encrypt`.

pub mod ecdsa;
pub mod hash;
pub mod hd;
pub mod sjcl;

pub use ecdsa::{ecdsa_sign, ecdsa_verify, public_key_bytes};
pub use hash::{hash160, hmac_sha256, sha256, sha256d};
pub use hd::{ChildNumber, DerivationError, DerivationPath, ExtendedPrivKey};
pub use sjcl::SjclParams;

pub use secp256k1::{PublicKey, SecretKey};

use thiserror::Error;
use xvg_types::base58::{self, Base58Error};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid hex input: {0}")]
    InvalidHexInput(String),

    #[error("invalid base58 input: {0}")]
    InvalidBase58(#[from] Base58Error),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("decryption failed (wrong key or corrupted ciphertext)")]
    DecryptionFailed,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("unsupported or malformed envelope: {0}")]
    UnsupportedEnvelope(String),
}

// ─── Codecs ─────────────────────────────────────────────────────────────────

pub fn hex_encode(data: impl AsRef<[u8]>) -> String {
    hex::encode(data)
}

pub fn hex_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(s).map_err(|e| CryptoError::InvalidHexInput(format!("{}: {}", s, e)))
}

pub fn base58_encode(data: &[u8]) -> String {
    base58::encode(data)
}

pub fn base58_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(base58::decode(s)?)
}

pub fn base58check_encode(payload: &[u8]) -> String {
    base58::encode_check(payload)
}

pub fn base58check_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(base58::decode_check(s)?)
}

// ─── WIF ────────────────────────────────────────────────────────────────────

/// Encode a private key in Wallet Import Format (compressed public key flag).
pub fn encode_wif(secret: &SecretKey, version: u8) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(version);
    payload.extend_from_slice(&secret.secret_bytes());
    payload.push(0x01);
    base58::encode_check(&payload)
}

/// Decode a WIF private key, returning the key and its version byte.
pub fn decode_wif(wif: &str) -> Result<(SecretKey, u8), CryptoError> {
    let payload = base58::decode_check(wif)?;
    let key_bytes = match payload.len() {
        34 if payload[33] == 0x01 => &payload[1..33],
        33 => &payload[1..33],
        n => return Err(CryptoError::InvalidKey(format!("WIF payload of {} bytes", n))),
    };
    let secret =
        SecretKey::from_slice(key_bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    Ok((secret, payload[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_decode_error() {
        assert!(matches!(hex_decode("zz"), Err(CryptoError::InvalidHexInput(_))));
        assert!(matches!(hex_decode("abc"), Err(CryptoError::InvalidHexInput(_))));
        assert_eq!(hex_decode("00ff").unwrap(), vec![0x00, 0xff]);
        assert_eq!(hex_encode([0xde, 0xad]), "dead");
    }

    #[test]
    fn test_base58_wrappers() {
        let data = b"verge";
        assert_eq!(base58_decode(&base58_encode(data)).unwrap(), data);
        assert!(matches!(base58check_decode("1111"), Err(CryptoError::InvalidBase58(_))));
    }

    #[test]
    fn test_wif_known_vector() {
        // Bitcoin wiki WIF example (uncompressed form has a different string).
        let secret = SecretKey::from_slice(
            &hex::decode("0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d")
                .unwrap(),
        )
        .unwrap();
        let wif = encode_wif(&secret, 0x80);
        assert_eq!(wif, "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617");

        let (decoded, version) = decode_wif(&wif).unwrap();
        assert_eq!(decoded, secret);
        assert_eq!(version, 0x80);
    }
}
