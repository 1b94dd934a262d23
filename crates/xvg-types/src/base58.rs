//! Bitcoin-style Base58 and Base58Check encoding.
//!
//! Thin wrappers over `bs58` that map its errors into [`Base58Error`].
//! Base58Check appends the first 4 bytes of a double SHA-256 as checksum.

use thiserror::Error;

/// Checksum length in bytes.
pub const CHECKSUM_SIZE: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Base58Error {
    #[error("invalid character '{0}' at position {1}")]
    InvalidCharacter(char, usize),

    #[error("payload too short ({0} bytes, need more than 4)")]
    TooShort(usize),

    #[error("checksum mismatch")]
    ChecksumMismatch,
}

fn map_error(encoded: &str, err: bs58::decode::Error) -> Base58Error {
    match err {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            Base58Error::InvalidCharacter(character, index)
        }
        bs58::decode::Error::NonAsciiCharacter { index } => {
            let character = encoded
                .get(index..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            Base58Error::InvalidCharacter(character, index)
        }
        bs58::decode::Error::InvalidChecksum { .. } => Base58Error::ChecksumMismatch,
        // NoChecksum; callers check the length first.
        _ => Base58Error::TooShort(0),
    }
}

/// Encode binary data to Base58.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decode a Base58 string to binary data.
pub fn decode(encoded: &str) -> Result<Vec<u8>, Base58Error> {
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| map_error(encoded, e))
}

/// Encode a payload with a 4-byte double SHA-256 checksum.
pub fn encode_check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode a Base58Check string, verifying and stripping the checksum.
pub fn decode_check(encoded: &str) -> Result<Vec<u8>, Base58Error> {
    let decoded = decode(encoded)?;
    if decoded.len() <= CHECKSUM_SIZE {
        return Err(Base58Error::TooShort(decoded.len()));
    }
    bs58::decode(encoded)
        .with_check(None)
        .into_vec()
        .map_err(|e| map_error(encoded, e))
}
