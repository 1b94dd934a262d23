//! Encrypting keys and payload encryption.
//!
//! Two 16-byte keys, carried base64 encoded:
//!
//! - shared: `sha256(wallet private key)[..16]`. Every copayer holding the
//!   wallet key can read wallet names, copayer names and proposal notes.
//! - personal: `hmac_sha256("personalKey", sha256(request private key))[..16]`.
//!   Only this copayer can read its own custom data.
//!
//! Payloads are SJCL envelopes (see `xvg_crypto::sjcl`).

use crate::error::WalletError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use xvg_crypto::sjcl::{self, SjclParams};
use xvg_crypto::{hmac_sha256, sha256, CryptoError, ExtendedPrivKey};

const PERSONAL_KEY_HMAC_KEY: &[u8] = b"personalKey";

pub fn shared_encrypting_key(wallet_key: &ExtendedPrivKey) -> String {
    let hash = sha256(&wallet_key.secret_bytes());
    STANDARD.encode(&hash[..16])
}

pub fn personal_encrypting_key(request_key: &ExtendedPrivKey) -> String {
    let hash = sha256(&request_key.secret_bytes());
    let mac = hmac_sha256(PERSONAL_KEY_HMAC_KEY, &hash);
    STANDARD.encode(&mac[..16])
}

fn key_bytes(encrypting_key: &str) -> Result<Vec<u8>, WalletError> {
    let key = STANDARD
        .decode(encrypting_key)
        .map_err(|e| CryptoError::InvalidKey(format!("encrypting key: {}", e)))?;
    Ok(key)
}

/// Encrypt with `ks` 128 and `iter` 1.
pub fn encrypt_message(plaintext: &str, encrypting_key: &str) -> Result<String, WalletError> {
    let key = key_bytes(encrypting_key)?;
    Ok(sjcl::encrypt(&key, plaintext, &SjclParams::default())?)
}

pub fn decrypt_message(ciphertext: &str, encrypting_key: &str) -> Result<String, WalletError> {
    let key = key_bytes(encrypting_key)?;
    Ok(sjcl::decrypt(&key, ciphertext)?)
}

/// Decrypt `text` when it is an envelope; return it unchanged otherwise.
pub fn decrypt_if_envelope(text: &str, encrypting_key: &str) -> Result<String, WalletError> {
    if sjcl::is_envelope(text) {
        decrypt_message(text, encrypting_key)
    } else {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> ExtendedPrivKey {
        ExtendedPrivKey::new_master(&[byte; 32]).unwrap()
    }

    #[test]
    fn test_key_derivation() {
        let wallet = key(1);
        let shared = shared_encrypting_key(&wallet);
        assert_eq!(STANDARD.decode(&shared).unwrap(), sha256(&wallet.secret_bytes())[..16]);

        let request = key(2);
        let personal = personal_encrypting_key(&request);
        assert_eq!(
            STANDARD.decode(&personal).unwrap(),
            hmac_sha256(b"personalKey", &sha256(&request.secret_bytes()))[..16]
        );
        assert_ne!(shared, shared_encrypting_key(&request));
    }

    #[test]
    fn test_encrypting_key_vectors() {
        assert_eq!(shared_encrypting_key(&key(1)), "eSUARYKNW9RN6B+nKkQPog==");
        assert_eq!(shared_encrypting_key(&key(2)), "k3GlI7FLMAs0wPkKtd8r7Q==");
        assert_eq!(personal_encrypting_key(&key(1)), "GzrO7ywP0eF9INtkLu//GA==");
        assert_eq!(personal_encrypting_key(&key(2)), "vt0fAaZs6VMUhd32YjastA==");
    }

    #[test]
    fn test_round_trip_printable_ascii() {
        let k = shared_encrypting_key(&key(3));
        let printable: String = (0x20u8..0x7f).map(char::from).collect();
        for text in ["Personal Wallet", "ios-copayer", printable.as_str()] {
            let enc = encrypt_message(text, &k).unwrap();
            assert_ne!(enc, text);
            assert_eq!(decrypt_message(&enc, &k).unwrap(), text);
        }
    }

    #[test]
    fn test_wrong_key() {
        let enc = encrypt_message("note", &shared_encrypting_key(&key(4))).unwrap();
        let err = decrypt_message(&enc, &shared_encrypting_key(&key(5))).unwrap_err();
        assert!(matches!(err, WalletError::Crypto(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_if_envelope() {
        let k = shared_encrypting_key(&key(6));
        assert_eq!(decrypt_if_envelope("plain note", &k).unwrap(), "plain note");
        let enc = encrypt_message("secret note", &k).unwrap();
        assert_eq!(decrypt_if_envelope(&enc, &k).unwrap(), "secret note");
    }

    #[test]
    fn test_bad_key_encoding() {
        assert!(matches!(
            encrypt_message("x", "***"),
            Err(WalletError::Crypto(CryptoError::InvalidKey(_)))
        ));
    }
}
