//! secp256k1 ECDSA over 32-byte digests, DER encoded.
//!
//! The wallet service verifies DER signatures without a trailing sighash
//! byte, both for request signatures and for transaction input signatures.

use crate::CryptoError;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};

/// Sign a 32-byte digest, returning a low-S DER signature.
pub fn ecdsa_sign(hash: &[u8; 32], secret: &SecretKey) -> Vec<u8> {
    let msg = Message::from_digest(*hash);
    SECP256K1.sign_ecdsa(&msg, secret).serialize_der().to_vec()
}

/// Verify a DER signature over a 32-byte digest.
pub fn ecdsa_verify(signature_der: &[u8], hash: &[u8; 32], public_key: &PublicKey) -> bool {
    let Ok(sig) = Signature::from_der(signature_der) else {
        return false;
    };
    let msg = Message::from_digest(*hash);
    SECP256K1.verify_ecdsa(&msg, &sig, public_key).is_ok()
}

/// Compressed SEC1 public key (33 bytes) for a private key.
pub fn public_key_bytes(secret: &SecretKey) -> [u8; 33] {
    PublicKey::from_secret_key(SECP256K1, secret).serialize()
}

/// Parse a compressed or uncompressed SEC1 public key.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
    PublicKey::from_slice(bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256d;

    fn key(byte: u8) -> SecretKey {
        SecretKey::from_slice(&[byte; 32]).unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let secret = key(0x11);
        let public = PublicKey::from_secret_key(SECP256K1, &secret);
        let hash = sha256d(b"get|/v1/balance/?r=12345|{}");

        let sig = ecdsa_sign(&hash, &secret);
        assert!(ecdsa_verify(&sig, &hash, &public));
        assert_eq!(sig[0], 0x30, "DER sequence tag");
    }

    #[test]
    fn test_verify_rejects_other_key_and_message() {
        let hash = sha256d(b"message");
        let sig = ecdsa_sign(&hash, &key(0x22));

        let other = PublicKey::from_secret_key(SECP256K1, &key(0x23));
        assert!(!ecdsa_verify(&sig, &hash, &other));

        let own = PublicKey::from_secret_key(SECP256K1, &key(0x22));
        assert!(!ecdsa_verify(&sig, &sha256d(b"other"), &own));
        assert!(!ecdsa_verify(&[0x30, 0x00], &hash, &own));
    }

    #[test]
    fn test_deterministic_rfc6979() {
        let hash = sha256d(b"same input");
        assert_eq!(ecdsa_sign(&hash, &key(5)), ecdsa_sign(&hash, &key(5)));
    }

    #[test]
    fn test_bad_public_key() {
        assert!(matches!(
            parse_public_key(&[0x05; 33]),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_public_key_roundtrip() {
        let bytes = public_key_bytes(&key(9));
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
        let parsed = parse_public_key(&bytes).unwrap();
        assert_eq!(parsed.serialize(), bytes);
    }
}
