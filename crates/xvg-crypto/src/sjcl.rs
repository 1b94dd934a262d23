//! SJCL-compatible authenticated encryption.
//!
//! The wallet service and other copayer clients exchange wallet names,
//! copayer names, notes and private custom data as SJCL JSON envelopes:
//! AES-128 in CCM mode with a 64-bit tag, keyed directly by a 16-byte
//! secret (no PBKDF2 step, so `iter` is carried but unused).
//!
//! SJCL picks the CCM length field `L` from the message length and uses the
//! first `15 - L` bytes of the random 16-byte IV as the nonce.

use crate::CryptoError;
use aes::Aes128;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ccm::aead::generic_array::GenericArray;
use ccm::aead::{Aead, KeyInit, Payload};
use ccm::consts::{U11, U12, U13, U8};
use ccm::Ccm;
use rand::RngCore;
use serde::{Deserialize, Serialize};

type Ccm13 = Ccm<Aes128, U8, U13>;
type Ccm12 = Ccm<Aes128, U8, U12>;
type Ccm11 = Ccm<Aes128, U8, U11>;

pub const KEY_SIZE: usize = 16;
pub const IV_SIZE: usize = 16;
const TAG_BITS: u32 = 64;
const TAG_SIZE: usize = (TAG_BITS / 8) as usize;

/// Parameters recorded in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SjclParams {
    /// Key size in bits.
    pub ks: u32,
    /// PBKDF2 iterations. Not applied: the key is used as-is.
    pub iter: u32,
}

impl Default for SjclParams {
    fn default() -> Self {
        Self { ks: 128, iter: 1 }
    }
}

fn default_v() -> u32 {
    1
}
fn default_ks() -> u32 {
    128
}
fn default_ts() -> u32 {
    TAG_BITS
}
fn default_mode() -> String {
    "ccm".into()
}
fn default_cipher() -> String {
    "aes".into()
}

/// On-the-wire envelope. Field order matches what SJCL emits.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    iv: String,
    #[serde(default = "default_v")]
    v: u32,
    #[serde(default)]
    iter: u32,
    #[serde(default = "default_ks")]
    ks: u32,
    #[serde(default = "default_ts")]
    ts: u32,
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    adata: String,
    #[serde(default = "default_cipher")]
    cipher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    salt: Option<String>,
    ct: String,
}

/// CCM length-field size for a message of `len` bytes.
fn length_field_size(len: usize) -> usize {
    let mut l = 2;
    while l < 4 && (len as u64) >> (8 * l) != 0 {
        l += 1;
    }
    l
}

fn check_key(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "encryption key must be {} bytes, got {}",
            KEY_SIZE,
            key.len()
        )));
    }
    Ok(())
}

fn seal(key: &[u8], iv: &[u8], payload: Payload<'_, '_>) -> Result<Vec<u8>, ccm::aead::Error> {
    let key = GenericArray::from_slice(key);
    match length_field_size(payload.msg.len()) {
        2 => Ccm13::new(key).encrypt(GenericArray::from_slice(&iv[..13]), payload),
        3 => Ccm12::new(key).encrypt(GenericArray::from_slice(&iv[..12]), payload),
        _ => Ccm11::new(key).encrypt(GenericArray::from_slice(&iv[..11]), payload),
    }
}

fn open(key: &[u8], iv: &[u8], payload: Payload<'_, '_>) -> Result<Vec<u8>, ccm::aead::Error> {
    let key = GenericArray::from_slice(key);
    let plain_len = payload.msg.len().saturating_sub(TAG_SIZE);
    match length_field_size(plain_len) {
        2 => Ccm13::new(key).decrypt(GenericArray::from_slice(&iv[..13]), payload),
        3 => Ccm12::new(key).decrypt(GenericArray::from_slice(&iv[..12]), payload),
        _ => Ccm11::new(key).decrypt(GenericArray::from_slice(&iv[..11]), payload),
    }
}

/// Encrypt `plaintext` under a 16-byte key with a fresh random IV.
pub fn encrypt(key: &[u8], plaintext: &str, params: &SjclParams) -> Result<String, CryptoError> {
    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);
    encrypt_with_iv(key, plaintext, &iv, params)
}

/// Encrypt with a caller-chosen IV. Reusing an IV under the same key breaks
/// confidentiality; use [`encrypt`] outside of tests.
pub fn encrypt_with_iv(
    key: &[u8],
    plaintext: &str,
    iv: &[u8; IV_SIZE],
    params: &SjclParams,
) -> Result<String, CryptoError> {
    check_key(key)?;
    if params.ks as usize != KEY_SIZE * 8 {
        return Err(CryptoError::EncryptionFailed(format!(
            "unsupported key size {} bits",
            params.ks
        )));
    }

    let ct = seal(
        key,
        iv,
        Payload {
            msg: plaintext.as_bytes(),
            aad: &[],
        },
    )
    .map_err(|_| CryptoError::EncryptionFailed("AES-CCM seal failed".into()))?;

    let envelope = Envelope {
        iv: STANDARD.encode(iv),
        v: 1,
        iter: params.iter,
        ks: params.ks,
        ts: TAG_BITS,
        mode: default_mode(),
        adata: String::new(),
        cipher: default_cipher(),
        salt: None,
        ct: STANDARD.encode(ct),
    };
    serde_json::to_string(&envelope).map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Decrypt an SJCL envelope. Missing `ts`, `mode` and `cipher` fall back to
/// SJCL's defaults; `adata` is authenticated when present.
pub fn decrypt(key: &[u8], envelope: &str) -> Result<String, CryptoError> {
    check_key(key)?;

    let env: Envelope = serde_json::from_str(envelope)
        .map_err(|e| CryptoError::UnsupportedEnvelope(e.to_string()))?;

    if env.cipher != "aes" || env.mode != "ccm" {
        return Err(CryptoError::UnsupportedEnvelope(format!(
            "{}/{}",
            env.cipher, env.mode
        )));
    }
    if env.ts != TAG_BITS {
        return Err(CryptoError::UnsupportedEnvelope(format!("tag size {}", env.ts)));
    }
    if env.ks as usize != KEY_SIZE * 8 {
        return Err(CryptoError::InvalidKey(format!(
            "envelope wants a {}-bit key",
            env.ks
        )));
    }

    let iv = STANDARD
        .decode(&env.iv)
        .map_err(|e| CryptoError::UnsupportedEnvelope(format!("iv: {}", e)))?;
    let ct = STANDARD
        .decode(&env.ct)
        .map_err(|e| CryptoError::UnsupportedEnvelope(format!("ct: {}", e)))?;
    let adata = STANDARD
        .decode(&env.adata)
        .map_err(|e| CryptoError::UnsupportedEnvelope(format!("adata: {}", e)))?;

    if iv.len() < 13 {
        return Err(CryptoError::UnsupportedEnvelope(format!(
            "iv of {} bytes",
            iv.len()
        )));
    }
    if ct.len() < TAG_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    let plain = open(
        key,
        &iv,
        Payload {
            msg: &ct,
            aad: &adata,
        },
    )
    .map_err(|_| CryptoError::DecryptionFailed)?;

    String::from_utf8(plain).map_err(|_| CryptoError::DecryptionFailed)
}

/// Whether `text` looks like an SJCL envelope (a JSON object with `iv` and
/// `ct` strings). Plain-text notes sent by older clients are not.
pub fn is_envelope(text: &str) -> bool {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return false;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => {
            map.get("iv").is_some_and(|v| v.is_string())
                && map.get("ct").is_some_and(|v| v.is_string())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const IV: [u8; 16] = [7u8; 16];

    #[test]
    fn test_round_trip() {
        for msg in ["", "Personal Wallet", "{\"walletPrivKey\": \"abc\"}", "ünïcødé ✓"] {
            let env = encrypt(&KEY, msg, &SjclParams::default()).unwrap();
            assert_eq!(decrypt(&KEY, &env).unwrap(), msg);
        }
    }

    #[test]
    fn test_envelope_layout() {
        let env = encrypt_with_iv(&KEY, "hello", &IV, &SjclParams::default()).unwrap();
        let keys = ["iv", "v", "iter", "ks", "ts", "mode", "adata", "cipher", "ct"];
        let mut last = 0;
        for k in keys.map(|k| format!("\"{}\"", k)) {
            let pos = env.find(&k).unwrap_or_else(|| panic!("missing {}", k));
            assert!(pos >= last, "{} out of order in {}", k, env);
            last = pos;
        }

        let value: serde_json::Value = serde_json::from_str(&env).unwrap();
        assert_eq!(value["iv"], STANDARD.encode(IV));
        assert_eq!(value["v"], 1);
        assert_eq!(value["iter"], 1);
        assert_eq!(value["ks"], 128);
        assert_eq!(value["ts"], 64);
        assert_eq!(value["mode"], "ccm");
        assert_eq!(value["adata"], "");
        assert_eq!(value["cipher"], "aes");
        assert!(value.get("salt").is_none());

        // 5 bytes of plaintext plus the 8-byte tag
        let ct = STANDARD.decode(value["ct"].as_str().unwrap()).unwrap();
        assert_eq!(ct.len(), 5 + TAG_SIZE);
    }

    #[test]
    fn test_known_ciphertext() {
        let iv: [u8; 16] = std::array::from_fn(|i| 0xa0 + i as u8);
        let env = encrypt_with_iv(&KEY, "Personal Wallet", &iv, &SjclParams::default()).unwrap();
        assert_eq!(
            env,
            r#"{"iv":"oKGio6SlpqeoqaqrrK2urw==","v":1,"iter":1,"ks":128,"ts":64,"mode":"ccm","adata":"","cipher":"aes","ct":"CcgypxjAfYxkwvQU2NxmXy5l2lyvZ4k="}"#
        );

        // L = 3 uses the first 12 IV bytes as nonce
        let env = encrypt_with_iv(&KEY, &"x".repeat(70_000), &iv, &SjclParams::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&env).unwrap();
        let ct = STANDARD.decode(value["ct"].as_str().unwrap()).unwrap();
        assert_eq!(ct.len(), 70_008);
        assert_eq!(
            hex::encode(crate::hash::sha256(&ct)),
            "92c89071d69d3b5d1f7fc6ec0bd2f7a6f0dc609043755d9c8157f565cc45700d"
        );
    }

    #[test]
    fn test_decrypts_foreign_envelope() {
        let env = r#"{"iv":"oKGio6SlpqeoqaqrrK2urw==","v":1,"iter":10000,"ks":128,"ts":64,"mode":"ccm","adata":"","cipher":"aes","salt":"c2FsdA==","ct":"CcgypxjAfYxkwvQU2NxmXy5l2lyvZ4k="}"#;
        assert_eq!(decrypt(&KEY, env).unwrap(), "Personal Wallet");
    }

    #[test]
    fn test_deterministic_with_fixed_iv() {
        let a = encrypt_with_iv(&KEY, "same", &IV, &SjclParams::default()).unwrap();
        let b = encrypt_with_iv(&KEY, "same", &IV, &SjclParams::default()).unwrap();
        assert_eq!(a, b);
        let c = encrypt(&KEY, "same", &SjclParams::default()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_large_message_uses_wider_length_field() {
        assert_eq!(length_field_size(0), 2);
        assert_eq!(length_field_size(65_535), 2);
        assert_eq!(length_field_size(65_536), 3);
        assert_eq!(length_field_size(1 << 24), 4);

        let big = "x".repeat(70_000);
        let env = encrypt_with_iv(&KEY, &big, &IV, &SjclParams::default()).unwrap();
        assert_eq!(decrypt(&KEY, &env).unwrap(), big);
    }

    #[test]
    fn test_wrong_key_fails() {
        let env = encrypt(&KEY, "secret", &SjclParams::default()).unwrap();
        let mut other = KEY;
        other[0] ^= 1;
        assert!(matches!(decrypt(&other, &env), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let env = encrypt_with_iv(&KEY, "secret", &IV, &SjclParams::default()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&env).unwrap();
        let mut ct = STANDARD.decode(value["ct"].as_str().unwrap()).unwrap();
        ct[0] ^= 0x80;
        value["ct"] = STANDARD.encode(&ct).into();
        assert!(matches!(
            decrypt(&KEY, &value.to_string()),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_adata_is_authenticated() {
        let env = encrypt_with_iv(&KEY, "note", &IV, &SjclParams::default()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&env).unwrap();
        value["adata"] = STANDARD.encode(b"extra").into();
        assert!(matches!(
            decrypt(&KEY, &value.to_string()),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_defaults_applied_when_fields_missing() {
        let env = encrypt_with_iv(&KEY, "minimal", &IV, &SjclParams::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&env).unwrap();
        let minimal = serde_json::json!({ "iv": value["iv"], "ct": value["ct"] });
        assert_eq!(decrypt(&KEY, &minimal.to_string()).unwrap(), "minimal");
    }

    #[test]
    fn test_rejects_bad_key_and_mode() {
        assert!(matches!(
            encrypt(&[0u8; 15], "x", &SjclParams::default()),
            Err(CryptoError::InvalidKey(_))
        ));

        let env = encrypt_with_iv(&KEY, "x", &IV, &SjclParams::default()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&env).unwrap();
        value["mode"] = "gcm".into();
        assert!(matches!(
            decrypt(&KEY, &value.to_string()),
            Err(CryptoError::UnsupportedEnvelope(_))
        ));
        assert!(matches!(
            decrypt(&KEY, "not json"),
            Err(CryptoError::UnsupportedEnvelope(_))
        ));
    }

    #[test]
    fn test_is_envelope() {
        let env = encrypt(&KEY, "x", &SjclParams::default()).unwrap();
        assert!(is_envelope(&env));
        assert!(!is_envelope("Dinner with Bob"));
        assert!(!is_envelope("{\"iv\": 1}"));
        assert!(!is_envelope("{broken"));
        assert!(!is_envelope(""));
    }
}
