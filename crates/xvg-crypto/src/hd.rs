//! BIP32 hierarchical deterministic private keys.
//!
//! Derivation and extended-key serialization come from the `bip32` crate.
//! This module adds the path syntax the wallet service uses and exposes
//! each node's scalar as a `secp256k1` key for signing.
//!
//! Only private derivation is needed: every public key the service asks for
//! is computed from the matching private node.

use bip32::{Prefix, XPrv};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use thiserror::Error;

use crate::ecdsa::public_key_bytes;

pub use bip32::ChildNumber;

/// First hardened child index.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Seed lengths accepted for a master node.
const SEED_LENGTHS: [usize; 3] = [16, 32, 64];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    #[error("invalid derivation path segment '{0}'")]
    InvalidDerivationPath(String),

    #[error("seed must be 16, 32 or 64 bytes, got {0}")]
    InvalidSeedLength(usize),

    #[error("derived key at index {0} is invalid")]
    InvalidChild(u32),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("no seed available (wallet not set up)")]
    KeyUnavailable,
}

/// Raw 32-bit index as serialized (hardened offset applied).
fn raw_index(child: ChildNumber) -> u32 {
    if child.is_hardened() {
        child.index() | HARDENED_OFFSET
    } else {
        child.index()
    }
}

// ─── Paths ──────────────────────────────────────────────────────────────────

/// A `/`-separated derivation path such as `m/44'/0'/0'` or `0/5`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    pub fn new(children: Vec<ChildNumber>) -> Self {
        Self(children)
    }

    pub fn children(&self) -> &[ChildNumber] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append one step.
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut children = self.0.clone();
        children.push(child);
        Self(children)
    }
}

impl std::str::FromStr for DerivationPath {
    type Err = DerivationError;

    /// Parse a path. A leading `m/` (or a bare `m`) is stripped; a segment
    /// suffixed with `'`, `h` or `H` is hardened. Unsuffixed segments at or
    /// above 2^31 are taken as raw hardened indices.
    fn from_str(path: &str) -> Result<Self, DerivationError> {
        let path = path.trim();
        let rest = match path {
            "" | "m" | "M" => return Ok(Self::default()),
            p => p
                .strip_prefix("m/")
                .or_else(|| p.strip_prefix("M/"))
                .unwrap_or(p),
        };

        let mut children = Vec::new();
        for segment in rest.split('/') {
            let invalid = || DerivationError::InvalidDerivationPath(segment.to_string());
            let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
                Some(d) => (d, true),
                None => (segment, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let index: u32 = digits.parse().map_err(|_| invalid())?;

            let child = if !hardened && index >= HARDENED_OFFSET {
                ChildNumber::new(index & !HARDENED_OFFSET, true)
            } else {
                ChildNumber::new(index, hardened)
            };
            children.push(child.map_err(|_| invalid())?);
        }
        Ok(Self(children))
    }
}

impl std::fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("m")?;
        for child in &self.0 {
            write!(f, "/{}", child.index())?;
            if child.is_hardened() {
                f.write_str("'")?;
            }
        }
        Ok(())
    }
}

// ─── Extended private key ───────────────────────────────────────────────────

/// BIP32 extended private key.
#[derive(Clone)]
pub struct ExtendedPrivKey {
    xprv: XPrv,
    secret_key: SecretKey,
}

impl std::fmt::Debug for ExtendedPrivKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedPrivKey")
            .field("depth", &self.depth())
            .field("child_number", &raw_index(self.child_number()))
            .field("fingerprint", &hex::encode(self.fingerprint()))
            .finish_non_exhaustive()
    }
}

impl PartialEq for ExtendedPrivKey {
    fn eq(&self, other: &Self) -> bool {
        self.depth() == other.depth()
            && self.child_number() == other.child_number()
            && self.chain_code() == other.chain_code()
            && self.secret_key == other.secret_key
    }
}

impl Eq for ExtendedPrivKey {}

impl ExtendedPrivKey {
    fn from_xprv(xprv: XPrv, index: u32) -> Result<Self, DerivationError> {
        let secret_key = SecretKey::from_slice(&xprv.to_bytes())
            .map_err(|_| DerivationError::InvalidChild(index))?;
        Ok(Self { xprv, secret_key })
    }

    /// Master node from a BIP39 seed.
    pub fn new_master(seed: &[u8]) -> Result<Self, DerivationError> {
        if !SEED_LENGTHS.contains(&seed.len()) {
            return Err(DerivationError::InvalidSeedLength(seed.len()));
        }
        let xprv = XPrv::new(seed).map_err(|_| DerivationError::InvalidChild(0))?;
        Self::from_xprv(xprv, 0)
    }

    /// Derive one child (CKDpriv).
    pub fn derive_child(&self, child: ChildNumber) -> Result<Self, DerivationError> {
        let raw = raw_index(child);
        let xprv = self
            .xprv
            .derive_child(child)
            .map_err(|_| DerivationError::InvalidChild(raw))?;
        Self::from_xprv(xprv, raw)
    }

    /// Derive the child at `index`, hardened or not.
    pub fn derive(&self, index: u32, hardened: bool) -> Result<Self, DerivationError> {
        let child = ChildNumber::new(index, hardened)
            .map_err(|_| DerivationError::InvalidDerivationPath(index.to_string()))?;
        self.derive_child(child)
    }

    /// Derive along a path relative to this node.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, DerivationError> {
        let mut node = self.clone();
        for child in path.children() {
            node = node.derive_child(*child)?;
        }
        Ok(node)
    }

    pub fn depth(&self) -> u8 {
        self.xprv.attrs().depth
    }

    pub fn child_number(&self) -> ChildNumber {
        self.xprv.attrs().child_number
    }

    pub fn chain_code(&self) -> [u8; 32] {
        self.xprv.attrs().chain_code
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.xprv.attrs().parent_fingerprint
    }

    pub fn secret_key(&self) -> SecretKey {
        self.secret_key
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &self.secret_key)
    }

    /// Compressed public key.
    pub fn public_key_bytes(&self) -> [u8; 33] {
        public_key_bytes(&self.secret_key)
    }

    /// Raw 32-byte private scalar.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret_key.secret_bytes()
    }

    /// First four bytes of HASH160 of the public key.
    pub fn fingerprint(&self) -> [u8; 4] {
        self.xprv.public_key().fingerprint()
    }

    /// Base58Check extended private key with the given version bytes.
    pub fn to_xprv(&self, version: u32) -> String {
        let prefix = Prefix::from_parts_unchecked("xprv", version);
        self.xprv.to_extended_key(prefix).to_string()
    }

    /// Base58Check extended public key with the given version bytes.
    pub fn to_xpub(&self, version: u32) -> String {
        let prefix = Prefix::from_parts_unchecked("xpub", version);
        self.xprv.public_key().to_extended_key(prefix).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTC_XPRV: u32 = 0x0488_ade4;
    const BTC_XPUB: u32 = 0x0488_b21e;

    fn vector1_master() -> ExtendedPrivKey {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        ExtendedPrivKey::new_master(&seed).unwrap()
    }

    fn hardened(index: u32) -> ChildNumber {
        ChildNumber::new(index, true).unwrap()
    }

    fn normal(index: u32) -> ChildNumber {
        ChildNumber::new(index, false).unwrap()
    }

    #[test]
    fn test_bip32_vector1_master() {
        let m = vector1_master();
        assert_eq!(
            m.to_xprv(BTC_XPRV),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            m.to_xpub(BTC_XPUB),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
        assert_eq!(m.depth(), 0);
        assert_eq!(m.parent_fingerprint(), [0u8; 4]);
    }

    #[test]
    fn test_bip32_vector1_hardened_child() {
        let m = vector1_master();
        let child = m.derive(0, true).unwrap();
        assert_eq!(
            child.to_xprv(BTC_XPRV),
            "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
        );
        assert_eq!(
            child.to_xpub(BTC_XPUB),
            "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw"
        );
        assert_eq!(child.parent_fingerprint(), m.fingerprint());
        assert_eq!(hex::encode(m.fingerprint()), "3442193e");
    }

    #[test]
    fn test_bip32_vector1_normal_child() {
        let node = "m/0'/1".parse::<DerivationPath>().unwrap();
        let child = vector1_master().derive_path(&node).unwrap();
        assert_eq!(
            child.to_xpub(BTC_XPUB),
            "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ"
        );
    }

    #[test]
    fn test_derive_path_equals_manual_steps() {
        let m = vector1_master();
        let via_path = m
            .derive_path(&"m/44'/0'/0'".parse().unwrap())
            .unwrap();
        let manual = m
            .derive(44, true)
            .unwrap()
            .derive(0, true)
            .unwrap()
            .derive(0, true)
            .unwrap();
        assert_eq!(via_path, manual);
        assert_eq!(via_path.depth(), 3);
        assert_ne!(via_path, m);
    }

    #[test]
    fn test_path_parsing() {
        let p: DerivationPath = "m/44'/0h/1H/0/5".parse().unwrap();
        assert_eq!(
            p.children(),
            &[hardened(44), hardened(0), hardened(1), normal(0), normal(5)]
        );
        assert_eq!(p.to_string(), "m/44'/0'/1'/0/5");

        assert!("m".parse::<DerivationPath>().unwrap().is_empty());
        assert_eq!("0/5".parse::<DerivationPath>().unwrap().children().len(), 2);
        assert_eq!(
            "2147483648".parse::<DerivationPath>().unwrap().children(),
            &[hardened(0)]
        );
    }

    #[test]
    fn test_path_parsing_errors() {
        for bad in ["abc", "m/0/x", "m//1", "m/-1", "m/4294967296", "m/2147483648'", "m/1/"] {
            assert!(
                matches!(
                    bad.parse::<DerivationPath>(),
                    Err(DerivationError::InvalidDerivationPath(_))
                ),
                "{} should fail",
                bad
            );
        }
    }

    #[test]
    fn test_seed_length() {
        assert_eq!(
            ExtendedPrivKey::new_master(&[0u8; 8]),
            Err(DerivationError::InvalidSeedLength(8))
        );
        assert_eq!(
            ExtendedPrivKey::new_master(&[0u8; 20]),
            Err(DerivationError::InvalidSeedLength(20))
        );
    }

    #[test]
    fn test_derive_rejects_hardened_bit() {
        assert_eq!(
            vector1_master().derive(HARDENED_OFFSET, false),
            Err(DerivationError::InvalidDerivationPath("2147483648".into()))
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let dbg = format!("{:?}", vector1_master());
        assert!(!dbg.contains(&hex::encode(vector1_master().secret_bytes())));
    }
}
