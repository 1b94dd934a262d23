//! Wallet key hierarchy.
//!
//! Every key the client uses comes from one BIP39 seed:
//!
//! | key     | path            | used for                                        |
//! |---------|-----------------|-------------------------------------------------|
//! | wallet  | `m/0'`          | wallet pubkey, copayer signature, shared key    |
//! | request | `m/1'/0`        | request signatures, personal key                |
//! | account | `m/44'/0'/0'`   | copayer xpub and identity, address keys         |
//!
//! Address keys are derived from the account key using the path the service
//! reports for each address (`m/0/5` means account/0/5). Nothing is stored:
//! keys are recomputed from the seed for each operation.

use bip39::{Language, Mnemonic};
use xvg_crypto::{encode_wif, hash160, DerivationError, DerivationPath, ExtendedPrivKey};
use xvg_rpc::RequestAuthenticator;
use xvg_types::{Address, Network};

/// Path of the wallet key.
pub const WALLET_KEY_PATH: &str = "m/0'";
/// Path of the request key.
pub const REQUEST_KEY_PATH: &str = "m/1'/0";
/// Path of the BIP44 account key.
pub const ACCOUNT_KEY_PATH: &str = "m/44'/0'/0'";

/// Supplies the seed phrase and passphrase.
pub trait SeedSource: Send + Sync {
    /// Mnemonic words, or `None` when no wallet has been set up.
    fn mnemonic(&self) -> Option<Vec<String>>;
    fn passphrase(&self) -> Option<String>;
}

/// In-memory seed source.
#[derive(Clone, Default)]
pub struct StaticSeed {
    words: Vec<String>,
    passphrase: String,
}

impl StaticSeed {
    pub fn new(words: Vec<String>, passphrase: &str) -> Self {
        Self {
            words,
            passphrase: passphrase.to_string(),
        }
    }

    /// From a whitespace-separated phrase.
    pub fn from_phrase(phrase: &str, passphrase: &str) -> Self {
        Self::new(
            phrase.split_whitespace().map(str::to_string).collect(),
            passphrase,
        )
    }

    /// A fresh 12-word mnemonic from 128 bits of OS randomness.
    pub fn generate(passphrase: &str) -> Result<Self, DerivationError> {
        let mut entropy = [0u8; 16];
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut entropy);
        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
            .map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))?;
        Ok(Self::from_phrase(&mnemonic.to_string(), passphrase))
    }

    pub fn phrase(&self) -> String {
        self.words.join(" ")
    }
}

impl std::fmt::Debug for StaticSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSeed")
            .field("words", &self.words.len())
            .finish_non_exhaustive()
    }
}

impl SeedSource for StaticSeed {
    fn mnemonic(&self) -> Option<Vec<String>> {
        if self.words.is_empty() {
            None
        } else {
            Some(self.words.clone())
        }
    }

    fn passphrase(&self) -> Option<String> {
        Some(self.passphrase.clone())
    }
}

// ─── Key hierarchy ──────────────────────────────────────────────────────────

/// Derives the wallet's keys on demand from a `SeedSource`.
pub struct KeyHierarchy {
    source: Box<dyn SeedSource>,
    network: Network,
}

impl KeyHierarchy {
    pub fn new(source: impl SeedSource + 'static, network: Network) -> Self {
        Self {
            source: Box::new(source),
            network,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// 64-byte BIP39 seed. Fails with `KeyUnavailable` when the source has
    /// no mnemonic or no passphrase, and `InvalidMnemonic` when the words
    /// fail validation.
    pub fn seed(&self) -> Result<[u8; 64], DerivationError> {
        let words = self.source.mnemonic().ok_or(DerivationError::KeyUnavailable)?;
        if words.is_empty() {
            return Err(DerivationError::KeyUnavailable);
        }
        let passphrase = self.source.passphrase().ok_or(DerivationError::KeyUnavailable)?;

        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &words.join(" "))
            .map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))?;
        Ok(mnemonic.to_seed_normalized(&passphrase))
    }

    pub fn master_key(&self) -> Result<ExtendedPrivKey, DerivationError> {
        ExtendedPrivKey::new_master(&self.seed()?)
    }

    /// One derivation step from `node`.
    pub fn derive(
        node: &ExtendedPrivKey,
        index: u32,
        hardened: bool,
    ) -> Result<ExtendedPrivKey, DerivationError> {
        node.derive(index, hardened)
    }

    pub fn wallet_key(&self) -> Result<ExtendedPrivKey, DerivationError> {
        self.key_at_path(WALLET_KEY_PATH)
    }

    pub fn request_key(&self) -> Result<ExtendedPrivKey, DerivationError> {
        self.key_at_path(REQUEST_KEY_PATH)
    }

    pub fn account_key(&self) -> Result<ExtendedPrivKey, DerivationError> {
        self.key_at_path(ACCOUNT_KEY_PATH)
    }

    /// Key at `path` from the master key.
    pub fn key_at_path(&self, path: &str) -> Result<ExtendedPrivKey, DerivationError> {
        self.master_key()?.derive_path(&path.parse()?)
    }

    /// Key at `path` relative to the account key (service address paths).
    pub fn address_key(&self, path: &str) -> Result<ExtendedPrivKey, DerivationError> {
        self.account_key()?.derive_path(&path.parse()?)
    }

    /// Derive the master, wallet, request and account keys at once, for use
    /// within a single operation.
    pub fn derive_all(&self) -> Result<DerivedKeys, DerivationError> {
        let master = self.master_key()?;
        let wallet = master.derive_path(&WALLET_KEY_PATH.parse()?)?;
        let request = master.derive_path(&REQUEST_KEY_PATH.parse()?)?;
        let account = master.derive_path(&ACCOUNT_KEY_PATH.parse()?)?;
        Ok(DerivedKeys {
            master,
            wallet,
            request,
            account,
            network: self.network,
        })
    }
}

/// The fixed keys of one wallet, derived for one operation.
pub struct DerivedKeys {
    pub master: ExtendedPrivKey,
    pub wallet: ExtendedPrivKey,
    pub request: ExtendedPrivKey,
    pub account: ExtendedPrivKey,
    pub network: Network,
}

impl DerivedKeys {
    pub fn address_key(&self, path: &str) -> Result<ExtendedPrivKey, DerivationError> {
        let path: DerivationPath = path.parse()?;
        self.account.derive_path(&path)
    }

    /// P2PKH address (compressed public key) at `path` under the account.
    pub fn address_for_path(&self, path: &str) -> Result<String, DerivationError> {
        let key = self.address_key(path)?;
        let hash = hash160(&key.public_key_bytes());
        Ok(Address::p2pkh(hash, self.network).to_string())
    }

    /// Account extended public key with the network's version bytes.
    pub fn account_xpub(&self) -> String {
        self.account.to_xpub(self.network.params().xpub)
    }

    /// Compressed wallet public key, hex.
    pub fn wallet_pub_key(&self) -> String {
        hex::encode(self.wallet.public_key_bytes())
    }

    pub fn wallet_wif(&self) -> String {
        encode_wif(&self.wallet.secret_key(), self.network.params().wif)
    }

    pub fn master_wif(&self) -> String {
        encode_wif(&self.master.secret_key(), self.network.params().wif)
    }

    /// Request signer identified by this copayer's account xpub.
    pub fn authenticator(&self) -> RequestAuthenticator {
        RequestAuthenticator::new(self.request.secret_key(), &self.account_xpub())
    }
}
