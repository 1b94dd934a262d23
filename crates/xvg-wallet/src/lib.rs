//! Verge wallet core.
//!
//! Derives the wallet's key hierarchy from a BIP39 seed, encrypts the
//! fields shared with copayers, and drives the wallet service: wallet
//! creation and joining, addresses, balance and history, and the
//! transaction-proposal lifecycle including local signing.

pub mod client;
pub mod config;
pub mod encryption;
pub mod error;
pub mod keys;
pub mod repository;
pub mod secret;
pub mod state;

pub use client::{WalletClient, WalletOptions};
pub use config::WalletConfig;
pub use error::{ErrorKind, WalletError};
pub use keys::{DerivedKeys, KeyHierarchy, SeedSource, StaticSeed};
pub use repository::{FileRepository, MemoryRepository, WalletRecord, WalletRepository};
pub use secret::{build_secret, parse_secret, WalletSecret};
pub use state::WalletState;
