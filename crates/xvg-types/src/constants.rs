//! Verge network constants, address versions and service identifiers.
//!
//! Reference: verge/src/chainparams.cpp

use serde::{Deserialize, Serialize};

// =============================================================================
// Units
// =============================================================================

/// Number of decimal places in one XVG.
pub const COIN_DECIMALS: u32 = 6;

/// Atomic units ("satoshis") per XVG.
pub const SATOSHIS_PER_XVG: u64 = 1_000_000;

/// Coin tag used by the wallet service.
pub const COIN: &str = "xvg";

// =============================================================================
// Network Types
// =============================================================================

/// Network type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
}

/// Version bytes and service tags for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub network: Network,
    /// P2PKH address version byte.
    pub pubkey_hash: u8,
    /// P2SH address version byte.
    pub script_hash: u8,
    /// WIF private key version byte.
    pub wif: u8,
    /// Extended public key version (BIP32 serialization).
    pub xpub: u32,
    /// Extended private key version (BIP32 serialization).
    pub xprv: u32,
    /// Network name expected by the wallet service.
    pub service_network: &'static str,
    /// Network marker appended to wallet secrets.
    pub secret_suffix: char,
}

pub static MAINNET: NetworkParams = NetworkParams {
    network: Network::Mainnet,
    pubkey_hash: 0x1e,
    script_hash: 0x21,
    wif: 0x9e,
    xpub: 0x022d_2533,
    xprv: 0x0221_312b,
    service_network: "livenet",
    secret_suffix: 'L',
};

pub static TESTNET: NetworkParams = NetworkParams {
    network: Network::Testnet,
    pubkey_hash: 0x73,
    script_hash: 0xc6,
    wif: 0xf3,
    xpub: 0x0435_87cf,
    xprv: 0x0435_8394,
    service_network: "testnet",
    secret_suffix: 'T',
};

impl Network {
    /// Version bytes and service tags for this network.
    pub fn params(&self) -> &'static NetworkParams {
        match self {
            Network::Mainnet => &MAINNET,
            Network::Testnet => &TESTNET,
        }
    }

    /// Look up a network by its secret suffix character.
    pub fn from_secret_suffix(c: char) -> Option<Network> {
        match c {
            'L' => Some(Network::Mainnet),
            'T' => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" | "livenet" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            _ => Err(format!("unknown network: {} (use mainnet or testnet)", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_lookup() {
        assert_eq!(Network::Mainnet.params().pubkey_hash, 0x1e);
        assert_eq!(Network::Testnet.params().service_network, "testnet");
    }

    #[test]
    fn test_secret_suffix_roundtrip() {
        for net in [Network::Mainnet, Network::Testnet] {
            let c = net.params().secret_suffix;
            assert_eq!(Network::from_secret_suffix(c), Some(net));
        }
        assert_eq!(Network::from_secret_suffix('X'), None);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("livenet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("TEST".parse::<Network>().unwrap(), Network::Testnet);
        assert!("stagenet".parse::<Network>().is_err());
    }
}
