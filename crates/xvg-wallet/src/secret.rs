//! Wallet invitation secret.
//!
//! `base58(wallet id bytes)` right-padded with `0` to 22 characters, then the
//! master key WIF, the network marker (`L` livenet, `T` testnet) and the
//! coin. `0` is not in the Base58 alphabet, so the padding is unambiguous.

use crate::error::WalletError;
use xvg_crypto::{base58_decode, base58_encode, decode_wif, hex_decode, SecretKey};
use xvg_types::constants::COIN;
use xvg_types::Network;

const WALLET_ID_LEN: usize = 22;
const PAD: char = '0';

/// Decoded wallet secret.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletSecret {
    /// Wallet id in UUID form.
    pub wallet_id: String,
    pub master_wif: String,
    pub master_key: SecretKey,
    pub network: Network,
    pub coin: String,
}

impl std::fmt::Debug for WalletSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSecret")
            .field("wallet_id", &self.wallet_id)
            .field("network", &self.network)
            .field("coin", &self.coin)
            .finish_non_exhaustive()
    }
}

pub fn build_secret(wallet_id: &str, master_wif: &str, network: Network) -> Result<String, WalletError> {
    let wid = hex_decode(&wallet_id.replace('-', ""))
        .map_err(|_| WalletError::InvalidSecret(format!("wallet id '{}' is not hex", wallet_id)))?;
    let mut encoded = base58_encode(&wid);
    if encoded.len() > WALLET_ID_LEN {
        return Err(WalletError::InvalidSecret(format!(
            "wallet id '{}' is too long",
            wallet_id
        )));
    }
    while encoded.len() < WALLET_ID_LEN {
        encoded.push(PAD);
    }
    Ok(format!(
        "{}{}{}{}",
        encoded,
        master_wif,
        network.params().secret_suffix,
        COIN
    ))
}

pub fn parse_secret(secret: &str) -> Result<WalletSecret, WalletError> {
    let secret = secret.trim();
    let invalid = |why: &str| WalletError::InvalidSecret(why.to_string());

    if !secret.is_ascii() || secret.len() < WALLET_ID_LEN + COIN.len() + 2 {
        return Err(invalid("too short"));
    }
    let (wid_part, rest) = secret.split_at(WALLET_ID_LEN);
    let (body, coin) = rest.split_at(rest.len() - COIN.len());
    if coin != COIN {
        return Err(invalid("unknown coin"));
    }
    let (wif, marker) = body.split_at(body.len() - 1);
    let network = marker
        .chars()
        .next()
        .and_then(Network::from_secret_suffix)
        .ok_or_else(|| invalid("unknown network marker"))?;

    let wid = base58_decode(wid_part.trim_end_matches(PAD))
        .map_err(|e| WalletError::InvalidSecret(format!("wallet id: {}", e)))?;
    if wid.len() != 16 {
        return Err(invalid("wallet id is not 16 bytes"));
    }
    let (master_key, version) =
        decode_wif(wif).map_err(|e| WalletError::InvalidSecret(format!("master key: {}", e)))?;
    if version != network.params().wif {
        return Err(invalid("master key is for another network"));
    }

    Ok(WalletSecret {
        wallet_id: format_uuid(&wid),
        master_wif: wif.to_string(),
        master_key,
        network,
        coin: coin.to_string(),
    })
}

fn format_uuid(bytes: &[u8]) -> String {
    let h = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &h[0..8],
        &h[8..12],
        &h[12..16],
        &h[16..20],
        &h[20..32]
    )
}
