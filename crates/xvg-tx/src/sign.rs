//! Legacy SIGHASH_ALL input signing.
//!
//! Keys are matched to inputs by the P2PKH public-key hash of the output
//! being spent. Inputs no supplied key owns are skipped so that each copayer
//! can contribute its own signatures.

use crate::builder::UnsignedTransaction;
use crate::script::p2pkh_pubkey_hash;
use crate::types::Transaction;
use crate::TxError;
use xvg_crypto::{ecdsa_sign, hash160, public_key_bytes, sha256d, SecretKey};

pub const SIGHASH_ALL: u32 = 0x01;

/// DER signature for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSignature {
    pub input_index: usize,
    pub signature: Vec<u8>,
}

impl InputSignature {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.signature)
    }
}

/// Legacy signature hash of input `index` spending an output locked by
/// `prev_script`.
pub fn signature_hash(
    tx: &Transaction,
    index: usize,
    prev_script: &[u8],
) -> Result<[u8; 32], TxError> {
    if index >= tx.inputs.len() {
        return Err(TxError::Signing(format!(
            "input {} out of range ({} inputs)",
            index,
            tx.inputs.len()
        )));
    }

    let mut copy = tx.clone();
    for (i, input) in copy.inputs.iter_mut().enumerate() {
        input.script_sig = if i == index {
            prev_script.to_vec()
        } else {
            Vec::new()
        };
    }

    let mut preimage = copy.serialize();
    preimage.extend_from_slice(&SIGHASH_ALL.to_le_bytes());
    Ok(sha256d(&preimage))
}

/// Sign every input owned by one of `keys`, in input order.
pub fn sign_transaction(
    unsigned: &UnsignedTransaction,
    keys: &[SecretKey],
) -> Result<Vec<InputSignature>, TxError> {
    if unsigned.spent_outputs.len() != unsigned.tx.inputs.len() {
        return Err(TxError::Signing(format!(
            "{} spent outputs for {} inputs",
            unsigned.spent_outputs.len(),
            unsigned.tx.inputs.len()
        )));
    }

    let key_hashes: Vec<([u8; 20], &SecretKey)> = keys
        .iter()
        .map(|k| (hash160(&public_key_bytes(k)), k))
        .collect();

    let mut signatures = Vec::new();
    for (index, prev) in unsigned.spent_outputs.iter().enumerate() {
        let Some(pubkey_hash) = p2pkh_pubkey_hash(&prev.script_pubkey) else {
            log::debug!("input {} is not P2PKH, skipping", index);
            continue;
        };
        let Some((_, key)) = key_hashes.iter().find(|(h, _)| *h == pubkey_hash) else {
            log::debug!("no key for input {} ({} sat), skipping", index, prev.value);
            continue;
        };

        let sighash = signature_hash(&unsigned.tx, index, &prev.script_pubkey)?;
        signatures.push(InputSignature {
            input_index: index,
            signature: ecdsa_sign(&sighash, key),
        });
    }
    Ok(signatures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::p2pkh_script;
    use crate::types::{OutPoint, TxIn, TxOut};

    fn two_input_tx() -> Transaction {
        Transaction {
            version: 1,
            time: 1_550_000_000,
            inputs: vec![
                TxIn::new(OutPoint { txid: [1; 32], vout: 0 }),
                TxIn::new(OutPoint { txid: [2; 32], vout: 1 }),
            ],
            outputs: vec![TxOut {
                value: 5,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn test_sighash_preimage() {
        let tx = two_input_tx();
        let prev = p2pkh_script(&[0xaa; 20]);

        let mut expected = tx.clone();
        expected.inputs[1].script_sig = prev.clone();
        let mut preimage = expected.serialize();
        preimage.extend_from_slice(&[1, 0, 0, 0]);

        assert_eq!(signature_hash(&tx, 1, &prev).unwrap(), sha256d(&preimage));
        assert_ne!(
            signature_hash(&tx, 0, &prev).unwrap(),
            signature_hash(&tx, 1, &prev).unwrap()
        );
    }

    #[test]
    fn test_sighash_ignores_existing_script_sigs() {
        let tx = two_input_tx();
        let mut dirty = tx.clone();
        dirty.inputs[0].script_sig = vec![0xde, 0xad];
        let prev = p2pkh_script(&[0xbb; 20]);
        assert_eq!(
            signature_hash(&tx, 1, &prev).unwrap(),
            signature_hash(&dirty, 1, &prev).unwrap()
        );
    }

    #[test]
    fn test_sighash_index_out_of_range() {
        assert!(matches!(
            signature_hash(&two_input_tx(), 2, &[]),
            Err(TxError::Signing(_))
        ));
    }

    #[test]
    fn test_mismatched_spent_outputs() {
        let unsigned = UnsignedTransaction {
            tx: two_input_tx(),
            spent_outputs: vec![],
        };
        assert!(matches!(
            sign_transaction(&unsigned, &[]),
            Err(TxError::Signing(_))
        ));
    }
}
