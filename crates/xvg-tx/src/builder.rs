//! Unsigned transaction construction from a wallet-service proposal.
//!
//! The service chooses the inputs, fee and change address; the client only
//! rebuilds the exact transaction the service expects so that its input
//! signatures and proposal signature match.

use crate::script::locking_script;
use crate::types::*;
use crate::TxError;
use xvg_types::Network;

/// An output being spent, as listed in the proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Txid in display order.
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    pub script_pubkey: Vec<u8>,
    /// Derivation path of the owning address, relative to the account key.
    pub path: String,
}

/// A payment destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub to_address: String,
    pub amount: u64,
}

/// The proposal fields that shape the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalSpec {
    pub outputs: Vec<Destination>,
    pub fee: u64,
    pub change_address: Option<String>,
    /// `[1, 0]` places change before the destination.
    pub output_order: Vec<usize>,
    /// Proposal creation time, used as the transaction timestamp.
    pub created_on: u32,
}

/// Transaction ready for signing plus the outputs it spends, index-aligned
/// with its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub tx: Transaction,
    pub spent_outputs: Vec<TxOut>,
}

impl UnsignedTransaction {
    pub fn total_input(&self) -> u64 {
        self.spent_outputs.iter().map(|o| o.value).sum()
    }

    pub fn fee(&self) -> u64 {
        self.total_input().saturating_sub(self.tx.total_output())
    }
}

/// Build the unsigned transaction described by `proposal`, spending `utxos`.
pub fn build_unsigned(
    proposal: &ProposalSpec,
    utxos: &[Utxo],
    network: Network,
) -> Result<UnsignedTransaction, TxError> {
    let dest = match proposal.outputs.as_slice() {
        [single] => single,
        other => {
            return Err(TxError::Malformed(format!(
                "expected exactly one destination, got {}",
                other.len()
            )))
        }
    };
    if utxos.is_empty() {
        return Err(TxError::Malformed("proposal has no inputs".into()));
    }

    let dest_script = locking_script(&dest.to_address, network)?;
    let change_script = proposal
        .change_address
        .as_deref()
        .map(|a| locking_script(a, network))
        .transpose()?;

    let have = utxos
        .iter()
        .try_fold(0u64, |acc, u| acc.checked_add(u.satoshis))
        .ok_or_else(|| TxError::Malformed("input total overflows".into()))?;
    let need = dest
        .amount
        .checked_add(proposal.fee)
        .ok_or_else(|| TxError::Malformed("amount plus fee overflows".into()))?;
    if have < need {
        return Err(TxError::InsufficientFunds { need, have });
    }
    let change = have - need;

    let to_output = TxOut {
        value: dest.amount,
        script_pubkey: dest_script,
    };
    let outputs = if change == 0 {
        vec![to_output]
    } else {
        let script_pubkey = change_script.ok_or_else(|| {
            TxError::Malformed(format!("change of {} but no change address", change))
        })?;
        let change_output = TxOut {
            value: change,
            script_pubkey,
        };
        if proposal.output_order == [1, 0] {
            vec![change_output, to_output]
        } else {
            vec![to_output, change_output]
        }
    };

    let mut inputs = Vec::with_capacity(utxos.len());
    let mut spent_outputs = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        inputs.push(TxIn::new(OutPoint::from_display_txid(&utxo.txid, utxo.vout)?));
        spent_outputs.push(TxOut {
            value: utxo.satoshis,
            script_pubkey: utxo.script_pubkey.clone(),
        });
    }

    log::debug!(
        "built unsigned tx: {} inputs, {} outputs, change {}",
        inputs.len(),
        outputs.len(),
        change
    );

    Ok(UnsignedTransaction {
        tx: Transaction {
            version: 1,
            time: proposal.created_on,
            inputs,
            outputs,
            lock_time: 0,
        },
        spent_outputs,
    })
}
