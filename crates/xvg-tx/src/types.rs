//! Typed transaction structures and their wire serialization.
//!
//! Layout: `version:i32 | time:u32 | varint n | inputs | varint n | outputs |
//! lock_time:u32`, all integers little-endian.

use crate::TxError;
use xvg_crypto::sha256d;

/// Sequence number used for every input (final, no relative lock).
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

// ─── Core Transaction Types ─────────────────────────────────────────────────

/// Reference to a previous transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Transaction hash in internal (wire) byte order.
    pub txid: [u8; 32],
    pub vout: u32,
}

impl OutPoint {
    /// From a txid as displayed by explorers and the wallet service
    /// (byte-reversed hex).
    pub fn from_display_txid(txid: &str, vout: u32) -> Result<Self, TxError> {
        let bytes = hex::decode(txid)
            .map_err(|e| TxError::Malformed(format!("txid '{}': {}", txid, e)))?;
        if bytes.len() != 32 {
            return Err(TxError::Malformed(format!(
                "txid '{}' is {} bytes, expected 32",
                txid,
                bytes.len()
            )));
        }
        let mut hash = [0u8; 32];
        for (dst, src) in hash.iter_mut().zip(bytes.iter().rev()) {
            *dst = *src;
        }
        Ok(Self { txid: hash, vout })
    }

    /// Txid in display order.
    pub fn display_txid(&self) -> String {
        let mut rev = self.txid;
        rev.reverse();
        hex::encode(rev)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    /// Unsigned input spending `previous_output`.
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script_sig: Vec::new(),
            sequence: SEQUENCE_FINAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in atomic units.
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

/// Verge transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    /// Creation timestamp (unix seconds).
    pub time: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            16 + self.inputs.len() * 41 + self.outputs.len() * 34,
        );
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.time.to_le_bytes());

        write_varint(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(&input.previous_output.txid);
            out.extend_from_slice(&input.previous_output.vout.to_le_bytes());
            write_var_bytes(&mut out, &input.script_sig);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_varint(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(&mut out, &output.script_pubkey);
        }

        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /// Transaction id in display order.
    pub fn txid(&self) -> String {
        let mut hash = sha256d(&self.serialize());
        hash.reverse();
        hex::encode(hash)
    }

    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

// ─── Varint ─────────────────────────────────────────────────────────────────

/// Bitcoin CompactSize integer.
pub fn write_varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

fn write_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint(n: u64) -> Vec<u8> {
        let mut v = Vec::new();
        write_varint(&mut v, n);
        v
    }

    #[test]
    fn test_varint_boundaries() {
        assert_eq!(varint(0), [0x00]);
        assert_eq!(varint(0xfc), [0xfc]);
        assert_eq!(varint(0xfd), [0xfd, 0xfd, 0x00]);
        assert_eq!(varint(0xffff), [0xfd, 0xff, 0xff]);
        assert_eq!(varint(0x1_0000), [0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(varint(0x1_0000_0000), [0xff, 0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_outpoint_reverses_display_txid() {
        let display = format!("{}{}", "00".repeat(31), "ab");
        let op = OutPoint::from_display_txid(&display, 3).unwrap();
        assert_eq!(op.txid[0], 0xab);
        assert_eq!(op.txid[31], 0x00);
        assert_eq!(op.display_txid(), display);

        assert!(matches!(
            OutPoint::from_display_txid("abcd", 0),
            Err(TxError::Malformed(_))
        ));
        assert!(matches!(
            OutPoint::from_display_txid("zz", 0),
            Err(TxError::Malformed(_))
        ));
    }

    #[test]
    fn test_serialize_layout() {
        let tx = Transaction {
            version: 1,
            time: 0x5c00_0000,
            inputs: vec![TxIn::new(OutPoint {
                txid: [0x11; 32],
                vout: 2,
            })],
            outputs: vec![TxOut {
                value: 1_000_000,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        };
        let raw = tx.serialize();

        let mut expected = Vec::new();
        expected.extend_from_slice(&[1, 0, 0, 0]);
        expected.extend_from_slice(&[0x00, 0x00, 0x00, 0x5c]);
        expected.push(1);
        expected.extend_from_slice(&[0x11; 32]);
        expected.extend_from_slice(&[2, 0, 0, 0]);
        expected.push(0);
        expected.extend_from_slice(&[0xff; 4]);
        expected.push(1);
        expected.extend_from_slice(&1_000_000u64.to_le_bytes());
        expected.extend_from_slice(&[1, 0x51]);
        expected.extend_from_slice(&[0, 0, 0, 0]);

        assert_eq!(raw, expected);
        assert_eq!(tx.to_hex(), hex::encode(&expected));
        assert_eq!(tx.txid().len(), 64);
        assert_eq!(tx.total_output(), 1_000_000);
    }
}
