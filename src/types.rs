//! Ledger shapes read by the engine
//!
//! Only the parts of a transaction that authorization depends on are modelled
//! here. Everything is hashable through the canonical encoding in [`crate::hash`].

use crate::hash::{hash_full, hash_multi, Hash, HashPart};
use crate::hash_record;
use crate::lock::{Lock, Unlock};
use serde::{Deserialize, Serialize};

/// Block height
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height(pub u64);

impl HashPart for Height {
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool) {
        self.0.hash_part(buf, write_length);
    }
}

/// Output value in the smallest unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(pub u64);

impl HashPart for Amount {
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool) {
        self.0.hash_part(buf, write_length);
    }
}

/// Input: 𝒾 = utxo × unlock × age
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Key of the UTXO being spent
    pub utxo: Hash,
    /// Authorization data; never part of the input's hash
    pub unlock: Unlock,
    /// Relative age the spent output must have reached
    pub unlock_age: u32,
}

impl TxInput {
    pub fn new(utxo: Hash, unlock: Unlock, unlock_age: u32) -> Self {
        Self { utxo, unlock, unlock_age }
    }
}

impl HashPart for TxInput {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        // the unlock carries the signatures over this very hash
        self.utxo.hash_part(buf, true);
        self.unlock_age.hash_part(buf, true);
    }
}

/// Output: 𝒪 = value × lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    pub lock: Lock,
}

hash_record!(TxOutput { value, lock });

/// Transaction: 𝒯𝒳 = 𝒾* × 𝒪* × payload × lock_height
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub payload: Vec<u8>,
    /// Earliest height at which the transaction may be externalized
    pub lock_height: Height,
}

hash_record!(Transaction { inputs, outputs, payload, lock_height });

/// Key of the output at `index` of the transaction hashed to `tx_hash`.
///
/// The same combinator derives sequence-signature challenges, with the
/// sequence number in place of the index.
pub fn utxo_key(tx_hash: &Hash, index: u64) -> Hash {
    hash_multi(&[tx_hash, &index])
}

/// Keys of all outputs of `tx`
pub fn utxo_keys(tx: &Transaction) -> Vec<Hash> {
    let tx_hash = hash_full(tx);
    (0..tx.outputs.len() as u64)
        .map(|index| utxo_key(&tx_hash, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;

    #[test]
    fn test_input_hash_excludes_unlock() {
        let a = TxInput::new(hash(b"utxo"), Unlock::new(vec![1, 2, 3]), 5);
        let b = TxInput::new(hash(b"utxo"), Unlock::new(vec![9]), 5);
        assert_eq!(hash_full(&a), hash_full(&b));

        let c = TxInput::new(hash(b"utxo"), Unlock::default(), 6);
        assert_ne!(hash_full(&a), hash_full(&c));
    }

    #[test]
    fn test_transaction_hash_covers_lock_height() {
        let mut tx = Transaction::default();
        let before = hash_full(&tx);
        tx.lock_height = Height(10);
        assert_ne!(before, hash_full(&tx));
    }

    #[test]
    fn test_utxo_key_encoding() {
        let tx_hash = hash(b"tx");
        let mut preimage = tx_hash.as_bytes().to_vec();
        preimage.extend_from_slice(&3u64.to_le_bytes());
        assert_eq!(utxo_key(&tx_hash, 3), hash(&preimage));
    }

    #[test]
    fn test_utxo_keys_distinct_per_output() {
        let output = TxOutput {
            value: Amount(1),
            lock: Lock::script(vec![crate::opcode::TRUE]),
        };
        let tx = Transaction {
            outputs: vec![output.clone(), output],
            ..Default::default()
        };
        let keys = utxo_keys(&tx);
        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn test_transaction_serde_round_trip() {
        let tx = Transaction {
            inputs: vec![TxInput::new(hash(b"in"), Unlock::new(vec![7]), 1)],
            outputs: vec![],
            payload: vec![1, 2],
            lock_height: Height(3),
        };
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }
}
