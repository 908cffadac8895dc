//! Authorization predicates attached to outputs, and the data that satisfies them

use crate::ecc::Point;
use crate::hash::{hash_full, HashPart};
use crate::hash_record;
use crate::schnorr::Signature;
use crate::script::ScriptBuilder;
use serde::{Deserialize, Serialize};

/// How the bytes of a [`Lock`] are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LockType {
    /// A public key; unlocked by a signature over the spending transaction
    #[default]
    Key = 0x00,
    /// Hash of a public key; unlocked by a signature and the key
    KeyHash = 0x01,
    /// An opcode stream; unlocked by a push-only script
    Script = 0x02,
    /// Hash of a redeem script; unlocked by a push-only script ending with it
    Redeem = 0x03,
}

impl HashPart for LockType {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        buf.push(*self as u8);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub lock_type: LockType,
    pub bytes: Vec<u8>,
}

hash_record!(Lock { lock_type, bytes });

impl Lock {
    pub fn new(lock_type: LockType, bytes: Vec<u8>) -> Self {
        Self { lock_type, bytes }
    }

    pub fn key(key: &Point) -> Self {
        Self::new(LockType::Key, key.as_bytes().to_vec())
    }

    pub fn key_hash(key: &Point) -> Self {
        Self::new(LockType::KeyHash, hash_full(key).as_bytes().to_vec())
    }

    pub fn script(opcodes: Vec<u8>) -> Self {
        Self::new(LockType::Script, opcodes)
    }

    /// Lock to the hash of `redeem_script`
    pub fn redeem(redeem_script: &[u8]) -> Self {
        Self::new(LockType::Redeem, hash_full(redeem_script).as_bytes().to_vec())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    pub bytes: Vec<u8>,
}

hash_record!(Unlock { bytes });

impl Unlock {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Unlock for [`LockType::Key`]
    pub fn key(signature: &Signature) -> Self {
        Self::new(signature.as_bytes().to_vec())
    }

    /// Unlock for [`LockType::KeyHash`]: the signature followed by the key
    pub fn key_hash(signature: &Signature, key: &Point) -> Self {
        let mut bytes = signature.as_bytes().to_vec();
        bytes.extend_from_slice(key.as_bytes());
        Self::new(bytes)
    }

    /// Unlock for [`LockType::Script`]
    pub fn script(opcodes: Vec<u8>) -> Self {
        Self::new(opcodes)
    }

    /// Unlock for [`LockType::Redeem`]: pushes `args` in order, then the redeem script
    pub fn redeem(args: &[&[u8]], redeem_script: &[u8]) -> Self {
        let builder = args
            .iter()
            .fold(ScriptBuilder::new(), |builder, arg| builder.push_data(arg));
        Self::new(builder.push_data(redeem_script).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::Pair;
    use crate::opcode::OP;

    #[test]
    fn test_key_hash_lock_is_hash_of_key() {
        let key = Pair::random().V;
        let lock = Lock::key_hash(&key);
        assert_eq!(lock.lock_type, LockType::KeyHash);
        assert_eq!(lock.bytes, hash_full(&key).as_bytes().to_vec());
    }

    #[test]
    fn test_key_hash_unlock_layout() {
        let pair = Pair::random();
        let sig = crate::schnorr::sign(&pair, &0u32);
        let unlock = Unlock::key_hash(&sig, &pair.V);
        assert_eq!(unlock.bytes.len(), 96);
        assert_eq!(&unlock.bytes[64..], pair.V.as_bytes());
    }

    #[test]
    fn test_redeem_unlock_ends_with_script() {
        let redeem = vec![OP::True.to_byte()];
        let unlock = Unlock::redeem(&[&[0xAA, 0xBB]], &redeem);
        assert_eq!(unlock.bytes, vec![0x02, 0xAA, 0xBB, 0x01, OP::True.to_byte()]);
    }

    #[test]
    fn test_lock_hash_covers_type() {
        let a = Lock::new(LockType::Script, vec![1]);
        let b = Lock::new(LockType::Key, vec![1]);
        assert_ne!(hash_full(&a), hash_full(&b));
    }
}
