//! Error types for script validation, execution and the crypto primitives

use crate::opcode::OP;
use thiserror::Error;

/// Failure reason of a rejected spend.
///
/// The `Display` text of every variant is a stable diagnostic: two
/// implementations of the engine are expected to reject the same spend with
/// the same message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    // Dispatch
    #[error("Lock cannot be empty")]
    EmptyLock,

    #[error("LockType.Key requires 32-byte key argument in the lock script")]
    KeyLockSize,

    #[error("LockType.Key 32-byte public key in lock script is invalid")]
    KeyLockInvalidKey,

    #[error("LockType.Key requires a 64-byte signature in the unlock script")]
    KeyUnlockSize,

    #[error("LockType.Key signature in unlock script failed validation")]
    KeySignatureFailed,

    #[error("LockType.KeyHash requires a 64-byte key hash argument in the lock script")]
    KeyHashLockSize,

    #[error("LockType.KeyHash requires a 64-byte signature and a 32-byte key in the unlock script")]
    KeyHashUnlockSize,

    #[error("LockType.KeyHash public key in unlock script is invalid")]
    KeyHashInvalidKey,

    #[error("LockType.KeyHash hash of key does not match key hash set in lock script")]
    KeyHashMismatch,

    #[error("LockType.KeyHash signature in unlock script failed validation")]
    KeyHashSignatureFailed,

    #[error("LockType.Redeem requires 64-byte script hash in the lock script")]
    RedeemLockSize,

    #[error("LockType.Redeem requires unlock script to push a redeem script to the stack")]
    RedeemMissingScript,

    #[error("LockType.Redeem unlock script pushed a redeem script which does not match the redeem hash in the lock script")]
    RedeemHashMismatch,

    #[error("Script failed")]
    ScriptFailed,

    // Syntactic validation
    #[error("Script contains an unrecognized opcode")]
    UnrecognizedOpcode,

    #[error("{0} opcode requires {1} byte(s) for the payload size")]
    PushDataMissingSize(OP, usize),

    #[error("{0} opcode payload size is not within StackMaxItemSize limits")]
    PushDataOverItemLimit(OP),

    #[error("{0} opcode payload size is too small, a shorter push opcode must be used")]
    PushDataUnderRange(OP),

    #[error("{0} opcode payload size exceeds total script size")]
    PushDataOverflow(OP),

    #[error("PUSH_BYTES_* opcode exceeds total script size")]
    PushBytesOverflow,

    #[error("Unlock script may only contain stack pushes")]
    UnlockNotPushOnly,

    // Execution
    #[error("Stack overflow while executing {0}")]
    StackOverflow(&'static str),

    #[error("IF/NOT_IF opcode requires an item on the stack")]
    IfNeedsItem,

    #[error("IF/NOT_IF may only be used with OP.TRUE / OP.FALSE values")]
    IfNotBoolean,

    #[error("Cannot have an ELSE without an associated IF / NOT_IF")]
    DanglingElse,

    #[error("Cannot have an END_IF without an associated IF / NOT_IF")]
    DanglingEndIf,

    #[error("IF / NOT_IF requires a closing END_IF")]
    UnclosedIf,

    #[error("DUP opcode requires an item on the stack")]
    DupNeedsItem,

    #[error("HASH opcode requires an item on the stack")]
    HashNeedsItem,

    #[error("{0} opcode requires two items on the stack")]
    NeedsTwoItems(OP),

    #[error("VERIFY_EQUAL operation failed")]
    VerifyEqualFailed,

    #[error("VERIFY_LOCK_HEIGHT opcode requires a lock height on the stack")]
    LockHeightMissing,

    #[error("VERIFY_LOCK_HEIGHT height lock must be an 8-byte number")]
    LockHeightSize,

    #[error("VERIFY_LOCK_HEIGHT height lock of transaction is too low")]
    LockHeightTooLow,

    #[error("VERIFY_UNLOCK_AGE opcode requires an unlock age on the stack")]
    UnlockAgeMissing,

    #[error("VERIFY_UNLOCK_AGE unlock age must be a 4-byte number")]
    UnlockAgeSize,

    #[error("VERIFY_UNLOCK_AGE unlock age of input is too low")]
    UnlockAgeTooLow,

    #[error("{0} opcode requires 32-byte public key on the stack")]
    KeySize(OP),

    #[error("{0} 32-byte public key on the stack is invalid")]
    InvalidKey(OP),

    #[error("{0} opcode requires 64-byte signature on the stack")]
    SignatureSize(OP),

    #[error("{0} signature failed validation")]
    SignatureFailed(OP),

    #[error("{0} opcode requires a key count on the stack")]
    MultiSigKeyCountMissing(OP),

    #[error("{0} opcode requires a 1-byte key count between 1 and {1}")]
    MultiSigKeyCount(OP, u8),

    #[error("{0} opcode requires {1} public keys on the stack")]
    MultiSigNotEnoughKeys(OP, u8),

    #[error("{0} opcode requires a signature count on the stack")]
    MultiSigSigCountMissing(OP),

    #[error("{0} opcode requires a 1-byte signature count between 1 and the key count")]
    MultiSigSigCount(OP),

    #[error("{0} opcode requires {1} signatures on the stack")]
    MultiSigNotEnoughSigs(OP, u8),

    #[error("{0} opcode requires 4 items on the stack")]
    SeqSigNeedsFourItems(OP),

    #[error("{0} opcode requires 8-byte minimum sequence on the stack")]
    SeqSigMinSequenceSize(OP),

    #[error("{0} opcode requires 8-byte sequence on the stack")]
    SeqSigSequenceSize(OP),

    #[error("{0} sequence is not equal to or greater than min_sequence")]
    SeqSigSequenceTooLow(OP),

    #[error("{0} input does not belong to the spending transaction")]
    SeqSigForeignInput(OP),
}

/// Construction errors of the fixed-width crypto values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Point does not decode to a group element")]
    InvalidPoint,
}

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T, E = ScriptError> = std::result::Result<T, E>;
