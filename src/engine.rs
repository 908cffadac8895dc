//! Spend authorization: lock dispatch and the script interpreter
//!
//! `execute` decides whether `unlock` satisfies `lock` for one input of a
//! spending transaction. Key and KeyHash locks are checked directly against a
//! Schnorr signature over the transaction. Script and Redeem locks run the
//! unlock script to seed a [`Stack`] and then run the lock (or redeem) script
//! on it; the spend is authorized iff exactly `TRUE` is left on the stack.
//!
//! Failures caused by the data are returned as [`ScriptError`]. Conditions
//! that [`validate_script`] rules out are bugs and panic.

use crate::config::EngineConfig;
use crate::constants::{HASH_SIZE, POINT_SIZE, SIGNATURE_SIZE};
use crate::ecc::Point;
use crate::error::{ConfigError, Result, ScriptError};
use crate::hash::{hash_full, Hash};
use crate::lock::{Lock, LockType, Unlock};
use crate::opcode::{FALSE_VALUE, OP, TRUE_VALUE};
use crate::schnorr::{self, Signature};
use crate::scope::ScopeCondition;
use crate::script::{push_data_width, read_le, validate_script, Script, ScriptType};
use crate::stack::Stack;
use crate::types::{utxo_key, Height, Transaction, TxInput};
use tracing::{debug, trace};

/// Stateless script engine bound to one set of consensus limits
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Engine with the given stack limits and the default multi-sig limit
    ///
    /// # Panics
    ///
    /// If `max_item_size` is zero or larger than `max_total_size`.
    pub fn new(max_total_size: usize, max_item_size: usize) -> Self {
        assert!(max_item_size > 0, "max_item_size must be non-zero");
        assert!(
            max_total_size >= max_item_size,
            "max_total_size must be at least max_item_size"
        );
        Self {
            config: EngineConfig {
                max_stack_total_size: max_total_size,
                max_stack_item_size: max_item_size,
                ..EngineConfig::default()
            },
        }
    }

    pub fn from_config(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check that `unlock` satisfies `lock` for `input` of `tx`
    pub fn execute(
        &self,
        lock: &Lock,
        unlock: &Unlock,
        tx: &Transaction,
        input: &TxInput,
    ) -> Result<()> {
        let result = self.dispatch(lock, unlock, tx, input);
        if let Err(ref reason) = result {
            debug!(lock_type = ?lock.lock_type, utxo = %input.utxo, %reason, "spend rejected");
        }
        result
    }

    fn dispatch(
        &self,
        lock: &Lock,
        unlock: &Unlock,
        tx: &Transaction,
        input: &TxInput,
    ) -> Result<()> {
        if lock.bytes.is_empty() {
            return Err(ScriptError::EmptyLock);
        }

        match lock.lock_type {
            LockType::Key | LockType::KeyHash => self.handle_basic_payment(lock, unlock, tx),
            LockType::Script => self.handle_script_payment(lock, unlock, tx, input),
            LockType::Redeem => self.handle_redeem_payment(lock, unlock, tx, input),
        }
    }

    /// Key / KeyHash: signature over the whole transaction, no script involved
    fn handle_basic_payment(&self, lock: &Lock, unlock: &Unlock, tx: &Transaction) -> Result<()> {
        match lock.lock_type {
            LockType::Key => {
                let key = Point::from_bytes_le(&lock.bytes).map_err(|_| ScriptError::KeyLockSize)?;
                if !key.is_valid() {
                    return Err(ScriptError::KeyLockInvalidKey);
                }
                let sig = Signature::from_bytes(&unlock.bytes)
                    .map_err(|_| ScriptError::KeyUnlockSize)?;
                if !schnorr::verify(&key, &sig, tx) {
                    return Err(ScriptError::KeySignatureFailed);
                }
                Ok(())
            }
            LockType::KeyHash => {
                let key_hash = Hash::from_bytes(&lock.bytes)
                    .map_err(|_| ScriptError::KeyHashLockSize)?;
                if unlock.bytes.len() != SIGNATURE_SIZE + POINT_SIZE {
                    return Err(ScriptError::KeyHashUnlockSize);
                }
                let (sig_bytes, key_bytes) = unlock.bytes.split_at(SIGNATURE_SIZE);
                let sig = Signature::from_bytes(sig_bytes)
                    .map_err(|_| ScriptError::KeyHashUnlockSize)?;
                let key = Point::from_bytes_le(key_bytes)
                    .map_err(|_| ScriptError::KeyHashUnlockSize)?;
                if !key.is_valid() {
                    return Err(ScriptError::KeyHashInvalidKey);
                }
                if hash_full(&key) != key_hash {
                    return Err(ScriptError::KeyHashMismatch);
                }
                if !schnorr::verify(&key, &sig, tx) {
                    return Err(ScriptError::KeyHashSignatureFailed);
                }
                Ok(())
            }
            LockType::Script | LockType::Redeem => {
                unreachable!("handle_basic_payment called with {:?}", lock.lock_type)
            }
        }
    }

    fn handle_script_payment(
        &self,
        lock: &Lock,
        unlock: &Unlock,
        tx: &Transaction,
        input: &TxInput,
    ) -> Result<()> {
        let max_item = self.config.max_stack_item_size;
        let lock_script = validate_script(ScriptType::Lock, &lock.bytes, max_item)?;
        let unlock_script = validate_script(ScriptType::Unlock, &unlock.bytes, max_item)?;

        let mut stack = self.new_stack();
        self.execute_script(&unlock_script, &mut stack, tx, input)?;
        self.execute_script(&lock_script, &mut stack, tx, input)?;

        if Self::has_script_failed(&stack) {
            return Err(ScriptError::ScriptFailed);
        }
        Ok(())
    }

    fn handle_redeem_payment(
        &self,
        lock: &Lock,
        unlock: &Unlock,
        tx: &Transaction,
        input: &TxInput,
    ) -> Result<()> {
        if lock.bytes.len() != HASH_SIZE {
            return Err(ScriptError::RedeemLockSize);
        }
        let script_hash = Hash::from_bytes(&lock.bytes).map_err(|_| ScriptError::RedeemLockSize)?;

        let max_item = self.config.max_stack_item_size;
        let unlock_script = validate_script(ScriptType::Unlock, &unlock.bytes, max_item)?;

        let mut stack = self.new_stack();
        self.execute_script(&unlock_script, &mut stack, tx, input)?;

        if stack.is_empty() {
            return Err(ScriptError::RedeemMissingScript);
        }
        let redeem_bytes = stack.pop();
        if hash_full(&redeem_bytes) != script_hash {
            return Err(ScriptError::RedeemHashMismatch);
        }

        let redeem_script = validate_script(ScriptType::Redeem, &redeem_bytes, max_item)?;
        self.execute_script(&redeem_script, &mut stack, tx, input)?;

        if Self::has_script_failed(&stack) {
            return Err(ScriptError::ScriptFailed);
        }
        Ok(())
    }

    fn new_stack(&self) -> Stack {
        Stack::new(self.config.max_stack_total_size, self.config.max_stack_item_size)
    }

    fn has_script_failed(stack: &Stack) -> bool {
        stack.len() != 1 || stack.peek() != TRUE_VALUE
    }

    /// Run one validated script against `stack`.
    ///
    /// Conditional opcodes always update the scope state. Every other opcode
    /// consumes its payload even when skipped, so the cursor stays aligned,
    /// and only executes while all enclosing scopes are true.
    fn execute_script(
        &self,
        script: &Script,
        stack: &mut Stack,
        tx: &Transaction,
        input: &TxInput,
    ) -> Result<()> {
        let bytes = script.as_bytes();
        let mut sc = ScopeCondition::new();
        let mut cursor = 0;

        while cursor < bytes.len() {
            let opcode = match OP::from_byte(bytes[cursor]) {
                Some(opcode) => opcode,
                None => unreachable!("unknown opcode {:#04x} in a validated script", bytes[cursor]),
            };
            cursor += 1;

            if opcode.is_conditional() {
                match opcode {
                    OP::If | OP::NotIf => {
                        // nested in a false scope: the condition is never consumed
                        if !sc.is_true() {
                            sc.push(false);
                            continue;
                        }
                        if stack.is_empty() {
                            return Err(ScriptError::IfNeedsItem);
                        }
                        let top = stack.pop();
                        let cond = if top == TRUE_VALUE {
                            true
                        } else if top == FALSE_VALUE {
                            false
                        } else {
                            return Err(ScriptError::IfNotBoolean);
                        };
                        sc.push(cond == (opcode == OP::If));
                    }
                    OP::Else => {
                        if sc.is_empty() {
                            return Err(ScriptError::DanglingElse);
                        }
                        sc.try_toggle();
                    }
                    OP::EndIf => {
                        if sc.is_empty() {
                            return Err(ScriptError::DanglingEndIf);
                        }
                        sc.pop();
                    }
                    _ => unreachable!(),
                }
                continue;
            }

            let payload: &[u8] = match opcode {
                OP::PushBytes(size) => read_payload(bytes, &mut cursor, size as usize),
                OP::PushData1 | OP::PushData2 => {
                    let width = push_data_width(opcode);
                    assert!(
                        bytes.len() - cursor >= width,
                        "truncated {} in a validated script",
                        opcode
                    );
                    let size = read_le(&bytes[cursor..cursor + width]);
                    cursor += width;
                    read_payload(bytes, &mut cursor, size)
                }
                _ => &[],
            };

            if !sc.is_true() {
                continue;
            }
            trace!(%opcode, items = stack.len(), "executing opcode");

            match opcode {
                OP::False => push_item(stack, FALSE_VALUE.to_vec(), opcode)?,
                OP::True => push_item(stack, TRUE_VALUE.to_vec(), opcode)?,
                OP::PushBytes(_) | OP::PushData1 | OP::PushData2 => {
                    push_item(stack, payload.to_vec(), opcode)?
                }
                OP::PushNum(num) => push_item(stack, vec![num], opcode)?,
                OP::Dup => {
                    if stack.is_empty() {
                        return Err(ScriptError::DupNeedsItem);
                    }
                    let top = stack.peek().to_vec();
                    push_item(stack, top, opcode)?;
                }
                OP::Hash => {
                    if stack.is_empty() {
                        return Err(ScriptError::HashNeedsItem);
                    }
                    let top = stack.pop();
                    let digest = hash_full(&top);
                    push_item(stack, digest.as_bytes().to_vec(), opcode)?;
                }
                OP::CheckEqual => {
                    if stack.len() < 2 {
                        return Err(ScriptError::NeedsTwoItems(opcode));
                    }
                    let a = stack.pop();
                    let b = stack.pop();
                    push_bool(stack, a == b, opcode)?;
                }
                OP::VerifyEqual => {
                    if stack.len() < 2 {
                        return Err(ScriptError::NeedsTwoItems(opcode));
                    }
                    if stack.pop() != stack.pop() {
                        return Err(ScriptError::VerifyEqualFailed);
                    }
                }
                OP::VerifyLockHeight => {
                    if stack.is_empty() {
                        return Err(ScriptError::LockHeightMissing);
                    }
                    let height_bytes = stack.pop();
                    let height: [u8; 8] = height_bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| ScriptError::LockHeightSize)?;
                    if Height(u64::from_le_bytes(height)) > tx.lock_height {
                        return Err(ScriptError::LockHeightTooLow);
                    }
                }
                OP::VerifyUnlockAge => {
                    if stack.is_empty() {
                        return Err(ScriptError::UnlockAgeMissing);
                    }
                    let age_bytes = stack.pop();
                    let age: [u8; 4] = age_bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| ScriptError::UnlockAgeSize)?;
                    if u32::from_le_bytes(age) > input.unlock_age {
                        return Err(ScriptError::UnlockAgeTooLow);
                    }
                }
                OP::CheckSig => {
                    let valid = self.verify_signature(opcode, stack, tx)?;
                    push_bool(stack, valid, opcode)?;
                }
                OP::VerifySig => {
                    if !self.verify_signature(opcode, stack, tx)? {
                        return Err(ScriptError::SignatureFailed(opcode));
                    }
                }
                OP::CheckMultiSig => {
                    let valid = self.verify_multi_sig(opcode, stack, tx)?;
                    push_bool(stack, valid, opcode)?;
                }
                OP::VerifyMultiSig => {
                    if !self.verify_multi_sig(opcode, stack, tx)? {
                        return Err(ScriptError::SignatureFailed(opcode));
                    }
                }
                OP::CheckSeqSig => {
                    let valid = self.verify_sequence_signature(opcode, stack, tx, input)?;
                    push_bool(stack, valid, opcode)?;
                }
                OP::VerifySeqSig => {
                    if !self.verify_sequence_signature(opcode, stack, tx, input)? {
                        return Err(ScriptError::SignatureFailed(opcode));
                    }
                }
                OP::If | OP::NotIf | OP::Else | OP::EndIf => unreachable!(),
            }
        }

        if !sc.is_empty() {
            return Err(ScriptError::UnclosedIf);
        }
        Ok(())
    }

    /// Pop `<key> <signature>` and check the signature over `tx`
    fn verify_signature(&self, op: OP, stack: &mut Stack, tx: &Transaction) -> Result<bool> {
        if stack.len() < 2 {
            return Err(ScriptError::NeedsTwoItems(op));
        }
        let key = pop_key(op, stack)?;
        let sig = pop_signature(op, stack)?;
        Ok(schnorr::verify(&key, &sig, tx))
    }

    /// Pop `<k> <key_1> .. <key_k> <r> <sig_1> .. <sig_r>` (top to bottom) and
    /// match the signatures against the keys.
    ///
    /// Matching is a single greedy walk: a signature that verifies against the
    /// current key is consumed, and the walk moves to the next key either way.
    /// Signatures must therefore appear in the same relative order as the keys
    /// they belong to.
    fn verify_multi_sig(&self, op: OP, stack: &mut Stack, tx: &Transaction) -> Result<bool> {
        let max_keys = self.config.max_multi_sig_keys;

        if stack.is_empty() {
            return Err(ScriptError::MultiSigKeyCountMissing(op));
        }
        let key_count = match stack.pop().as_slice() {
            &[count] if (1..=max_keys).contains(&count) => count,
            _ => return Err(ScriptError::MultiSigKeyCount(op, max_keys)),
        };
        if stack.len() < key_count as usize {
            return Err(ScriptError::MultiSigNotEnoughKeys(op, key_count));
        }
        let keys = (0..key_count)
            .map(|_| pop_key(op, stack))
            .collect::<Result<Vec<_>>>()?;

        if stack.is_empty() {
            return Err(ScriptError::MultiSigSigCountMissing(op));
        }
        let sig_count = match stack.pop().as_slice() {
            &[count] if (1..=key_count).contains(&count) => count,
            _ => return Err(ScriptError::MultiSigSigCount(op)),
        };
        if stack.len() < sig_count as usize {
            return Err(ScriptError::MultiSigNotEnoughSigs(op, sig_count));
        }
        let sigs = (0..sig_count)
            .map(|_| pop_signature(op, stack))
            .collect::<Result<Vec<_>>>()?;

        let mut matched = 0;
        for (key_idx, key) in keys.iter().enumerate() {
            if matched == sigs.len() || keys.len() - key_idx < sigs.len() - matched {
                break;
            }
            if schnorr::verify(key, &sigs[matched], tx) {
                matched += 1;
            }
        }
        Ok(matched == sigs.len())
    }

    /// Pop `<min_sequence> <key> <new_sequence> <signature>` (top to bottom)
    /// and check the signature over [`sequence_challenge`].
    fn verify_sequence_signature(
        &self,
        op: OP,
        stack: &mut Stack,
        tx: &Transaction,
        input: &TxInput,
    ) -> Result<bool> {
        if stack.len() < 4 {
            return Err(ScriptError::SeqSigNeedsFourItems(op));
        }
        let min_sequence = pop_u64(stack).ok_or(ScriptError::SeqSigMinSequenceSize(op))?;
        let key = pop_key(op, stack)?;
        let sequence = pop_u64(stack).ok_or(ScriptError::SeqSigSequenceSize(op))?;
        if sequence < min_sequence {
            return Err(ScriptError::SeqSigSequenceTooLow(op));
        }
        let sig = pop_signature(op, stack)?;

        let challenge =
            sequence_challenge(tx, input, sequence).ok_or(ScriptError::SeqSigForeignInput(op))?;
        Ok(schnorr::verify(&key, &sig, &challenge))
    }
}

/// Message signed by a sequence signature.
///
/// The input being spent is blanked (zero UTXO, empty unlock) before the
/// transaction is hashed, so the signature does not bind to the output it
/// spends. The blanked input keeps its `unlock_age`: a signature only floats
/// to inputs that carry the same relative lock. The blanked hash is combined
/// with `sequence` the same way a UTXO key combines a transaction hash with an
/// output index.
///
/// Returns `None` if `input` is not one of the inputs of `tx`.
pub fn sequence_challenge(tx: &Transaction, input: &TxInput, sequence: u64) -> Option<Hash> {
    let input_hash = hash_full(input);
    let idx = tx.inputs.iter().position(|i| hash_full(i) == input_hash)?;

    let mut blank = tx.clone();
    blank.inputs[idx] = TxInput {
        utxo: Hash::ZERO,
        unlock: Unlock::default(),
        unlock_age: input.unlock_age,
    };
    Some(utxo_key(&hash_full(&blank), sequence))
}

fn read_payload<'a>(bytes: &'a [u8], cursor: &mut usize, size: usize) -> &'a [u8] {
    assert!(bytes.len() - *cursor >= size, "push past the end of a validated script");
    let payload = &bytes[*cursor..*cursor + size];
    *cursor += size;
    payload
}

fn push_item(stack: &mut Stack, item: Vec<u8>, op: OP) -> Result<()> {
    if !stack.can_push(&item) {
        return Err(ScriptError::StackOverflow(op.name()));
    }
    stack.push(item);
    Ok(())
}

fn push_bool(stack: &mut Stack, value: bool, op: OP) -> Result<()> {
    let item = if value { TRUE_VALUE } else { FALSE_VALUE };
    push_item(stack, item.to_vec(), op)
}

fn pop_key(op: OP, stack: &mut Stack) -> Result<Point> {
    let key = Point::from_bytes_le(&stack.pop()).map_err(|_| ScriptError::KeySize(op))?;
    if !key.is_valid() {
        return Err(ScriptError::InvalidKey(op));
    }
    Ok(key)
}

fn pop_signature(op: OP, stack: &mut Stack) -> Result<Signature> {
    Signature::from_bytes(&stack.pop()).map_err(|_| ScriptError::SignatureSize(op))
}

fn pop_u64(stack: &mut Stack) -> Option<u64> {
    let bytes: [u8; 8] = stack.pop().as_slice().try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
