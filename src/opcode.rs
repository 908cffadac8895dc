//! Opcode vocabulary of the script engine
//!
//! Small data pushes (1..=75 bytes) are encoded in the opcode value itself.
//! Larger payloads use `PUSH_DATA_1` / `PUSH_DATA_2` with an explicit
//! little-endian length prefix. The three forms cover disjoint size ranges.

use std::fmt;

/// Raw value of the `FALSE` opcode
pub const FALSE: u8 = 0x00;
/// Raw value of the largest self-describing push
pub const PUSH_BYTES_75: u8 = 0x4B;
pub const PUSH_DATA_1: u8 = 0x4C;
pub const PUSH_DATA_2: u8 = 0x4D;
pub const PUSH_NUM_1: u8 = 0x4E;
pub const PUSH_NUM_5: u8 = 0x52;
/// Raw value of the `TRUE` opcode, the highest payload opcode
pub const TRUE: u8 = 0x53;

/// Stack value pushed by `TRUE`, and the only value a passing script may leave
pub const TRUE_VALUE: [u8; 1] = [TRUE];
/// Stack value pushed by `FALSE`
pub const FALSE_VALUE: [u8; 1] = [FALSE];

/// Decoded opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OP {
    False,
    /// Push of 1..=75 bytes, the value is the payload length
    PushBytes(u8),
    PushData1,
    PushData2,
    /// Push of a literal 1..=5
    PushNum(u8),
    True,
    If,
    NotIf,
    Else,
    EndIf,
    Dup,
    Hash,
    CheckEqual,
    VerifyEqual,
    VerifyLockHeight,
    VerifyUnlockAge,
    CheckSig,
    VerifySig,
    CheckMultiSig,
    VerifyMultiSig,
    CheckSeqSig,
    VerifySeqSig,
}

impl OP {
    /// Decode a raw opcode, `None` for unknown values
    pub fn from_byte(byte: u8) -> Option<OP> {
        let op = match byte {
            FALSE => OP::False,
            0x01..=PUSH_BYTES_75 => OP::PushBytes(byte),
            PUSH_DATA_1 => OP::PushData1,
            PUSH_DATA_2 => OP::PushData2,
            PUSH_NUM_1..=PUSH_NUM_5 => OP::PushNum(byte - PUSH_NUM_1 + 1),
            TRUE => OP::True,
            0x54 => OP::If,
            0x55 => OP::NotIf,
            0x56 => OP::Else,
            0x57 => OP::EndIf,
            0x58 => OP::Dup,
            0x59 => OP::Hash,
            0x5A => OP::CheckEqual,
            0x5B => OP::VerifyEqual,
            0x5C => OP::VerifyLockHeight,
            0x5D => OP::VerifyUnlockAge,
            0x5E => OP::CheckSig,
            0x5F => OP::VerifySig,
            0x60 => OP::CheckMultiSig,
            0x61 => OP::VerifyMultiSig,
            0x62 => OP::CheckSeqSig,
            0x63 => OP::VerifySeqSig,
            _ => return None,
        };
        Some(op)
    }

    /// Encode back to the raw opcode value
    ///
    /// # Panics
    ///
    /// If a `PushBytes` / `PushNum` carries a value outside its range.
    pub fn to_byte(self) -> u8 {
        match self {
            OP::False => FALSE,
            OP::PushBytes(len) => {
                assert!((1..=PUSH_BYTES_75).contains(&len), "PUSH_BYTES length out of range");
                len
            }
            OP::PushData1 => PUSH_DATA_1,
            OP::PushData2 => PUSH_DATA_2,
            OP::PushNum(num) => {
                assert!((1..=5).contains(&num), "PUSH_NUM value out of range");
                PUSH_NUM_1 + num - 1
            }
            OP::True => TRUE,
            OP::If => 0x54,
            OP::NotIf => 0x55,
            OP::Else => 0x56,
            OP::EndIf => 0x57,
            OP::Dup => 0x58,
            OP::Hash => 0x59,
            OP::CheckEqual => 0x5A,
            OP::VerifyEqual => 0x5B,
            OP::VerifyLockHeight => 0x5C,
            OP::VerifyUnlockAge => 0x5D,
            OP::CheckSig => 0x5E,
            OP::VerifySig => 0x5F,
            OP::CheckMultiSig => 0x60,
            OP::VerifyMultiSig => 0x61,
            OP::CheckSeqSig => 0x62,
            OP::VerifySeqSig => 0x63,
        }
    }

    /// `IF`, `NOT_IF`, `ELSE` and `END_IF` update scope state even while skipped
    pub fn is_conditional(self) -> bool {
        matches!(self, OP::If | OP::NotIf | OP::Else | OP::EndIf)
    }

    /// Opcodes which only push to the stack
    pub fn is_payload(self) -> bool {
        self.to_byte() <= TRUE
    }

    /// Canonical name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            OP::False => "FALSE",
            OP::PushBytes(_) => "PUSH_BYTES_*",
            OP::PushData1 => "PUSH_DATA_1",
            OP::PushData2 => "PUSH_DATA_2",
            OP::PushNum(_) => "PUSH_NUM_*",
            OP::True => "TRUE",
            OP::If => "IF",
            OP::NotIf => "NOT_IF",
            OP::Else => "ELSE",
            OP::EndIf => "END_IF",
            OP::Dup => "DUP",
            OP::Hash => "HASH",
            OP::CheckEqual => "CHECK_EQUAL",
            OP::VerifyEqual => "VERIFY_EQUAL",
            OP::VerifyLockHeight => "VERIFY_LOCK_HEIGHT",
            OP::VerifyUnlockAge => "VERIFY_UNLOCK_AGE",
            OP::CheckSig => "CHECK_SIG",
            OP::VerifySig => "VERIFY_SIG",
            OP::CheckMultiSig => "CHECK_MULTI_SIG",
            OP::VerifyMultiSig => "VERIFY_MULTI_SIG",
            OP::CheckSeqSig => "CHECK_SEQ_SIG",
            OP::VerifySeqSig => "VERIFY_SEQ_SIG",
        }
    }
}

impl fmt::Display for OP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_round_trip() {
        for byte in 0..=u8::MAX {
            if let Some(op) = OP::from_byte(byte) {
                assert_eq!(op.to_byte(), byte);
            }
        }
    }

    #[test]
    fn test_unknown_opcodes() {
        assert!(OP::from_byte(0x64).is_none());
        assert!(OP::from_byte(0xFF).is_none());
    }

    #[test]
    fn test_push_bytes_range() {
        assert_eq!(OP::from_byte(0x01), Some(OP::PushBytes(1)));
        assert_eq!(OP::from_byte(PUSH_BYTES_75), Some(OP::PushBytes(75)));
        assert_eq!(OP::from_byte(PUSH_NUM_1), Some(OP::PushNum(1)));
        assert_eq!(OP::from_byte(PUSH_NUM_5), Some(OP::PushNum(5)));
    }

    #[test]
    fn test_is_payload() {
        assert!(OP::False.is_payload());
        assert!(OP::PushBytes(40).is_payload());
        assert!(OP::PushData2.is_payload());
        assert!(OP::PushNum(3).is_payload());
        assert!(OP::True.is_payload());
        assert!(!OP::If.is_payload());
        assert!(!OP::CheckSig.is_payload());
    }

    #[test]
    fn test_is_conditional() {
        assert!(OP::If.is_conditional());
        assert!(OP::NotIf.is_conditional());
        assert!(OP::Else.is_conditional());
        assert!(OP::EndIf.is_conditional());
        assert!(!OP::Dup.is_conditional());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(OP::CheckMultiSig.to_string(), "CHECK_MULTI_SIG");
        assert_eq!(OP::PushBytes(12).to_string(), "PUSH_BYTES_*");
    }
}
