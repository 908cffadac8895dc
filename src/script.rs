//! Syntactic validation and construction of opcode streams

use crate::error::{Result, ScriptError};
use crate::opcode::{OP, PUSH_BYTES_75};

/// Role of a script, which decides the rules it is validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    Lock,
    Unlock,
    Redeem,
}

/// An opcode stream that passed [`validate_script`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    script_type: ScriptType,
    bytes: Vec<u8>,
}

impl Script {
    pub fn script_type(&self) -> ScriptType {
        self.script_type
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Smallest payload a `PUSH_DATA_*` opcode may carry; anything shorter
/// belongs to the next smaller push form
pub(crate) fn push_data_min_size(op: OP) -> usize {
    match op {
        OP::PushData1 => PUSH_BYTES_75 as usize + 1,
        OP::PushData2 => u8::MAX as usize + 1,
        _ => unreachable!("{} is not a PUSH_DATA opcode", op),
    }
}

/// Width of the little-endian length prefix of a `PUSH_DATA_*` opcode
pub(crate) fn push_data_width(op: OP) -> usize {
    match op {
        OP::PushData1 => 1,
        OP::PushData2 => 2,
        _ => unreachable!("{} is not a PUSH_DATA opcode", op),
    }
}

/// Walk `bytes` once and check it is well-formed for `script_type`.
///
/// Every opcode must be known and every push must be complete. `PUSH_DATA_*`
/// sizes must lie in their own range and within `max_item_size`. An unlock
/// script whose last opcode is not a push is rejected.
pub fn validate_script(
    script_type: ScriptType,
    bytes: &[u8],
    max_item_size: usize,
) -> Result<Script> {
    let mut cursor = 0;
    let mut last_opcode = None;

    while cursor < bytes.len() {
        let opcode = OP::from_byte(bytes[cursor]).ok_or(ScriptError::UnrecognizedOpcode)?;
        cursor += 1;
        last_opcode = Some(opcode);

        match opcode {
            OP::PushData1 | OP::PushData2 => {
                let width = push_data_width(opcode);
                if bytes.len() - cursor < width {
                    return Err(ScriptError::PushDataMissingSize(opcode, width));
                }
                let size = read_le(&bytes[cursor..cursor + width]);
                cursor += width;

                if size < push_data_min_size(opcode) {
                    return Err(ScriptError::PushDataUnderRange(opcode));
                }
                if size > max_item_size {
                    return Err(ScriptError::PushDataOverItemLimit(opcode));
                }
                if bytes.len() - cursor < size {
                    return Err(ScriptError::PushDataOverflow(opcode));
                }
                cursor += size;
            }
            OP::PushBytes(size) => {
                if bytes.len() - cursor < size as usize {
                    return Err(ScriptError::PushBytesOverflow);
                }
                cursor += size as usize;
            }
            _ => {}
        }
    }

    if script_type == ScriptType::Unlock {
        if let Some(opcode) = last_opcode {
            if !opcode.is_payload() {
                return Err(ScriptError::UnlockNotPushOnly);
            }
        }
    }

    Ok(Script {
        script_type,
        bytes: bytes.to_vec(),
    })
}

/// Little-endian unsigned integer of up to 8 bytes
pub(crate) fn read_le(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .rev()
        .fold(0usize, |acc, &byte| (acc << 8) | byte as usize)
}

/// Builder for opcode streams
///
/// ```
/// use script_engine::opcode::OP;
/// use script_engine::script::{validate_script, ScriptBuilder, ScriptType};
///
/// let script = ScriptBuilder::new()
///     .push_data(&[1, 2, 3])
///     .op(OP::Hash)
///     .build();
/// assert!(validate_script(ScriptType::Lock, &script, 512).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, op: OP) -> Self {
        self.bytes.push(op.to_byte());
        self
    }

    /// Push `data` with the shortest push form for its size
    ///
    /// # Panics
    ///
    /// If `data` is empty or longer than `u16::MAX` bytes.
    pub fn push_data(mut self, data: &[u8]) -> Self {
        assert!(!data.is_empty(), "cannot push an empty item");
        match data.len() {
            len if len <= PUSH_BYTES_75 as usize => {
                self.bytes.push(len as u8);
            }
            len if len <= u8::MAX as usize => {
                self.bytes.push(OP::PushData1.to_byte());
                self.bytes.push(len as u8);
            }
            len if len <= u16::MAX as usize => {
                self.bytes.push(OP::PushData2.to_byte());
                self.bytes.extend_from_slice(&(len as u16).to_le_bytes());
            }
            len => panic!("cannot push {} bytes in a single item", len),
        }
        self.bytes.extend_from_slice(data);
        self
    }

    /// Push a literal 1..=5
    pub fn push_num(self, num: u8) -> Self {
        self.op(OP::PushNum(num))
    }

    /// Push `TRUE` or `FALSE`
    pub fn push_bool(self, value: bool) -> Self {
        self.op(if value { OP::True } else { OP::False })
    }

    pub fn push_u32(self, value: u32) -> Self {
        self.push_data(&value.to_le_bytes())
    }

    pub fn push_u64(self, value: u64) -> Self {
        self.push_data(&value.to_le_bytes())
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{PUSH_DATA_1, PUSH_DATA_2};

    const MAX_ITEM: usize = 512;

    #[test]
    fn test_empty_script_valid() {
        assert!(validate_script(ScriptType::Lock, &[], MAX_ITEM).is_ok());
        assert!(validate_script(ScriptType::Unlock, &[], MAX_ITEM).is_ok());
    }

    #[test]
    fn test_unrecognized_opcode() {
        assert_eq!(
            validate_script(ScriptType::Lock, &[0xFF], MAX_ITEM),
            Err(ScriptError::UnrecognizedOpcode)
        );
    }

    #[test]
    fn test_push_bytes_overflow() {
        assert_eq!(
            validate_script(ScriptType::Lock, &[0x02, 0xAA], MAX_ITEM),
            Err(ScriptError::PushBytesOverflow)
        );
        assert!(validate_script(ScriptType::Lock, &[0x02, 0xAA, 0xBB], MAX_ITEM).is_ok());
    }

    #[test]
    fn test_push_data_1_rules() {
        assert_eq!(
            validate_script(ScriptType::Lock, &[PUSH_DATA_1], MAX_ITEM),
            Err(ScriptError::PushDataMissingSize(OP::PushData1, 1))
        );
        // 75 bytes must use PUSH_BYTES_75
        let mut script = vec![PUSH_DATA_1, 75];
        script.extend_from_slice(&[0; 75]);
        assert_eq!(
            validate_script(ScriptType::Lock, &script, MAX_ITEM),
            Err(ScriptError::PushDataUnderRange(OP::PushData1))
        );

        let mut script = vec![PUSH_DATA_1, 76];
        script.extend_from_slice(&[0; 75]);
        assert_eq!(
            validate_script(ScriptType::Lock, &script, MAX_ITEM),
            Err(ScriptError::PushDataOverflow(OP::PushData1))
        );
        script.push(0);
        assert!(validate_script(ScriptType::Lock, &script, MAX_ITEM).is_ok());
        assert_eq!(
            validate_script(ScriptType::Lock, &script, 75),
            Err(ScriptError::PushDataOverItemLimit(OP::PushData1))
        );
    }

    #[test]
    fn test_push_data_2_rules() {
        assert_eq!(
            validate_script(ScriptType::Lock, &[PUSH_DATA_2, 0x00], MAX_ITEM),
            Err(ScriptError::PushDataMissingSize(OP::PushData2, 2))
        );
        assert_eq!(
            validate_script(ScriptType::Lock, &[PUSH_DATA_2, 0xFF, 0x00], MAX_ITEM),
            Err(ScriptError::PushDataUnderRange(OP::PushData2))
        );
        assert_eq!(
            validate_script(ScriptType::Lock, &[PUSH_DATA_2, 0x01, 0x02], MAX_ITEM),
            Err(ScriptError::PushDataOverItemLimit(OP::PushData2))
        );
        let mut script = vec![PUSH_DATA_2, 0x00, 0x01];
        script.extend_from_slice(&[7; 256]);
        assert!(validate_script(ScriptType::Lock, &script, MAX_ITEM).is_ok());
    }

    #[test]
    fn test_unlock_must_end_with_push() {
        let script = ScriptBuilder::new().push_num(1).op(OP::Dup).build();
        assert_eq!(
            validate_script(ScriptType::Unlock, &script, MAX_ITEM),
            Err(ScriptError::UnlockNotPushOnly)
        );
        assert!(validate_script(ScriptType::Lock, &script, MAX_ITEM).is_ok());
        assert!(validate_script(ScriptType::Redeem, &script, MAX_ITEM).is_ok());
    }

    #[test]
    fn test_builder_picks_push_form() {
        assert_eq!(ScriptBuilder::new().push_data(&[9]).build(), vec![0x01, 9]);
        let script = ScriptBuilder::new().push_data(&[0; 76]).build();
        assert_eq!(&script[..2], &[PUSH_DATA_1, 76]);
        let script = ScriptBuilder::new().push_data(&[0; 300]).build();
        assert_eq!(&script[..3], &[PUSH_DATA_2, 0x2C, 0x01]);
    }

    #[test]
    fn test_builder_output_validates() {
        let script = ScriptBuilder::new()
            .push_data(&[1; 75])
            .push_data(&[2; 200])
            .push_data(&[3; 400])
            .push_u32(10)
            .push_u64(20)
            .push_num(5)
            .push_bool(true)
            .op(OP::If)
            .op(OP::Dup)
            .op(OP::Else)
            .op(OP::Hash)
            .op(OP::EndIf)
            .build();
        let validated = validate_script(ScriptType::Lock, &script, MAX_ITEM).unwrap();
        assert_eq!(validated.as_bytes(), &script[..]);
        assert_eq!(validated.script_type(), ScriptType::Lock);
    }

    #[test]
    fn test_read_le() {
        assert_eq!(read_le(&[0x2C, 0x01]), 300);
        assert_eq!(read_le(&[0xFF]), 255);
    }
}
