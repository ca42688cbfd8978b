//! Instruction decoder for the 6502 disassembler

use crate::addressing::AddressingMode;
use crate::disassembler::InstructionData;
use crate::opcodes::lookup;

/// Decode a single instruction from a byte slice
///
/// The text fields are left empty; [`super::formatter::describe`] fills them.
///
/// # Arguments
///
/// * `bytes` - The byte slice starting at the instruction to decode
/// * `address` - The memory address of this instruction
///
/// # Returns
///
/// `Some(InstructionData)` if the opcode is valid and the slice holds the whole
/// instruction, `None` otherwise
pub fn decode_instruction(bytes: &[u8], address: u16) -> Option<InstructionData> {
    let opcode = *bytes.first()?;
    let metadata = lookup(opcode)?;
    let size = metadata.size_bytes as usize;

    // Check if there are enough bytes for the full instruction
    let raw = bytes.get(..size)?;

    let operand = match metadata.addressing_mode {
        AddressingMode::Implicit | AddressingMode::Accumulator => None,
        AddressingMode::Relative => {
            let offset = raw[1] as i8;
            Some(address.wrapping_add(2).wrapping_add_signed(offset as i16))
        }
        mode if mode.operand_bytes() == 1 => Some(raw[1] as u16),
        _ => Some(u16::from_le_bytes([raw[1], raw[2]])),
    };

    Some(InstructionData {
        address,
        bytes: raw.to_vec(),
        opcode,
        mnemonic: Some(metadata.mnemonic),
        addressing_mode: metadata.addressing_mode,
        operand,
        operand_text: String::new(),
        text: String::new(),
    })
}

/// Builds the one-byte record used for bytes that do not decode.
pub fn data_byte(byte: u8, address: u16) -> InstructionData {
    InstructionData {
        address,
        bytes: vec![byte],
        opcode: byte,
        mnemonic: None,
        addressing_mode: AddressingMode::Implicit,
        operand: Some(byte as u16),
        operand_text: String::new(),
        text: String::new(),
    }
}
