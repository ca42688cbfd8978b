//! Formatting functions for disassembled instructions and memory dumps

use crate::addressing::AddressingMode;
use crate::assembler::symbol_table::SymbolTable;
use crate::disassembler::InstructionData;
use crate::MemoryBus;
use std::fmt::Write;

/// Bytes shown per hex dump row.
pub const BYTES_PER_ROW: usize = 16;

/// Fills in `operand_text` and `text` for a decoded record.
pub fn describe(instr: &mut InstructionData, symbols: Option<&SymbolTable>) {
    instr.operand_text = format_operand(instr, symbols);
    instr.text = format_instruction(instr);
}

/// Format a single instruction as assembly text
///
/// # Arguments
///
/// * `instr` - The instruction to format
///
/// # Returns
///
/// A string containing the formatted assembly instruction
pub fn format_instruction(instr: &InstructionData) -> String {
    let operand = if instr.operand_text.is_empty() {
        format_operand(instr, None)
    } else {
        instr.operand_text.clone()
    };

    if operand.is_empty() {
        instr.mnemonic_text().to_string()
    } else {
        format!("{} {}", instr.mnemonic_text(), operand)
    }
}

/// Format the operand based on addressing mode
fn format_operand(instr: &InstructionData, symbols: Option<&SymbolTable>) -> String {
    use AddressingMode::*;

    // Undecodable bytes are shown as data
    if instr.is_data() {
        return format!("${:02X}", instr.opcode);
    }

    let Some(value) = instr.operand else {
        return match instr.addressing_mode {
            Accumulator => "A".to_string(),
            _ => String::new(),
        };
    };

    let label = symbols.and_then(|s| s.label_at(value));
    let word = |suffix: &str| match label {
        Some(name) => format!("{}{}", name, suffix),
        None => format!("${:04X}{}", value, suffix),
    };

    match instr.addressing_mode {
        Implicit | Accumulator => String::new(),
        Immediate => format!("#${:02X}", value),
        ZeroPage => format!("${:02X}", value),
        ZeroPageX => format!("${:02X},X", value),
        ZeroPageY => format!("${:02X},Y", value),
        IndirectX => format!("(${:02X},X)", value),
        IndirectY => format!("(${:02X}),Y", value),
        Relative | Absolute => word(""),
        AbsoluteX => word(",X"),
        AbsoluteY => word(",Y"),
        Indirect => format!("({})", word("")),
    }
}

/// Renders records as a listing: address, raw bytes, then instruction text.
///
/// # Examples
///
/// ```
/// use sim6502::disassembler::{disassemble_bytes, formatter::format_listing};
///
/// let listing = format_listing(&disassemble_bytes(&[0xA9, 0x01, 0x00], 0x0600));
/// assert_eq!(listing, "0600  A9 01     LDA #$01\n0602  00        BRK\n");
/// ```
pub fn format_listing(instructions: &[InstructionData]) -> String {
    let mut out = String::new();
    for instr in instructions {
        let hex = instr
            .bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{:04X}  {:<8}  {}", instr.address, hex, instr.text);
    }
    out
}

/// Renders a hex dump of `length` bytes starting at `start`.
///
/// Rows hold [`BYTES_PER_ROW`] bytes and begin at `start`, not at a 16-byte
/// boundary. Addresses wrap at the top of memory.
pub fn hex_dump<M: MemoryBus>(memory: &M, start: u16, length: usize) -> String {
    let mut out = String::new();
    let mut offset = 0usize;

    while offset < length {
        let row_start = start.wrapping_add(offset as u16);
        let row_len = BYTES_PER_ROW.min(length - offset);
        let _ = write!(out, "{:04X}:", row_start);
        for i in 0..row_len {
            let _ = write!(out, " {:02X}", memory.read(row_start.wrapping_add(i as u16)));
        }
        out.push('\n');
        offset += row_len;
    }

    out
}
