//! # Host Interaction Pseudo-Op
//!
//! `SYS #type` (opcode 0x02) is not a hardware instruction. It lets a program
//! ask the host for console I/O without memory-mapped ports. The CPU only
//! decodes the request; the host performs it.
//!
//! | Type | Request |
//! |------|---------|
//! | `$01` | print A as an ASCII character |
//! | `$02` | print A as two hex digits |
//! | `$03` | print A as an unsigned decimal |
//! | `$04` | print the zero-terminated string at `X \| Y << 8` |
//! | `$05` | prompt for input; the host answers by writing memory |

use crate::opcodes::OpcodeMetadata;
use crate::{ExecutionError, MemoryBus, CPU};
use std::fmt;

/// Longest string `PrintString` will read before giving up on a terminator.
pub const MAX_STRING_LENGTH: usize = 256;

/// A decoded host request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoOp {
    /// Print the byte as a character.
    PrintChar(u8),
    /// Print the byte as two upper-case hex digits.
    PrintHex(u8),
    /// Print the byte as a decimal number.
    PrintDecimal(u8),
    /// Print the zero-terminated string starting at the address.
    PrintString(u16),
    /// Ask the host for input.
    Prompt,
}

impl PseudoOp {
    pub const PRINT_CHAR: u8 = 0x01;
    pub const PRINT_HEX: u8 = 0x02;
    pub const PRINT_DECIMAL: u8 = 0x03;
    pub const PRINT_STRING: u8 = 0x04;
    pub const PROMPT: u8 = 0x05;

    /// Decodes a type byte against the current registers.
    ///
    /// # Examples
    ///
    /// ```
    /// use sim6502::PseudoOp;
    ///
    /// assert_eq!(PseudoOp::decode(0x02, 0x41, 0, 0), Some(PseudoOp::PrintHex(0x41)));
    /// assert_eq!(PseudoOp::decode(0x04, 0, 0x00, 0x30), Some(PseudoOp::PrintString(0x3000)));
    /// assert_eq!(PseudoOp::decode(0x7F, 0, 0, 0), None);
    /// ```
    pub fn decode(kind: u8, a: u8, x: u8, y: u8) -> Option<PseudoOp> {
        let op = match kind {
            Self::PRINT_CHAR => PseudoOp::PrintChar(a),
            Self::PRINT_HEX => PseudoOp::PrintHex(a),
            Self::PRINT_DECIMAL => PseudoOp::PrintDecimal(a),
            Self::PRINT_STRING => PseudoOp::PrintString(x as u16 | (y as u16) << 8),
            Self::PROMPT => PseudoOp::Prompt,
            _ => return None,
        };
        Some(op)
    }

    /// The type byte that encodes this request.
    pub fn code(&self) -> u8 {
        match self {
            PseudoOp::PrintChar(_) => Self::PRINT_CHAR,
            PseudoOp::PrintHex(_) => Self::PRINT_HEX,
            PseudoOp::PrintDecimal(_) => Self::PRINT_DECIMAL,
            PseudoOp::PrintString(_) => Self::PRINT_STRING,
            PseudoOp::Prompt => Self::PROMPT,
        }
    }

    /// Renders the text a print request produces. `Prompt` renders nothing.
    ///
    /// Strings stop at the first zero byte or after [`MAX_STRING_LENGTH`]
    /// bytes, wrapping at the top of memory.
    pub fn render<M: MemoryBus>(&self, memory: &M) -> Option<String> {
        match *self {
            PseudoOp::PrintChar(value) => Some(char::from(value).to_string()),
            PseudoOp::PrintHex(value) => Some(format!("{:02X}", value)),
            PseudoOp::PrintDecimal(value) => Some(value.to_string()),
            PseudoOp::PrintString(addr) => Some(
                (0..MAX_STRING_LENGTH)
                    .map(|offset| memory.read(addr.wrapping_add(offset as u16)))
                    .take_while(|&byte| byte != 0)
                    .map(char::from)
                    .collect(),
            ),
            PseudoOp::Prompt => None,
        }
    }
}

impl fmt::Display for PseudoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoOp::PrintChar(v) => write!(f, "print char ${:02X}", v),
            PseudoOp::PrintHex(v) => write!(f, "print hex ${:02X}", v),
            PseudoOp::PrintDecimal(v) => write!(f, "print decimal ${:02X}", v),
            PseudoOp::PrintString(addr) => write!(f, "print string at ${:04X}", addr),
            PseudoOp::Prompt => f.write_str("prompt"),
        }
    }
}

/// Executes `SYS #type`.
///
/// Skips the two instruction bytes and returns the decoded request. No
/// register or flag changes. An unknown type fails before PC moves.
pub(crate) fn execute_sys<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<PseudoOp, ExecutionError> {
    let kind = cpu.operand_byte();
    let op = PseudoOp::decode(kind, cpu.a, cpu.x, cpu.y).ok_or(
        ExecutionError::UnknownPseudoOp {
            kind,
            address: cpu.pc,
        },
    )?;
    cpu.advance(metadata.size_bytes);
    Ok(op)
}
