//! 6502 Disassembler Module
//!
//! Reconstructs instructions from bytes, independent of how they got there.
//! Decoding uses the same [`OPCODE_TABLE`](crate::OPCODE_TABLE) as the CPU, so
//! the two never disagree about an instruction's length or meaning.

pub mod decoder;
pub mod formatter;

use crate::addressing::AddressingMode;
use crate::assembler::symbol_table::SymbolTable;
use crate::opcodes::Mnemonic;
use crate::MemoryBus;

/// A single disassembled instruction with full metadata.
///
/// Records are recomputed from memory on every call and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionData {
    /// Memory address where this instruction starts
    pub address: u16,

    /// Raw bytes (opcode followed by 0-2 operand bytes)
    pub bytes: Vec<u8>,

    /// The opcode byte value (0x00-0xFF)
    pub opcode: u8,

    /// Decoded mnemonic, or `None` for a byte that is not an opcode
    pub mnemonic: Option<Mnemonic>,

    /// Addressing mode used by this instruction
    pub addressing_mode: AddressingMode,

    /// Decoded operand value; for branches this is the target address
    pub operand: Option<u16>,

    /// Operand as it would be written in source (`#$10`, `$0600,X`, `loop`)
    pub operand_text: String,

    /// Full instruction text (`LDA #$10`, `.byte $FF`)
    pub text: String,
}

impl InstructionData {
    /// Total size in bytes.
    pub fn size_bytes(&self) -> u8 {
        self.bytes.len() as u8
    }

    /// Mnemonic spelling, `.byte` for undecodable data.
    pub fn mnemonic_text(&self) -> &'static str {
        self.mnemonic.map_or(".byte", Mnemonic::as_str)
    }

    /// True if the record stands for a byte that is not a known opcode.
    pub fn is_data(&self) -> bool {
        self.mnemonic.is_none()
    }
}

/// Disassembles `length` bytes of memory starting at `start`.
///
/// The walk decodes one instruction at a time while the instruction start is
/// inside the range; the last instruction may read operand bytes past the
/// end. Unknown opcodes become one-byte `.byte $XX` records and the walk
/// continues. When `symbols` is given, absolute and relative operands that
/// equal a label's address are shown by name.
///
/// # Examples
///
/// ```
/// use sim6502::disassembler::disassemble;
/// use sim6502::Memory;
///
/// let mut memory = Memory::new();
/// memory.load(0x0600, &[0xA9, 0x01, 0x8D, 0x00, 0x02, 0xFF]);
///
/// let listing = disassemble(&memory, 0x0600, 6, None);
/// let text: Vec<_> = listing.iter().map(|i| i.text.as_str()).collect();
/// assert_eq!(text, ["LDA #$01", "STA $0200", ".byte $FF"]);
/// ```
pub fn disassemble<M: MemoryBus>(
    memory: &M,
    start: u16,
    length: usize,
    symbols: Option<&SymbolTable>,
) -> Vec<InstructionData> {
    let mut instructions = Vec::new();
    let mut offset = 0usize;

    while offset < length {
        let address = start.wrapping_add(offset as u16);
        let window = [
            memory.read(address),
            memory.read(address.wrapping_add(1)),
            memory.read(address.wrapping_add(2)),
        ];
        let mut instr = decoder::decode_instruction(&window, address)
            .unwrap_or_else(|| decoder::data_byte(window[0], address));
        formatter::describe(&mut instr, symbols);

        offset += instr.bytes.len();
        instructions.push(instr);
    }

    instructions
}

/// Disassembles a byte slice as if it were loaded at `start_address`.
///
/// An instruction cut short by the end of the slice is shown as data.
///
/// # Examples
///
/// ```
/// use sim6502::disassembler::disassemble_bytes;
///
/// let listing = disassemble_bytes(&[0xD0, 0xFE, 0x4C], 0x0600);
/// assert_eq!(listing[0].text, "BNE $0600");
/// assert_eq!(listing[1].text, ".byte $4C");
/// ```
pub fn disassemble_bytes(bytes: &[u8], start_address: u16) -> Vec<InstructionData> {
    let mut instructions = Vec::new();
    let mut pc = 0;
    let mut address = start_address;

    while pc < bytes.len() {
        let mut instr = decoder::decode_instruction(&bytes[pc..], address)
            .unwrap_or_else(|| decoder::data_byte(bytes[pc], address));
        formatter::describe(&mut instr, None);

        pc += instr.bytes.len();
        address = address.wrapping_add(instr.bytes.len() as u16);
        instructions.push(instr);
    }

    instructions
}
