//! # Opcode Metadata Table
//!
//! This module contains the 256-entry opcode metadata table that serves as the
//! single source of truth for instruction decoding. The CPU, the assembler's
//! encoder and the disassembler all consult it, so they can never disagree
//! about an instruction's length or meaning.
//!
//! The table covers:
//! - **151 documented instructions** - Official NMOS 6502 opcodes
//! - **1 pseudo-op** - `SYS #type` at `0x02`, used for host I/O
//! - **104 unassigned opcodes** - `None`, rejected as illegal
//!
//! Execution is keyed off [`Mnemonic`]; see `instructions::execute`.

use crate::addressing::AddressingMode;
use std::fmt;
use std::str::FromStr;

/// Opcode value reserved for the host-interaction pseudo-op.
pub const PSEUDO_OP_OPCODE: u8 = 0x02;

/// Instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// Host-interaction pseudo-op (not a hardware instruction).
    Sys,
}

impl Mnemonic {
    /// Every mnemonic, in alphabetical order (pseudo-op last).
    pub const ALL: [Mnemonic; 57] = [
        Mnemonic::Adc,
        Mnemonic::And,
        Mnemonic::Asl,
        Mnemonic::Bcc,
        Mnemonic::Bcs,
        Mnemonic::Beq,
        Mnemonic::Bit,
        Mnemonic::Bmi,
        Mnemonic::Bne,
        Mnemonic::Bpl,
        Mnemonic::Brk,
        Mnemonic::Bvc,
        Mnemonic::Bvs,
        Mnemonic::Clc,
        Mnemonic::Cld,
        Mnemonic::Cli,
        Mnemonic::Clv,
        Mnemonic::Cmp,
        Mnemonic::Cpx,
        Mnemonic::Cpy,
        Mnemonic::Dec,
        Mnemonic::Dex,
        Mnemonic::Dey,
        Mnemonic::Eor,
        Mnemonic::Inc,
        Mnemonic::Inx,
        Mnemonic::Iny,
        Mnemonic::Jmp,
        Mnemonic::Jsr,
        Mnemonic::Lda,
        Mnemonic::Ldx,
        Mnemonic::Ldy,
        Mnemonic::Lsr,
        Mnemonic::Nop,
        Mnemonic::Ora,
        Mnemonic::Pha,
        Mnemonic::Php,
        Mnemonic::Pla,
        Mnemonic::Plp,
        Mnemonic::Rol,
        Mnemonic::Ror,
        Mnemonic::Rti,
        Mnemonic::Rts,
        Mnemonic::Sbc,
        Mnemonic::Sec,
        Mnemonic::Sed,
        Mnemonic::Sei,
        Mnemonic::Sta,
        Mnemonic::Stx,
        Mnemonic::Sty,
        Mnemonic::Tax,
        Mnemonic::Tay,
        Mnemonic::Tsx,
        Mnemonic::Txa,
        Mnemonic::Txs,
        Mnemonic::Tya,
        Mnemonic::Sys,
    ];

    /// Upper-case assembler spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::And => "AND",
            Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC",
            Mnemonic::Bcs => "BCS",
            Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT",
            Mnemonic::Bmi => "BMI",
            Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL",
            Mnemonic::Brk => "BRK",
            Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS",
            Mnemonic::Clc => "CLC",
            Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI",
            Mnemonic::Clv => "CLV",
            Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX",
            Mnemonic::Cpy => "CPY",
            Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX",
            Mnemonic::Dey => "DEY",
            Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Inx => "INX",
            Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jsr => "JSR",
            Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX",
            Mnemonic::Ldy => "LDY",
            Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP",
            Mnemonic::Ora => "ORA",
            Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP",
            Mnemonic::Pla => "PLA",
            Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL",
            Mnemonic::Ror => "ROR",
            Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS",
            Mnemonic::Sbc => "SBC",
            Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED",
            Mnemonic::Sei => "SEI",
            Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX",
            Mnemonic::Sty => "STY",
            Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY",
            Mnemonic::Tsx => "TSX",
            Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS",
            Mnemonic::Tya => "TYA",
            Mnemonic::Sys => "SYS",
        }
    }

    /// Returns true for the eight conditional branches.
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Mnemonic::Bcc
                | Mnemonic::Bcs
                | Mnemonic::Beq
                | Mnemonic::Bmi
                | Mnemonic::Bne
                | Mnemonic::Bpl
                | Mnemonic::Bvc
                | Mnemonic::Bvs
        )
    }

    /// Returns true if the mnemonic has an encoding in the given mode.
    pub fn supports(self, mode: AddressingMode) -> bool {
        find_opcode(self, mode).is_some()
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mnemonic '{0}'")]
pub struct UnknownMnemonic(pub String);

impl FromStr for Mnemonic {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Mnemonic::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}

/// Metadata for a single 6502 opcode.
///
/// - `mnemonic`: which operation executes
/// - `addressing_mode`: how the instruction interprets operand bytes
/// - `size_bytes`: total instruction size including opcode (1-3 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Operation performed by this opcode.
    pub mnemonic: Mnemonic,

    /// Addressing mode for this opcode.
    pub addressing_mode: AddressingMode,

    /// Total instruction size in bytes (opcode + operands).
    pub size_bytes: u8,
}

const fn op(mnemonic: Mnemonic, addressing_mode: AddressingMode) -> Option<OpcodeMetadata> {
    Some(OpcodeMetadata {
        mnemonic,
        addressing_mode,
        size_bytes: addressing_mode.size_bytes(),
    })
}

use AddressingMode as Am;
use Mnemonic as Mn;

const ___: Option<OpcodeMetadata> = None;

/// Complete 256-entry opcode table indexed by opcode byte value.
///
/// # Examples
///
/// ```
/// use sim6502::{AddressingMode, Mnemonic, OPCODE_TABLE};
///
/// let lda_imm = OPCODE_TABLE[0xA9].unwrap();
/// assert_eq!(lda_imm.mnemonic, Mnemonic::Lda);
/// assert_eq!(lda_imm.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.size_bytes, 2);
///
/// // Unassigned opcodes have no entry
/// assert!(OPCODE_TABLE[0xFF].is_none());
/// ```
pub const OPCODE_TABLE: [Option<OpcodeMetadata>; 256] = [
    // 0x00
    op(Mn::Brk, Am::Implicit),
    op(Mn::Ora, Am::IndirectX),
    op(Mn::Sys, Am::Immediate),
    ___,
    ___,
    op(Mn::Ora, Am::ZeroPage),
    op(Mn::Asl, Am::ZeroPage),
    ___,
    op(Mn::Php, Am::Implicit),
    op(Mn::Ora, Am::Immediate),
    op(Mn::Asl, Am::Accumulator),
    ___,
    ___,
    op(Mn::Ora, Am::Absolute),
    op(Mn::Asl, Am::Absolute),
    ___,
    // 0x10
    op(Mn::Bpl, Am::Relative),
    op(Mn::Ora, Am::IndirectY),
    ___,
    ___,
    ___,
    op(Mn::Ora, Am::ZeroPageX),
    op(Mn::Asl, Am::ZeroPageX),
    ___,
    op(Mn::Clc, Am::Implicit),
    op(Mn::Ora, Am::AbsoluteY),
    ___,
    ___,
    ___,
    op(Mn::Ora, Am::AbsoluteX),
    op(Mn::Asl, Am::AbsoluteX),
    ___,
    // 0x20
    op(Mn::Jsr, Am::Absolute),
    op(Mn::And, Am::IndirectX),
    ___,
    ___,
    op(Mn::Bit, Am::ZeroPage),
    op(Mn::And, Am::ZeroPage),
    op(Mn::Rol, Am::ZeroPage),
    ___,
    op(Mn::Plp, Am::Implicit),
    op(Mn::And, Am::Immediate),
    op(Mn::Rol, Am::Accumulator),
    ___,
    op(Mn::Bit, Am::Absolute),
    op(Mn::And, Am::Absolute),
    op(Mn::Rol, Am::Absolute),
    ___,
    // 0x30
    op(Mn::Bmi, Am::Relative),
    op(Mn::And, Am::IndirectY),
    ___,
    ___,
    ___,
    op(Mn::And, Am::ZeroPageX),
    op(Mn::Rol, Am::ZeroPageX),
    ___,
    op(Mn::Sec, Am::Implicit),
    op(Mn::And, Am::AbsoluteY),
    ___,
    ___,
    ___,
    op(Mn::And, Am::AbsoluteX),
    op(Mn::Rol, Am::AbsoluteX),
    ___,
    // 0x40
    op(Mn::Rti, Am::Implicit),
    op(Mn::Eor, Am::IndirectX),
    ___,
    ___,
    ___,
    op(Mn::Eor, Am::ZeroPage),
    op(Mn::Lsr, Am::ZeroPage),
    ___,
    op(Mn::Pha, Am::Implicit),
    op(Mn::Eor, Am::Immediate),
    op(Mn::Lsr, Am::Accumulator),
    ___,
    op(Mn::Jmp, Am::Absolute),
    op(Mn::Eor, Am::Absolute),
    op(Mn::Lsr, Am::Absolute),
    ___,
    // 0x50
    op(Mn::Bvc, Am::Relative),
    op(Mn::Eor, Am::IndirectY),
    ___,
    ___,
    ___,
    op(Mn::Eor, Am::ZeroPageX),
    op(Mn::Lsr, Am::ZeroPageX),
    ___,
    op(Mn::Cli, Am::Implicit),
    op(Mn::Eor, Am::AbsoluteY),
    ___,
    ___,
    ___,
    op(Mn::Eor, Am::AbsoluteX),
    op(Mn::Lsr, Am::AbsoluteX),
    ___,
    // 0x60
    op(Mn::Rts, Am::Implicit),
    op(Mn::Adc, Am::IndirectX),
    ___,
    ___,
    ___,
    op(Mn::Adc, Am::ZeroPage),
    op(Mn::Ror, Am::ZeroPage),
    ___,
    op(Mn::Pla, Am::Implicit),
    op(Mn::Adc, Am::Immediate),
    op(Mn::Ror, Am::Accumulator),
    ___,
    op(Mn::Jmp, Am::Indirect),
    op(Mn::Adc, Am::Absolute),
    op(Mn::Ror, Am::Absolute),
    ___,
    // 0x70
    op(Mn::Bvs, Am::Relative),
    op(Mn::Adc, Am::IndirectY),
    ___,
    ___,
    ___,
    op(Mn::Adc, Am::ZeroPageX),
    op(Mn::Ror, Am::ZeroPageX),
    ___,
    op(Mn::Sei, Am::Implicit),
    op(Mn::Adc, Am::AbsoluteY),
    ___,
    ___,
    ___,
    op(Mn::Adc, Am::AbsoluteX),
    op(Mn::Ror, Am::AbsoluteX),
    ___,
    // 0x80
    ___,
    op(Mn::Sta, Am::IndirectX),
    ___,
    ___,
    op(Mn::Sty, Am::ZeroPage),
    op(Mn::Sta, Am::ZeroPage),
    op(Mn::Stx, Am::ZeroPage),
    ___,
    op(Mn::Dey, Am::Implicit),
    ___,
    op(Mn::Txa, Am::Implicit),
    ___,
    op(Mn::Sty, Am::Absolute),
    op(Mn::Sta, Am::Absolute),
    op(Mn::Stx, Am::Absolute),
    ___,
    // 0x90
    op(Mn::Bcc, Am::Relative),
    op(Mn::Sta, Am::IndirectY),
    ___,
    ___,
    op(Mn::Sty, Am::ZeroPageX),
    op(Mn::Sta, Am::ZeroPageX),
    op(Mn::Stx, Am::ZeroPageY),
    ___,
    op(Mn::Tya, Am::Implicit),
    op(Mn::Sta, Am::AbsoluteY),
    op(Mn::Txs, Am::Implicit),
    ___,
    ___,
    op(Mn::Sta, Am::AbsoluteX),
    ___,
    ___,
    // 0xA0
    op(Mn::Ldy, Am::Immediate),
    op(Mn::Lda, Am::IndirectX),
    op(Mn::Ldx, Am::Immediate),
    ___,
    op(Mn::Ldy, Am::ZeroPage),
    op(Mn::Lda, Am::ZeroPage),
    op(Mn::Ldx, Am::ZeroPage),
    ___,
    op(Mn::Tay, Am::Implicit),
    op(Mn::Lda, Am::Immediate),
    op(Mn::Tax, Am::Implicit),
    ___,
    op(Mn::Ldy, Am::Absolute),
    op(Mn::Lda, Am::Absolute),
    op(Mn::Ldx, Am::Absolute),
    ___,
    // 0xB0
    op(Mn::Bcs, Am::Relative),
    op(Mn::Lda, Am::IndirectY),
    ___,
    ___,
    op(Mn::Ldy, Am::ZeroPageX),
    op(Mn::Lda, Am::ZeroPageX),
    op(Mn::Ldx, Am::ZeroPageY),
    ___,
    op(Mn::Clv, Am::Implicit),
    op(Mn::Lda, Am::AbsoluteY),
    op(Mn::Tsx, Am::Implicit),
    ___,
    op(Mn::Ldy, Am::AbsoluteX),
    op(Mn::Lda, Am::AbsoluteX),
    op(Mn::Ldx, Am::AbsoluteY),
    ___,
    // 0xC0
    op(Mn::Cpy, Am::Immediate),
    op(Mn::Cmp, Am::IndirectX),
    ___,
    ___,
    op(Mn::Cpy, Am::ZeroPage),
    op(Mn::Cmp, Am::ZeroPage),
    op(Mn::Dec, Am::ZeroPage),
    ___,
    op(Mn::Iny, Am::Implicit),
    op(Mn::Cmp, Am::Immediate),
    op(Mn::Dex, Am::Implicit),
    ___,
    op(Mn::Cpy, Am::Absolute),
    op(Mn::Cmp, Am::Absolute),
    op(Mn::Dec, Am::Absolute),
    ___,
    // 0xD0
    op(Mn::Bne, Am::Relative),
    op(Mn::Cmp, Am::IndirectY),
    ___,
    ___,
    ___,
    op(Mn::Cmp, Am::ZeroPageX),
    op(Mn::Dec, Am::ZeroPageX),
    ___,
    op(Mn::Cld, Am::Implicit),
    op(Mn::Cmp, Am::AbsoluteY),
    ___,
    ___,
    ___,
    op(Mn::Cmp, Am::AbsoluteX),
    op(Mn::Dec, Am::AbsoluteX),
    ___,
    // 0xE0
    op(Mn::Cpx, Am::Immediate),
    op(Mn::Sbc, Am::IndirectX),
    ___,
    ___,
    op(Mn::Cpx, Am::ZeroPage),
    op(Mn::Sbc, Am::ZeroPage),
    op(Mn::Inc, Am::ZeroPage),
    ___,
    op(Mn::Inx, Am::Implicit),
    op(Mn::Sbc, Am::Immediate),
    op(Mn::Nop, Am::Implicit),
    ___,
    op(Mn::Cpx, Am::Absolute),
    op(Mn::Sbc, Am::Absolute),
    op(Mn::Inc, Am::Absolute),
    ___,
    // 0xF0
    op(Mn::Beq, Am::Relative),
    op(Mn::Sbc, Am::IndirectY),
    ___,
    ___,
    ___,
    op(Mn::Sbc, Am::ZeroPageX),
    op(Mn::Inc, Am::ZeroPageX),
    ___,
    op(Mn::Sed, Am::Implicit),
    op(Mn::Sbc, Am::AbsoluteY),
    ___,
    ___,
    ___,
    op(Mn::Sbc, Am::AbsoluteX),
    op(Mn::Inc, Am::AbsoluteX),
    ___,
];

/// Looks up the metadata for an opcode byte.
pub fn lookup(opcode: u8) -> Option<&'static OpcodeMetadata> {
    OPCODE_TABLE[opcode as usize].as_ref()
}

/// Finds the opcode byte encoding `mnemonic` in `mode`.
///
/// # Examples
///
/// ```
/// use sim6502::{find_opcode, AddressingMode, Mnemonic};
///
/// assert_eq!(find_opcode(Mnemonic::Sta, AddressingMode::Absolute), Some(0x8D));
/// assert_eq!(find_opcode(Mnemonic::Sta, AddressingMode::Immediate), None);
/// ```
pub fn find_opcode(mnemonic: Mnemonic, mode: AddressingMode) -> Option<u8> {
    OPCODE_TABLE.iter().position(|entry| {
        matches!(entry, Some(meta) if meta.mnemonic == mnemonic && meta.addressing_mode == mode)
    })
    .map(|index| index as u8)
}
