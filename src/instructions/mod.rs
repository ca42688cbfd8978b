//! # 6502 Instruction Implementations
//!
//! This module contains the implementations of all 6502 instructions, organized by category.
//! Each instruction is implemented as a standalone function that takes a mutable reference
//! to the CPU and the opcode's table entry, and leaves PC at the next instruction.
//!
//! ## Categories
//!
//! - **alu**: Arithmetic and logic operations (ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT)
//! - **branches**: Conditional branch instructions (BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS)
//! - **shifts**: Shift and rotate operations (ASL, LSR, ROL, ROR)
//! - **load_store**: Load and store instructions (LDA, LDX, LDY, STA, STX, STY)
//! - **inc_dec**: Increment and decrement operations (INC, DEC, INX, INY, DEX, DEY)
//! - **control**: Control flow instructions (JMP, JSR, RTS, RTI, BRK, NOP)
//! - **stack**: Stack operations (PHA, PHP, PLA, PLP)
//! - **flags**: Status flag manipulation (CLC, SEC, CLI, SEI, CLD, SED, CLV)
//! - **transfer**: Register transfer operations (TAX, TAY, TXA, TYA, TSX, TXS)
//! - **pseudo**: The `SYS` host-interaction pseudo-op

pub(crate) mod alu;
pub(crate) mod branches;
pub(crate) mod control;
pub(crate) mod flags;
pub(crate) mod inc_dec;
pub(crate) mod load_store;
pub(crate) mod pseudo;
pub(crate) mod shifts;
pub(crate) mod stack;
pub(crate) mod transfer;

pub use pseudo::{PseudoOp, MAX_STRING_LENGTH};

use crate::cpu::Effect;
use crate::opcodes::{Mnemonic as Mn, OpcodeMetadata};
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the instruction described by `metadata` at the current PC.
pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<Effect, ExecutionError> {
    match metadata.mnemonic {
        Mn::Adc => alu::execute_adc(cpu, metadata)?,
        Mn::Sbc => alu::execute_sbc(cpu, metadata)?,
        Mn::And => alu::execute_and(cpu, metadata)?,
        Mn::Ora => alu::execute_ora(cpu, metadata)?,
        Mn::Eor => alu::execute_eor(cpu, metadata)?,
        Mn::Cmp => alu::execute_cmp(cpu, metadata)?,
        Mn::Cpx => alu::execute_cpx(cpu, metadata)?,
        Mn::Cpy => alu::execute_cpy(cpu, metadata)?,
        Mn::Bit => alu::execute_bit(cpu, metadata)?,

        Mn::Bcc | Mn::Bcs | Mn::Beq | Mn::Bne | Mn::Bmi | Mn::Bpl | Mn::Bvc | Mn::Bvs => {
            branches::execute_branch(cpu, metadata)?
        }

        Mn::Asl | Mn::Lsr | Mn::Rol | Mn::Ror => shifts::execute_shift(cpu, metadata)?,

        Mn::Lda | Mn::Ldx | Mn::Ldy => load_store::execute_load(cpu, metadata)?,
        Mn::Sta | Mn::Stx | Mn::Sty => load_store::execute_store(cpu, metadata)?,

        Mn::Inc | Mn::Dec => inc_dec::execute_memory(cpu, metadata)?,
        Mn::Inx | Mn::Iny | Mn::Dex | Mn::Dey => inc_dec::execute_register(cpu, metadata)?,

        Mn::Jmp => control::execute_jmp(cpu, metadata)?,
        Mn::Jsr => control::execute_jsr(cpu, metadata)?,
        Mn::Rts => control::execute_rts(cpu, metadata)?,
        Mn::Rti => control::execute_rti(cpu, metadata)?,
        Mn::Nop => control::execute_nop(cpu, metadata)?,
        Mn::Brk => {
            control::execute_brk(cpu, metadata)?;
            return Ok(Effect::Break);
        }

        Mn::Pha | Mn::Php | Mn::Pla | Mn::Plp => stack::execute_stack(cpu, metadata)?,

        Mn::Clc | Mn::Sec | Mn::Cli | Mn::Sei | Mn::Clv | Mn::Cld | Mn::Sed => {
            flags::execute_flag(cpu, metadata)?
        }

        Mn::Tax | Mn::Tay | Mn::Txa | Mn::Tya | Mn::Tsx | Mn::Txs => {
            transfer::execute_transfer(cpu, metadata)?
        }

        Mn::Sys => return pseudo::execute_sys(cpu, metadata).map(Effect::PseudoOp),
    }

    Ok(Effect::None)
}
