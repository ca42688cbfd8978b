//! # Control Flow Instructions
//!
//! This module implements control flow operations:
//! - BRK: Halt the program
//! - JMP: Jump to address
//! - JSR / RTS: Subroutine call and return
//! - RTI: Return from interrupt
//! - NOP: No operation
//!
//! There are no interrupt vectors in the simulator. BRK marks the end of a
//! program instead of vectoring through $FFFE.

use crate::opcodes::OpcodeMetadata;
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the BRK instruction.
///
/// Sets the B flag and moves PC past the opcode. The caller reports
/// [`Effect::Break`](crate::Effect::Break) and the session treats the program
/// as complete. Nothing is pushed on the stack.
pub(crate) fn execute_brk<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    cpu.flag_b = true;
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the JMP (Jump) instruction.
///
/// Addressing modes:
/// - Absolute (0x4C): JMP $1234 - Jump to address $1234
/// - Indirect (0x6C): JMP ($1234) - Jump to address stored at $1234/$1235
///
/// Flags affected: None
///
/// Note: The Indirect addressing mode keeps the original 6502 bug:
/// if the low byte of the pointer is 0xFF, the high byte is read from
/// the start of the same page. JMP ($10FF) reads $10FF and $1000.
pub(crate) fn execute_jmp<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    cpu.pc = cpu.effective_address(metadata.addressing_mode)?;
    Ok(())
}

/// Executes the JSR (Jump to Subroutine) instruction.
///
/// Pushes the address of the last byte of the JSR (PC + 2), high byte first,
/// then jumps to the absolute target.
pub(crate) fn execute_jsr<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let target = cpu.effective_address(metadata.addressing_mode)?;
    let return_address = cpu.pc.wrapping_add(2);
    cpu.push_word(return_address);
    cpu.pc = target;
    Ok(())
}

/// Executes the RTS (Return from Subroutine) instruction.
///
/// Pulls the return address and resumes at the byte after it.
pub(crate) fn execute_rts<M: MemoryBus>(
    cpu: &mut CPU<M>,
    _metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    cpu.pc = cpu.pull_word().wrapping_add(1);
    Ok(())
}

/// Executes the RTI (Return from Interrupt) instruction.
///
/// Pulls the status register (bits 4 and 5 ignored), then PC. Unlike RTS the
/// pulled address is used as-is.
pub(crate) fn execute_rti<M: MemoryBus>(
    cpu: &mut CPU<M>,
    _metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let status = cpu.pull();
    let break_flag = cpu.flag_b;
    cpu.set_status(status);
    cpu.flag_b = break_flag;
    cpu.pc = cpu.pull_word();
    Ok(())
}

pub(crate) fn execute_nop<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    cpu.advance(metadata.size_bytes);
    Ok(())
}
