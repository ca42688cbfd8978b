//! # Load and Store Instructions
//!
//! This module implements load and store operations:
//! - LDA: Load Accumulator
//! - LDX: Load X Register
//! - LDY: Load Y Register
//! - STA: Store Accumulator
//! - STX: Store X Register
//! - STY: Store Y Register

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes LDA, LDX or LDY.
///
/// Loads a byte of memory into the register, setting the zero and negative
/// flags as appropriate.
///
/// # Flag Behavior
///
/// - Zero (Z): Set if the loaded value is 0
/// - Negative (N): Set if bit 7 of the loaded value is set
/// - Other flags: Not affected
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `metadata` - Table entry for the opcode being executed
pub(crate) fn execute_load<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;

    match metadata.mnemonic {
        Mnemonic::Lda => cpu.a = value,
        Mnemonic::Ldx => cpu.x = value,
        Mnemonic::Ldy => cpu.y = value,
        other => {
            return Err(ExecutionError::ExecutionFailure {
                address: cpu.pc,
                message: format!("{} is not a load", other),
            })
        }
    }

    cpu.set_zn(value);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes STA, STX or STY. No flags are affected.
pub(crate) fn execute_store<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = match metadata.mnemonic {
        Mnemonic::Sta => cpu.a,
        Mnemonic::Stx => cpu.x,
        Mnemonic::Sty => cpu.y,
        other => {
            return Err(ExecutionError::ExecutionFailure {
                address: cpu.pc,
                message: format!("{} is not a store", other),
            })
        }
    };

    let addr = cpu.effective_address(metadata.addressing_mode)?;
    cpu.memory.write(addr, value);
    cpu.advance(metadata.size_bytes);
    Ok(())
}
