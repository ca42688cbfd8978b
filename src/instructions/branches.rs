//! # Branch Instructions
//!
//! This module implements the conditional branch operations
//! (BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS).
//!
//! All branch instructions use relative addressing with a signed 8-bit offset
//! measured from the address following the 2-byte instruction.

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::{AddressingMode, ExecutionError, MemoryBus, CPU};

/// Executes any of the eight conditional branches.
///
/// If the tested flag condition holds, PC is set to
/// `PC + 2 + offset` (wrapping); otherwise PC advances past the instruction.
/// No flags are affected.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `metadata` - Table entry for the opcode being executed
pub(crate) fn execute_branch<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let taken = match metadata.mnemonic {
        Mnemonic::Bcc => !cpu.flag_c,
        Mnemonic::Bcs => cpu.flag_c,
        Mnemonic::Beq => cpu.flag_z,
        Mnemonic::Bne => !cpu.flag_z,
        Mnemonic::Bmi => cpu.flag_n,
        Mnemonic::Bpl => !cpu.flag_n,
        Mnemonic::Bvc => !cpu.flag_v,
        Mnemonic::Bvs => cpu.flag_v,
        other => {
            return Err(ExecutionError::ExecutionFailure {
                address: cpu.pc,
                message: format!("{} is not a branch", other),
            })
        }
    };

    if taken {
        cpu.pc = cpu.effective_address(AddressingMode::Relative)?;
    } else {
        cpu.advance(metadata.size_bytes);
    }

    Ok(())
}
