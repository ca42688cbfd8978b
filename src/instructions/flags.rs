//! # Status Flag Manipulation Instructions
//!
//! This module implements instructions that directly modify processor status flags:
//! - CLC: Clear Carry Flag
//! - SEC: Set Carry Flag
//! - CLI: Clear Interrupt Disable
//! - SEI: Set Interrupt Disable
//! - CLV: Clear Overflow Flag
//! - CLD: Clear Decimal Mode
//! - SED: Set Decimal Mode
//!
//! These instructions use implied addressing mode and touch exactly one flag.

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes one of the seven flag instructions.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `metadata` - Table entry for the opcode being executed
pub(crate) fn execute_flag<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    match metadata.mnemonic {
        Mnemonic::Clc => cpu.flag_c = false,
        Mnemonic::Sec => cpu.flag_c = true,
        Mnemonic::Cli => cpu.flag_i = false,
        Mnemonic::Sei => cpu.flag_i = true,
        Mnemonic::Clv => cpu.flag_v = false,
        Mnemonic::Cld => cpu.flag_d = false,
        Mnemonic::Sed => cpu.flag_d = true,
        other => {
            return Err(ExecutionError::ExecutionFailure {
                address: cpu.pc,
                message: format!("{} is not a flag instruction", other),
            })
        }
    }

    cpu.advance(metadata.size_bytes);
    Ok(())
}
