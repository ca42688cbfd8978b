//! # Stack Operations
//!
//! This module implements stack manipulation instructions:
//! - PHA: Push Accumulator on Stack
//! - PHP: Push Processor Status on Stack
//! - PLA: Pull Accumulator from Stack
//! - PLP: Pull Processor Status from Stack
//!
//! The 6502 stack is located at memory addresses 0x0100-0x01FF and grows downward.
//! The stack pointer (SP) is an 8-bit register that serves as an offset into this
//! page. The full stack address is calculated as 0x0100 | SP. SP wraps silently;
//! the CPU records the wrap so the session can warn about it.

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes PHA, PHP, PLA or PLP.
///
/// - PHA: pushes A. No flags affected.
/// - PHP: pushes the status byte with bits 4 and 5 set.
/// - PLA: pulls into A and updates Z and N.
/// - PLP: pulls the status byte; bits 4 and 5 are ignored.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `metadata` - Table entry for the opcode being executed
pub(crate) fn execute_stack<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    match metadata.mnemonic {
        Mnemonic::Pha => cpu.push(cpu.a),
        Mnemonic::Php => cpu.push(cpu.status() | 0b0011_0000),
        Mnemonic::Pla => {
            let value = cpu.pull();
            cpu.a = value;
            cpu.set_zn(value);
        }
        Mnemonic::Plp => {
            let value = cpu.pull();
            let break_flag = cpu.flag_b;
            cpu.set_status(value);
            cpu.flag_b = break_flag;
        }
        other => {
            return Err(ExecutionError::ExecutionFailure {
                address: cpu.pc,
                message: format!("{} is not a stack instruction", other),
            })
        }
    }

    cpu.advance(metadata.size_bytes);
    Ok(())
}
