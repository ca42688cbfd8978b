//! # Increment and Decrement Instructions
//!
//! - INC, DEC: Modify a memory location
//! - INX, INY, DEX, DEY: Modify an index register
//!
//! All of them wrap at 8 bits and update Z and N from the result.

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes INC or DEC on a memory location.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `metadata` - Table entry for the opcode being executed
pub(crate) fn execute_memory<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let addr = cpu.effective_address(metadata.addressing_mode)?;
    let value = cpu.memory.read(addr);

    let result = if metadata.mnemonic == Mnemonic::Inc {
        value.wrapping_add(1)
    } else {
        value.wrapping_sub(1)
    };

    cpu.memory.write(addr, result);
    cpu.set_zn(result);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes INX, INY, DEX or DEY.
pub(crate) fn execute_register<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let result = match metadata.mnemonic {
        Mnemonic::Inx => {
            cpu.x = cpu.x.wrapping_add(1);
            cpu.x
        }
        Mnemonic::Iny => {
            cpu.y = cpu.y.wrapping_add(1);
            cpu.y
        }
        Mnemonic::Dex => {
            cpu.x = cpu.x.wrapping_sub(1);
            cpu.x
        }
        Mnemonic::Dey => {
            cpu.y = cpu.y.wrapping_sub(1);
            cpu.y
        }
        other => {
            return Err(ExecutionError::ExecutionFailure {
                address: cpu.pc,
                message: format!("{} is not a register increment", other),
            })
        }
    };

    cpu.set_zn(result);
    cpu.advance(metadata.size_bytes);
    Ok(())
}
