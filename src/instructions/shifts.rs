//! # Shift and Rotate Instructions
//!
//! This module implements bit shift and rotate operations:
//! - ASL: Arithmetic Shift Left
//! - LSR: Logical Shift Right
//! - ROL: Rotate Left through carry
//! - ROR: Rotate Right through carry
//!
//! Each works either on the accumulator or read-modify-write on memory.

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::{AddressingMode, ExecutionError, MemoryBus, CPU};

/// Applies the shift to `value`, returning the result and the new carry.
fn shift(mnemonic: Mnemonic, value: u8, carry_in: bool) -> Option<(u8, bool)> {
    let carry_in = carry_in as u8;
    let shifted = match mnemonic {
        Mnemonic::Asl => (value << 1, value & 0x80 != 0),
        Mnemonic::Lsr => (value >> 1, value & 0x01 != 0),
        Mnemonic::Rol => ((value << 1) | carry_in, value & 0x80 != 0),
        Mnemonic::Ror => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
        _ => return None,
    };
    Some(shifted)
}

/// Executes ASL, LSR, ROL or ROR.
///
/// The bit shifted out lands in C; Z and N follow the result.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `metadata` - Table entry for the opcode being executed
pub(crate) fn execute_shift<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let not_a_shift = |cpu: &CPU<M>| ExecutionError::ExecutionFailure {
        address: cpu.pc,
        message: format!("{} is not a shift", metadata.mnemonic),
    };

    let result = if metadata.addressing_mode == AddressingMode::Accumulator {
        let (result, carry) =
            shift(metadata.mnemonic, cpu.a, cpu.flag_c).ok_or_else(|| not_a_shift(cpu))?;
        cpu.a = result;
        cpu.flag_c = carry;
        result
    } else {
        // Memory mode: read, shift, write back
        let addr = cpu.effective_address(metadata.addressing_mode)?;
        let value = cpu.memory.read(addr);
        let (result, carry) =
            shift(metadata.mnemonic, value, cpu.flag_c).ok_or_else(|| not_a_shift(cpu))?;
        cpu.memory.write(addr, result);
        cpu.flag_c = carry;
        result
    };

    cpu.set_zn(result);
    cpu.advance(metadata.size_bytes);
    Ok(())
}
