//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC: Add with Carry
//! - SBC: Subtract with Carry
//! - AND, ORA, EOR: Bitwise logic
//! - CMP, CPX, CPY: Compare register with memory
//! - BIT: Bit test
//!
//! The decimal flag is ignored: ADC and SBC always use binary arithmetic.

use crate::opcodes::OpcodeMetadata;
use crate::{ExecutionError, MemoryBus, CPU};

/// Adds `value` and the carry flag to A, updating N, V, Z and C.
///
/// Overflow occurs when both operands have the same sign and the result's
/// sign differs: `V = (A ^ result) & (M ^ result) & 0x80`.
fn add_with_carry<M: MemoryBus>(cpu: &mut CPU<M>, value: u8) {
    let a = cpu.a;
    let sum = a as u16 + value as u16 + cpu.flag_c as u16;
    let result = sum as u8;

    cpu.flag_c = sum > 0xFF;
    cpu.flag_v = ((a ^ result) & (value ^ result) & 0x80) != 0;
    cpu.a = result;
    cpu.set_zn(result);
}

/// Executes the ADC (Add with Carry) instruction.
///
/// Adds the value at the effective address plus the carry flag to the
/// accumulator.
///
/// # Flag Behavior
///
/// - Carry (C): Set if the unsigned result exceeds 255
/// - Overflow (V): Set on signed overflow
/// - Zero (Z), Negative (N): From the result
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `metadata` - Table entry for the opcode being executed
pub(crate) fn execute_adc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    add_with_carry(cpu, value);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the SBC (Subtract with Carry) instruction.
///
/// Computes `A - M - (1 - C)`. This is ADC with the operand's bits inverted,
/// so C ends up set when no borrow occurred.
pub(crate) fn execute_sbc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    add_with_carry(cpu, !value);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the AND (Logical AND) instruction. Updates Z and N.
pub(crate) fn execute_and<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    cpu.a &= value;
    cpu.set_zn(cpu.a);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the ORA (Logical Inclusive OR) instruction. Updates Z and N.
pub(crate) fn execute_ora<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    cpu.a |= value;
    cpu.set_zn(cpu.a);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the EOR (Exclusive OR) instruction. Updates Z and N.
pub(crate) fn execute_eor<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    cpu.a ^= value;
    cpu.set_zn(cpu.a);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Shared compare logic: C = register >= value, Z/N from the difference.
fn compare<M: MemoryBus>(cpu: &mut CPU<M>, register: u8, value: u8) {
    let diff = register.wrapping_sub(value);
    cpu.flag_c = register >= value;
    cpu.set_zn(diff);
}

/// Executes the CMP (Compare Accumulator) instruction.
///
/// # Flag Behavior
///
/// - Carry (C): Set if A >= M
/// - Zero (Z): Set if A == M
/// - Negative (N): Bit 7 of A - M
/// - Other flags: Not affected
pub(crate) fn execute_cmp<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    let register = cpu.a;
    compare(cpu, register, value);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the CPX (Compare X Register) instruction.
pub(crate) fn execute_cpx<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    let register = cpu.x;
    compare(cpu, register, value);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the CPY (Compare Y Register) instruction.
pub(crate) fn execute_cpy<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    let register = cpu.y;
    compare(cpu, register, value);
    cpu.advance(metadata.size_bytes);
    Ok(())
}

/// Executes the BIT (Bit Test) instruction.
///
/// Z is set from `A & M`; N and V are copied from bits 7 and 6 of the memory
/// operand. A is not modified.
pub(crate) fn execute_bit<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(metadata.addressing_mode)?;
    cpu.flag_z = (cpu.a & value) == 0;
    cpu.flag_n = (value & 0x80) != 0;
    cpu.flag_v = (value & 0x40) != 0;
    cpu.advance(metadata.size_bytes);
    Ok(())
}
