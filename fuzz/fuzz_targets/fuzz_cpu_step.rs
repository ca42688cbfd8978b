//! Fuzz target for CPU step execution.
//!
//! Builds an arbitrary register file and memory neighborhood, then executes
//! one instruction. A failed step must leave the CPU untouched.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sim6502::{Memory, CPU};

/// Arbitrary CPU initial state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    status: u8,
    pc: u16,
}

/// Memory regions around the interesting addresses
#[derive(Debug, Arbitrary)]
struct FuzzMemory {
    /// Bytes at the PC location (instruction + operands)
    instruction_bytes: [u8; 3],
    zero_page: [u8; 256],
    stack_page: [u8; 256],
    /// Placed at $4000 for absolute addressing
    main_memory: [u8; 256],
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    memory: FuzzMemory,
}

fuzz_target!(|input: FuzzInput| {
    let mut memory = Memory::new();
    memory.load(0x0000, &input.memory.zero_page);
    memory.load(0x0100, &input.memory.stack_page);
    memory.load(0x4000, &input.memory.main_memory);
    memory.load(input.cpu_state.pc, &input.memory.instruction_bytes);

    let mut cpu = CPU::new(memory);
    cpu.set_a(input.cpu_state.a);
    cpu.set_x(input.cpu_state.x);
    cpu.set_y(input.cpu_state.y);
    cpu.set_sp(input.cpu_state.sp);
    cpu.set_status(input.cpu_state.status);
    cpu.set_pc(input.cpu_state.pc);

    let before = cpu.snapshot();
    match cpu.step() {
        Ok(step) => {
            assert_eq!(step.address, before.pc);
            assert_eq!(cpu.instructions(), 1);
        }
        Err(_) => {
            assert_eq!(cpu.snapshot(), before);
            assert_eq!(cpu.instructions(), 0);
        }
    }

    // Bit 5 always reads as set
    assert_ne!(cpu.status() & 0x20, 0);
});
