//! Fuzz target for the simulator session.
//!
//! Loads arbitrary bytes as a program and drives it through a bounded run
//! and a few debugger operations.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sim6502::{Simulator, SimulatorConfig};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    origin: u16,
    program: Vec<u8>,
    breakpoints: Vec<u16>,
    budget: u8,
    debug: bool,
}

fuzz_target!(|input: FuzzInput| {
    let config = SimulatorConfig::default()
        .with_batch_size(16)
        .with_max_batches(Some(8));
    let mut sim = Simulator::new(config);
    sim.load_program(input.origin, &input.program);

    if input.debug {
        let _ = sim.enable_debugger();
        for &address in &input.breakpoints {
            sim.add_breakpoint(address);
        }
    }

    if let Ok(summary) = sim.multi_step(input.budget as usize) {
        assert!(summary.executed <= input.budget as usize);
    }

    let _ = sim.run();
    assert!(!sim.state().is_running());

    let _ = sim.reset();
    let _ = sim.program_disassembly();
});
