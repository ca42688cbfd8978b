//! # 6502 Teaching Simulator
//!
//! An NMOS 6502 simulator core for learning assembly: write source, assemble it
//! into a 64 KiB address space, then step through it or run it while watching
//! registers, flags and memory writes.
//!
//! The crate is organized the way a program flows through it. Source goes
//! through the two-pass [`assembler`], which writes bytes via the
//! [`MemoryBus`] trait into [`Memory`]. The [`CPU`] executes from memory,
//! and every write dispatches a [`MemoryEvent`] to host listeners. The
//! [`disassembler`] reads memory independently. A [`Simulator`] ties these
//! together into a session with a run/step/debug lifecycle.
//!
//! ## Quick Start
//!
//! ```rust
//! use sim6502::{EventKind, Event, Simulator, SimulatorConfig};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut sim = Simulator::new(SimulatorConfig::default());
//!
//! let printed = Rc::new(RefCell::new(String::new()));
//! let sink = Rc::clone(&printed);
//! sim.subscribe(EventKind::PseudoOp, move |event| {
//!     if let Event::PseudoOp { output: Some(text), .. } = event {
//!         sink.borrow_mut().push_str(text);
//!     }
//! });
//!
//! sim.assemble("
//!     LDX #<msg
//!     LDY #>msg
//!     SYS #4        ; print the string at X/Y
//!     BRK
//! msg: .byte \"Hello\", 0
//! ").unwrap();
//! sim.run().unwrap();
//!
//! assert_eq!(*printed.borrow(), "Hello");
//! ```
//!
//! ## Modules
//!
//! - `memory` - MemoryBus trait, the 64 KiB store and its notifications
//! - `events` - Synchronous listener registry shared by memory and simulator
//! - `opcodes` / `addressing` - Opcode metadata table and addressing modes
//! - `cpu` - Registers, flags and single-instruction execution
//! - `assembler` - Lexer, parser, encoder, symbol table and source map
//! - `disassembler` - Instruction records, listings and hex dumps
//! - `simulator` - Execution lifecycle, debugger and event fan-out

pub mod addressing;
pub mod assembler;
pub mod config;
pub mod cpu;
pub mod disassembler;
pub mod error;
pub mod events;
pub mod memory;
pub mod opcodes;
pub mod simulator;

// Internal instruction implementations (not part of public API)
mod instructions;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use addressing::AddressingMode;
pub use assembler::{
    assemble, Assembler, AssemblerError, AssemblerOutput, AssemblerWarning, ErrorType, SourceMap,
    Symbol, SymbolKind, SymbolTable,
};
pub use config::SimulatorConfig;
pub use cpu::{CpuSnapshot, Effect, Step, CPU, DEFAULT_ORIGIN};
pub use disassembler::{disassemble, disassemble_bytes, InstructionData};
pub use error::{ExecutionError, SimulatorError};
pub use events::ListenerId;
pub use instructions::{PseudoOp, MAX_STRING_LENGTH};
pub use memory::{Memory, MemoryBus, MemoryEvent, MemoryEventKind, MEMORY_SIZE};
pub use opcodes::{find_opcode, lookup, Mnemonic, OpcodeMetadata, OPCODE_TABLE};
pub use simulator::{
    BatchEnd, BatchSummary, Event, EventKind, ExecutionState, ProgramRange, Simulator, StepResult,
    StopHandle,
};
