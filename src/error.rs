//! Runtime and session error types.
//!
//! Assembly-time errors live in [`crate::assembler`] next to the code that
//! produces them.

use crate::assembler::AssemblerError;
use crate::simulator::ExecutionState;
use thiserror::Error;

/// Errors that halt instruction execution.
///
/// When `CPU::step` returns one of these, no register, flag or memory change
/// from the failing instruction has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The byte at `address` is not an opcode in the table.
    #[error("illegal opcode ${opcode:02X} at ${address:04X}")]
    IllegalOpcode { opcode: u8, address: u16 },

    /// A `SYS` pseudo-op carried a type byte with no meaning.
    #[error("unknown pseudo-op type ${kind:02X} at ${address:04X}")]
    UnknownPseudoOp { kind: u8, address: u16 },

    /// Any other failure while executing at `address`.
    #[error("execution failed at ${address:04X}: {message}")]
    ExecutionFailure { address: u16, message: String },
}

impl ExecutionError {
    /// Address of the instruction that failed.
    pub fn address(&self) -> u16 {
        match self {
            ExecutionError::IllegalOpcode { address, .. }
            | ExecutionError::UnknownPseudoOp { address, .. }
            | ExecutionError::ExecutionFailure { address, .. } => *address,
        }
    }
}

/// Errors returned by [`Simulator`](crate::Simulator) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulatorError {
    /// The operation is not allowed in the current execution state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: ExecutionState,
    },

    /// Instruction execution failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Source did not assemble.
    #[error(transparent)]
    Assembly(#[from] AssemblerError),
}
