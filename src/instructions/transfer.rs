//! # Register Transfer Instructions
//!
//! This module implements register transfer operations:
//! - TAX: Transfer Accumulator to X
//! - TAY: Transfer Accumulator to Y
//! - TXA: Transfer X to Accumulator
//! - TYA: Transfer Y to Accumulator
//! - TSX: Transfer Stack Pointer to X
//! - TXS: Transfer X to Stack Pointer

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes a register transfer.
///
/// Every transfer updates Z and N from the copied value, except TXS which
/// affects no flags.
pub(crate) fn execute_transfer<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
) -> Result<(), ExecutionError> {
    let value = match metadata.mnemonic {
        Mnemonic::Tax => {
            cpu.x = cpu.a;
            Some(cpu.x)
        }
        Mnemonic::Tay => {
            cpu.y = cpu.a;
            Some(cpu.y)
        }
        Mnemonic::Txa => {
            cpu.a = cpu.x;
            Some(cpu.a)
        }
        Mnemonic::Tya => {
            cpu.a = cpu.y;
            Some(cpu.a)
        }
        Mnemonic::Tsx => {
            cpu.x = cpu.sp;
            Some(cpu.x)
        }
        Mnemonic::Txs => {
            cpu.sp = cpu.x;
            None
        }
        other => {
            return Err(ExecutionError::ExecutionFailure {
                address: cpu.pc,
                message: format!("{} is not a transfer", other),
            })
        }
    };

    if let Some(value) = value {
        cpu.set_zn(value);
    }
    cpu.advance(metadata.size_bytes);
    Ok(())
}
