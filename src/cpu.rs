//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the 6502 processor state and
//! the fetch-decode-execute step.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: Accumulator (A), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of next instruction
//! - **Stack pointer** (SP): 8-bit offset into stack page (0x0100-0x01FF)
//! - **Status flags**: N, V, B, D, I, Z, C (individual bool fields)
//! - **Instruction counter**: number of instructions executed since reset
//!
//! ## Execution Model
//!
//! `step()` executes exactly one instruction. Instructions are atomic: either
//! the whole instruction is applied or, on error, nothing is. Higher level
//! lifecycle (batches, run/stop, breakpoints) lives in [`crate::Simulator`].

use crate::instructions::{self, PseudoOp};
use crate::opcodes::{lookup, Mnemonic};
use crate::{AddressingMode, ExecutionError, MemoryBus};
use log::trace;
use std::fmt;

/// Default program origin used by the assembler and by `CPU::reset`.
pub const DEFAULT_ORIGIN: u16 = 0x0600;

/// Base address of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

/// Power-up value of the stack pointer.
pub const STACK_RESET: u8 = 0xFF;

/// Side effect of an executed instruction that the host must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ordinary instruction.
    None,
    /// `BRK` executed; the program has halted.
    Break,
    /// `SYS` executed; the host should perform the requested I/O.
    PseudoOp(PseudoOp),
}

/// Outcome of a single successful [`CPU::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Address the instruction was fetched from.
    pub address: u16,
    /// Opcode byte.
    pub opcode: u8,
    /// Decoded mnemonic.
    pub mnemonic: Mnemonic,
    /// Host-visible side effect.
    pub effect: Effect,
    /// True if the stack pointer wrapped past either end of the stack page.
    pub stack_wrapped: bool,
}

/// Copy of the programmer-visible CPU state.
///
/// # Examples
///
/// ```
/// use sim6502::{Memory, CPU};
///
/// let cpu = CPU::new(Memory::new());
/// let snap = cpu.snapshot();
/// assert_eq!(snap.pc, 0x0600);
/// assert_eq!(
///     snap.to_string(),
///     "A=$00 X=$00 Y=$00 SP=$FF PC=$0600 P=$20 [nv-bdizc]"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub instructions: u64,
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: String = "NV-BDIZC"
            .chars()
            .enumerate()
            .map(|(i, name)| {
                let set = self.status & (0x80 >> i) != 0;
                if name == '-' || set {
                    name
                } else {
                    name.to_ascii_lowercase()
                }
            })
            .collect();
        write!(
            f,
            "A=${:02X} X=${:02X} Y=${:02X} SP=${:02X} PC=${:04X} P=${:02X} [{}]",
            self.a, self.x, self.y, self.sp, self.pc, self.status, flags
        )
    }
}

/// 6502 CPU state and execution context.
///
/// The CPU struct contains all processor state including registers, flags, program counter,
/// stack pointer, and instruction counter. It is generic over the memory implementation via the
/// `MemoryBus` trait.
///
/// # Type Parameters
///
/// * `M` - Memory bus implementation (must implement `MemoryBus` trait)
///
/// # Examples
///
/// ```
/// use sim6502::{Memory, CPU};
///
/// let mut memory = Memory::new();
/// memory.load(0x0600, &[0xA9, 0x42]); // LDA #$42
///
/// let mut cpu = CPU::new(memory);
/// cpu.step().unwrap();
///
/// assert_eq!(cpu.a(), 0x42);
/// assert_eq!(cpu.pc(), 0x0602);
/// assert_eq!(cpu.sp(), 0xFF);
/// ```
pub struct CPU<M: MemoryBus> {
    /// Accumulator register
    pub(crate) a: u8,

    /// X index register
    pub(crate) x: u8,

    /// Y index register
    pub(crate) y: u8,

    /// Program counter (address of next instruction)
    pub(crate) pc: u16,

    /// Stack pointer (0x0100 + sp gives full stack address)
    pub(crate) sp: u8,

    /// Negative flag (set if bit 7 of result is 1)
    pub(crate) flag_n: bool,

    /// Overflow flag (set on signed overflow)
    pub(crate) flag_v: bool,

    /// Break flag (set when BRK instruction executed)
    pub(crate) flag_b: bool,

    /// Decimal mode flag (stored only, arithmetic stays binary)
    pub(crate) flag_d: bool,

    /// Interrupt disable flag
    pub(crate) flag_i: bool,

    /// Zero flag (set if result is zero)
    pub(crate) flag_z: bool,

    /// Carry flag (set on unsigned overflow/underflow)
    pub(crate) flag_c: bool,

    /// Instructions executed since the last reset
    pub(crate) instructions: u64,

    /// Address PC returns to on reset
    pub(crate) origin: u16,

    /// Set by push/pull when SP wraps during the current step
    pub(crate) stack_wrapped: bool,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a new CPU in the power-up state with PC at [`DEFAULT_ORIGIN`].
    pub fn new(memory: M) -> Self {
        Self::with_origin(memory, DEFAULT_ORIGIN)
    }

    /// Creates a new CPU whose PC starts (and resets) at `origin`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sim6502::{Memory, CPU};
    ///
    /// let cpu = CPU::with_origin(Memory::new(), 0xC000);
    /// assert_eq!(cpu.pc(), 0xC000);
    /// ```
    pub fn with_origin(memory: M, origin: u16) -> Self {
        Self {
            a: 0x00,
            x: 0x00,
            y: 0x00,
            pc: origin,
            sp: STACK_RESET,
            flag_n: false,
            flag_v: false,
            flag_b: false,
            flag_d: false,
            flag_i: false,
            flag_z: false,
            flag_c: false,
            instructions: 0,
            origin,
            stack_wrapped: false,
            memory,
        }
    }

    /// Restores the power-up register state.
    ///
    /// A, X and Y are zeroed, SP is 0xFF, every flag is cleared and PC
    /// returns to the origin. Memory is untouched. Calling this twice is the
    /// same as calling it once.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = STACK_RESET;
        self.set_status(0);
        self.pc = self.origin;
        self.instructions = 0;
        self.stack_wrapped = false;
    }

    /// Executes one instruction and advances the CPU state.
    ///
    /// Performs the fetch-decode-execute cycle:
    /// 1. Fetch opcode byte at current PC
    /// 2. Look up instruction metadata in the opcode table
    /// 3. Execute the instruction, which advances or replaces PC
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::IllegalOpcode`] if the byte at PC has no table entry
    /// - [`ExecutionError::UnknownPseudoOp`] for a `SYS` with an unknown type
    ///
    /// In both cases the CPU state is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use sim6502::{Effect, ExecutionError, Memory, CPU};
    ///
    /// let mut memory = Memory::new();
    /// memory.load(0x0600, &[0xEA, 0x00, 0xFF]); // NOP, BRK, illegal
    ///
    /// let mut cpu = CPU::new(memory);
    /// assert_eq!(cpu.step().unwrap().effect, Effect::None);
    /// assert_eq!(cpu.step().unwrap().effect, Effect::Break);
    /// assert_eq!(
    ///     cpu.step(),
    ///     Err(ExecutionError::IllegalOpcode { opcode: 0xFF, address: 0x0602 })
    /// );
    /// ```
    pub fn step(&mut self) -> Result<Step, ExecutionError> {
        let address = self.pc;
        let opcode = self.memory.read(address);

        let metadata = lookup(opcode).ok_or(ExecutionError::IllegalOpcode { opcode, address })?;

        self.stack_wrapped = false;
        let effect = instructions::execute(self, metadata)?;
        self.instructions += 1;

        trace!(
            "${:04X}: {} ({}) -> {}",
            address,
            metadata.mnemonic,
            metadata.addressing_mode,
            self.snapshot()
        );

        Ok(Step {
            address,
            opcode,
            mnemonic: metadata.mnemonic,
            effect,
            stack_wrapped: self.stack_wrapped,
        })
    }

    // ========== Operand Resolution ==========

    /// Reads the byte operand following the opcode.
    pub(crate) fn operand_byte(&self) -> u8 {
        self.memory.read(self.pc.wrapping_add(1))
    }

    /// Reads the little-endian word operand following the opcode.
    pub(crate) fn operand_word(&self) -> u16 {
        self.memory.read_word(self.pc.wrapping_add(1))
    }

    /// Reads a pointer stored in zero page; the high byte wraps within page zero.
    fn zero_page_pointer(&self, zp: u8) -> u16 {
        let lo = self.memory.read(zp as u16) as u16;
        let hi = self.memory.read(zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Computes the effective address for memory-referencing addressing modes.
    ///
    /// Zero page indexed modes wrap within page zero. `Indirect` reproduces the
    /// NMOS bug where a pointer at $xxFF takes its high byte from $xx00.
    pub(crate) fn effective_address(&self, mode: AddressingMode) -> Result<u16, ExecutionError> {
        let addr = match mode {
            AddressingMode::ZeroPage => self.operand_byte() as u16,
            AddressingMode::ZeroPageX => self.operand_byte().wrapping_add(self.x) as u16,
            AddressingMode::ZeroPageY => self.operand_byte().wrapping_add(self.y) as u16,
            AddressingMode::Absolute => self.operand_word(),
            AddressingMode::AbsoluteX => self.operand_word().wrapping_add(self.x as u16),
            AddressingMode::AbsoluteY => self.operand_word().wrapping_add(self.y as u16),
            AddressingMode::Indirect => {
                let ptr = self.operand_word();
                let lo = self.memory.read(ptr) as u16;
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = self.memory.read(hi_addr) as u16;
                (hi << 8) | lo
            }
            AddressingMode::IndirectX => {
                self.zero_page_pointer(self.operand_byte().wrapping_add(self.x))
            }
            AddressingMode::IndirectY => self
                .zero_page_pointer(self.operand_byte())
                .wrapping_add(self.y as u16),
            AddressingMode::Relative => {
                let offset = self.operand_byte() as i8;
                self.pc.wrapping_add(2).wrapping_add_signed(offset as i16)
            }
            AddressingMode::Implicit | AddressingMode::Accumulator | AddressingMode::Immediate => {
                return Err(ExecutionError::ExecutionFailure {
                    address: self.pc,
                    message: format!("{} mode has no effective address", mode),
                })
            }
        };
        Ok(addr)
    }

    /// Returns the value an instruction operates on.
    pub(crate) fn operand_value(&self, mode: AddressingMode) -> Result<u8, ExecutionError> {
        match mode {
            AddressingMode::Immediate => Ok(self.operand_byte()),
            AddressingMode::Accumulator => Ok(self.a),
            _ => self
                .effective_address(mode)
                .map(|addr| self.memory.read(addr)),
        }
    }

    /// Updates Z and N from `value`.
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.flag_z = value == 0;
        self.flag_n = (value & 0x80) != 0;
    }

    /// Moves PC past the current instruction.
    pub(crate) fn advance(&mut self, size_bytes: u8) {
        self.pc = self.pc.wrapping_add(size_bytes as u16);
    }

    // ========== Stack ==========

    /// Pushes a byte at 0x0100 + SP and decrements SP with 8-bit wraparound.
    pub(crate) fn push(&mut self, value: u8) {
        if self.sp == 0x00 {
            self.stack_wrapped = true;
        }
        self.memory.write(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Increments SP with 8-bit wraparound and reads the byte at 0x0100 + SP.
    pub(crate) fn pull(&mut self) -> u8 {
        if self.sp == 0xFF {
            self.stack_wrapped = true;
        }
        self.sp = self.sp.wrapping_add(1);
        self.memory.read(STACK_BASE | self.sp as u16)
    }

    pub(crate) fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    pub(crate) fn pull_word(&mut self) -> u16 {
        let lo = self.pull() as u16;
        let hi = self.pull() as u16;
        (hi << 8) | lo
    }

    // ========== Register Getters ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer value.
    ///
    /// Note: The full stack address is 0x0100 + SP. The stack grows downward from 0x01FF.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns the address PC is set to on reset.
    pub fn origin(&self) -> u16 {
        self.origin
    }

    /// Returns the number of instructions executed since the last reset.
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Returns the status register as a packed byte.
    ///
    /// Bit layout (NV-BDIZC):
    /// - Bit 7: N (Negative)
    /// - Bit 6: V (Overflow)
    /// - Bit 5: (unused, always 1)
    /// - Bit 4: B (Break)
    /// - Bit 3: D (Decimal)
    /// - Bit 2: I (Interrupt Disable)
    /// - Bit 1: Z (Zero)
    /// - Bit 0: C (Carry)
    ///
    /// # Examples
    ///
    /// ```
    /// use sim6502::{Memory, CPU};
    ///
    /// let mut cpu = CPU::new(Memory::new());
    /// assert_eq!(cpu.status(), 0b0010_0000);
    ///
    /// cpu.set_flag_c(true);
    /// cpu.set_flag_n(true);
    /// assert_eq!(cpu.status(), 0b1010_0001);
    /// ```
    pub fn status(&self) -> u8 {
        let mut status: u8 = 0b00100000; // Bit 5 always 1

        if self.flag_n {
            status |= 0b10000000;
        }
        if self.flag_v {
            status |= 0b01000000;
        }
        if self.flag_b {
            status |= 0b00010000;
        }
        if self.flag_d {
            status |= 0b00001000;
        }
        if self.flag_i {
            status |= 0b00000100;
        }
        if self.flag_z {
            status |= 0b00000010;
        }
        if self.flag_c {
            status |= 0b00000001;
        }

        status
    }

    /// Unpacks a status byte into the individual flags. Bit 5 is ignored.
    pub fn set_status(&mut self, value: u8) {
        self.flag_n = value & 0b10000000 != 0;
        self.flag_v = value & 0b01000000 != 0;
        self.flag_b = value & 0b00010000 != 0;
        self.flag_d = value & 0b00001000 != 0;
        self.flag_i = value & 0b00000100 != 0;
        self.flag_z = value & 0b00000010 != 0;
        self.flag_c = value & 0b00000001 != 0;
    }

    /// Captures registers, status and instruction count.
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status(),
            instructions: self.instructions,
        }
    }

    // ========== Status Flag Getters ==========

    /// Returns true if the Negative flag is set.
    pub fn flag_n(&self) -> bool {
        self.flag_n
    }

    /// Returns true if the Overflow flag is set.
    pub fn flag_v(&self) -> bool {
        self.flag_v
    }

    /// Returns true if the Break flag is set.
    pub fn flag_b(&self) -> bool {
        self.flag_b
    }

    /// Returns true if the Decimal mode flag is set.
    pub fn flag_d(&self) -> bool {
        self.flag_d
    }

    /// Returns true if the Interrupt Disable flag is set.
    pub fn flag_i(&self) -> bool {
        self.flag_i
    }

    /// Returns true if the Zero flag is set.
    pub fn flag_z(&self) -> bool {
        self.flag_z
    }

    /// Returns true if the Carry flag is set.
    pub fn flag_c(&self) -> bool {
        self.flag_c
    }

    // ========== Setters ==========

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    /// Sets PC directly without executing anything.
    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Changes the reset origin. PC is not moved.
    pub fn set_origin(&mut self, origin: u16) {
        self.origin = origin;
    }

    pub fn set_flag_n(&mut self, value: bool) {
        self.flag_n = value;
    }

    pub fn set_flag_v(&mut self, value: bool) {
        self.flag_v = value;
    }

    pub fn set_flag_b(&mut self, value: bool) {
        self.flag_b = value;
    }

    pub fn set_flag_d(&mut self, value: bool) {
        self.flag_d = value;
    }

    pub fn set_flag_i(&mut self, value: bool) {
        self.flag_i = value;
    }

    pub fn set_flag_z(&mut self, value: bool) {
        self.flag_z = value;
    }

    pub fn set_flag_c(&mut self, value: bool) {
        self.flag_c = value;
    }

    // ========== Memory Access ==========

    /// Returns a shared reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}

impl<M: MemoryBus> fmt::Debug for CPU<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CPU")
            .field("state", &self.snapshot())
            .field("origin", &self.origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Memory;

    fn cpu_with(program: &[u8]) -> CPU<Memory> {
        let mut memory = Memory::new();
        memory.load(DEFAULT_ORIGIN, program);
        CPU::new(memory)
    }

    #[test]
    fn test_cpu_initialization() {
        let cpu = CPU::new(Memory::new());

        assert_eq!(cpu.pc(), 0x0600);
        assert_eq!(cpu.sp(), 0xFF);
        assert_eq!(cpu.a(), 0x00);
        assert_eq!(cpu.x(), 0x00);
        assert_eq!(cpu.y(), 0x00);
        assert_eq!(cpu.instructions(), 0);
        assert_eq!(cpu.status(), 0x20);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut cpu = cpu_with(&[0xA9, 0x80, 0xAA, 0x48]);
        for _ in 0..3 {
            cpu.step().unwrap();
        }
        cpu.set_flag_d(true);

        cpu.reset();
        let once = cpu.snapshot();
        cpu.reset();
        assert_eq!(cpu.snapshot(), once);
        assert_eq!(once.pc, 0x0600);
        assert_eq!(once.sp, 0xFF);
        assert_eq!(once.status, 0x20);
    }

    #[test]
    fn test_illegal_opcode_leaves_state() {
        let mut cpu = cpu_with(&[0xFF]);
        cpu.set_a(0x12);
        let before = cpu.snapshot();

        let err = cpu.step().unwrap_err();
        assert_eq!(
            err,
            ExecutionError::IllegalOpcode {
                opcode: 0xFF,
                address: 0x0600
            }
        );
        assert_eq!(cpu.snapshot(), before);
    }

    #[test]
    fn test_indirect_page_wrap_bug() {
        // JMP ($02FF) reads the high byte from $0200, not $0300
        let mut cpu = cpu_with(&[0x6C, 0xFF, 0x02]);
        cpu.memory_mut().set(0x02FF, 0x34);
        cpu.memory_mut().set(0x0200, 0x12);
        cpu.memory_mut().set(0x0300, 0x99);

        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x1234);
    }

    #[test]
    fn test_zero_page_x_wraps() {
        // LDA $F0,X with X=$20 reads $0010
        let mut cpu = cpu_with(&[0xB5, 0xF0]);
        cpu.set_x(0x20);
        cpu.memory_mut().set(0x0010, 0x77);
        cpu.memory_mut().set(0x0110, 0x11);

        cpu.step().unwrap();
        assert_eq!(cpu.a(), 0x77);
    }

    #[test]
    fn test_indirect_y_pointer_wraps_in_zero_page() {
        // LDA ($FF),Y: pointer low at $FF, high at $00
        let mut cpu = cpu_with(&[0xB1, 0xFF]);
        cpu.memory_mut().set(0x00FF, 0x00);
        cpu.memory_mut().set(0x0000, 0x30);
        cpu.memory_mut().set(0x3005, 0xAB);
        cpu.set_y(0x05);

        cpu.step().unwrap();
        assert_eq!(cpu.a(), 0xAB);
    }

    #[test]
    fn test_stack_wrap_is_reported() {
        // PHA with SP=0
        let mut cpu = cpu_with(&[0x48, 0x68]);
        cpu.set_sp(0x00);
        cpu.set_a(0x5A);

        let step = cpu.step().unwrap();
        assert!(step.stack_wrapped);
        assert_eq!(cpu.sp(), 0xFF);
        assert_eq!(cpu.memory().get(0x0100), 0x5A);

        // PLA with SP=$FF wraps back to 0
        let step = cpu.step().unwrap();
        assert!(step.stack_wrapped);
        assert_eq!(cpu.sp(), 0x00);
        assert_eq!(cpu.a(), 0x5A);
    }

    #[test]
    fn test_snapshot_display() {
        let mut cpu = CPU::new(Memory::new());
        cpu.set_a(0xFF);
        cpu.set_flag_n(true);
        cpu.set_flag_c(true);
        assert_eq!(
            cpu.snapshot().to_string(),
            "A=$FF X=$00 Y=$00 SP=$FF PC=$0600 P=$A1 [Nv-bdizC]"
        );
    }
}
