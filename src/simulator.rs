//! Simulator session: execution lifecycle, debugger and event fan-out.
//!
//! A [`Simulator`] owns the CPU, its memory, the assembler and everything a
//! host needs to drive a program: the execution state machine, breakpoints,
//! a stop flag and the notification dispatcher. There is no process-wide
//! state, so several sessions can coexist.
//!
//! ```text
//! Initialized --assemble--> Ready --run--> Running --+--> Stopped
//!                             |                      +--> Completed
//!                             +--enable_debugger--> DebuggingPaused <--> Debugging
//! ```
//!
//! Execution is cooperative. [`Simulator::run`] loops over batches until the
//! program ends or a stop is requested. Hosts with their own event loop call
//! [`Simulator::start`] once and then [`Simulator::run_slice`] per tick.
//!
//! # Examples
//!
//! ```
//! use sim6502::{ExecutionState, Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::default());
//! sim.assemble("LDX #$05\nloop: DEX\n  BNE loop\n  BRK").unwrap();
//!
//! assert_eq!(sim.run().unwrap(), ExecutionState::Completed);
//! assert_eq!(sim.cpu().x(), 0);
//! ```

use crate::assembler::{Assembler, AssemblerError, AssemblerOutput, Symbol, SymbolTable};
use crate::config::SimulatorConfig;
use crate::cpu::{CpuSnapshot, Effect, Step, CPU};
use crate::disassembler::{self, formatter::format_listing, InstructionData};
use crate::error::{ExecutionError, SimulatorError};
use crate::events::{Dispatcher, ListenerId, Notification};
use crate::instructions::PseudoOp;
use crate::memory::{Memory, MemoryEvent, MemoryEventKind};
use log::{debug, error, info, warn};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionState {
    /// Nothing runnable has been assembled or loaded.
    Initialized,
    /// A program is loaded and registers are at their reset values.
    Ready,
    /// Executing batches.
    Running,
    /// Halted by a stop request, the batch limit or a failure.
    Stopped,
    /// The program executed `BRK` or left its address range.
    Completed,
    /// Executing batches with breakpoints armed.
    Debugging,
    /// Paused in the debugger, waiting for a step or run.
    DebuggingPaused,
}

impl ExecutionState {
    /// True while batches are being executed.
    pub fn is_running(self) -> bool {
        matches!(self, ExecutionState::Running | ExecutionState::Debugging)
    }

    /// True when breakpoints are armed.
    pub fn is_debugging(self) -> bool {
        matches!(
            self,
            ExecutionState::Debugging | ExecutionState::DebuggingPaused
        )
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionState::Initialized => "initialized",
            ExecutionState::Ready => "ready",
            ExecutionState::Running => "running",
            ExecutionState::Stopped => "stopped",
            ExecutionState::Completed => "completed",
            ExecutionState::Debugging => "debugging",
            ExecutionState::DebuggingPaused => "paused in debugger",
        })
    }
}

/// Kinds of simulator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Step,
    MultiStep,
    Reset,
    Stop,
    Goto,
    PseudoOp,
    SimulatorInfo,
    SimulatorFailure,
    AssembleSuccess,
    AssembleFailure,
    AssembleInfo,
    Hexdump,
    Disassembly,
    LabelsInfo,
    LabelsFailure,
}

impl EventKind {
    pub const ALL: [EventKind; 16] = [
        EventKind::Start,
        EventKind::Step,
        EventKind::MultiStep,
        EventKind::Reset,
        EventKind::Stop,
        EventKind::Goto,
        EventKind::PseudoOp,
        EventKind::SimulatorInfo,
        EventKind::SimulatorFailure,
        EventKind::AssembleSuccess,
        EventKind::AssembleFailure,
        EventKind::AssembleInfo,
        EventKind::Hexdump,
        EventKind::Disassembly,
        EventKind::LabelsInfo,
        EventKind::LabelsFailure,
    ];

    /// Wire name of the notification.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Step => "step",
            EventKind::MultiStep => "multistep",
            EventKind::Reset => "reset",
            EventKind::Stop => "stop",
            EventKind::Goto => "goto",
            EventKind::PseudoOp => "pseudo-op",
            EventKind::SimulatorInfo => "simulator-info",
            EventKind::SimulatorFailure => "simulator-failure",
            EventKind::AssembleSuccess => "assemble-success",
            EventKind::AssembleFailure => "assemble-failure",
            EventKind::AssembleInfo => "assemble-info",
            EventKind::Hexdump => "hexdump",
            EventKind::Disassembly => "disassembly",
            EventKind::LabelsInfo => "labels-info",
            EventKind::LabelsFailure => "labels-failure",
        }
    }
}

/// Notification dispatched by a [`Simulator`].
///
/// CPU-side events carry a snapshot of the registers taken after the
/// operation.
#[derive(Debug, Clone)]
pub enum Event {
    Start(CpuSnapshot),
    /// One instruction executed by [`Simulator::step`].
    Step { snapshot: CpuSnapshot, step: Step },
    /// A batch finished.
    MultiStep {
        snapshot: CpuSnapshot,
        summary: BatchSummary,
    },
    Reset(CpuSnapshot),
    Stop(CpuSnapshot),
    Goto(CpuSnapshot),
    /// A `SYS` instruction asks the host for I/O. `output` holds the text to
    /// print, or `None` for a prompt.
    PseudoOp {
        snapshot: CpuSnapshot,
        op: PseudoOp,
        output: Option<String>,
    },
    /// Warnings and status messages such as stack wraps or program end.
    SimulatorInfo {
        snapshot: CpuSnapshot,
        message: String,
    },
    SimulatorFailure {
        snapshot: CpuSnapshot,
        error: ExecutionError,
    },
    AssembleSuccess { start: u16, length: usize },
    AssembleFailure(AssemblerError),
    AssembleInfo(String),
    Hexdump(String),
    Disassembly(String),
    LabelsInfo(Vec<Symbol>),
    LabelsFailure(AssemblerError),
}

impl Notification for Event {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            Event::Start(_) => EventKind::Start,
            Event::Step { .. } => EventKind::Step,
            Event::MultiStep { .. } => EventKind::MultiStep,
            Event::Reset(_) => EventKind::Reset,
            Event::Stop(_) => EventKind::Stop,
            Event::Goto(_) => EventKind::Goto,
            Event::PseudoOp { .. } => EventKind::PseudoOp,
            Event::SimulatorInfo { .. } => EventKind::SimulatorInfo,
            Event::SimulatorFailure { .. } => EventKind::SimulatorFailure,
            Event::AssembleSuccess { .. } => EventKind::AssembleSuccess,
            Event::AssembleFailure(_) => EventKind::AssembleFailure,
            Event::AssembleInfo(_) => EventKind::AssembleInfo,
            Event::Hexdump(_) => EventKind::Hexdump,
            Event::Disassembly(_) => EventKind::Disassembly,
            Event::LabelsInfo(_) => EventKind::LabelsInfo,
            Event::LabelsFailure(_) => EventKind::LabelsFailure,
        }
    }
}

/// One-line rendering for consoles and logs.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Start(s) | Event::Reset(s) | Event::Stop(s) | Event::Goto(s) => write!(f, "{}", s),
            Event::Step { snapshot, step } => {
                write!(f, "${:04X} {}  {}", step.address, step.mnemonic, snapshot)
            }
            Event::MultiStep { snapshot, summary } => {
                write!(f, "{} instructions ({:?})  {}", summary.executed, summary.end, snapshot)
            }
            Event::PseudoOp { output, op, .. } => match output {
                Some(text) => f.write_str(text),
                None => write!(f, "{}", op),
            },
            Event::SimulatorInfo { message, .. } => f.write_str(message),
            Event::SimulatorFailure { error, .. } => write!(f, "{}", error),
            Event::AssembleSuccess { start, length } => {
                write!(f, "{} bytes at ${:04X}", length, start)
            }
            Event::AssembleFailure(err) | Event::LabelsFailure(err) => write!(f, "{}", err),
            Event::AssembleInfo(text) | Event::Hexdump(text) | Event::Disassembly(text) => {
                f.write_str(text)
            }
            Event::LabelsInfo(symbols) => {
                write!(f, "Found {} symbol(s).", symbols.len())?;
                for symbol in symbols {
                    write!(f, "\n{}: ${:04X}", symbol.name, symbol.value)?;
                }
                Ok(())
            }
        }
    }
}

/// Requests that a running simulator stop at the next instruction boundary.
///
/// Handles are cheap to clone and can be moved into event listeners.
///
/// # Examples
///
/// ```
/// use sim6502::{EventKind, ExecutionState, Simulator, SimulatorConfig};
///
/// let mut sim = Simulator::new(SimulatorConfig::default().with_batch_size(10));
/// sim.assemble("loop: JMP loop").unwrap();
///
/// let handle = sim.stop_handle();
/// sim.subscribe(EventKind::MultiStep, move |_| handle.request_stop());
///
/// assert_eq!(sim.run().unwrap(), ExecutionState::Stopped);
/// assert_eq!(sim.cpu().instructions(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    fn take(&self) -> bool {
        self.0.replace(false)
    }

    fn clear(&self) {
        self.0.set(false);
    }
}

/// Address range of the loaded program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramRange {
    pub start: u16,
    pub length: usize,
}

impl ProgramRange {
    /// Returns true if `address` lies inside the program.
    pub fn contains(&self, address: u16) -> bool {
        (address.wrapping_sub(self.start) as usize) < self.length
    }
}

/// Result of [`Simulator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub step: Step,
    pub snapshot: CpuSnapshot,
    /// State after the step.
    pub state: ExecutionState,
}

/// Why a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchEnd {
    /// The instruction budget was used up.
    BudgetExhausted,
    /// The program completed.
    Completed,
    /// A stop was requested.
    StopRequested,
    /// Execution paused before the instruction at this address.
    Breakpoint(u16),
}

/// Result of a batch of instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Instructions executed in this batch.
    pub executed: usize,
    pub end: BatchEnd,
}

/// A simulator session.
pub struct Simulator {
    config: SimulatorConfig,
    cpu: CPU<Memory>,
    assembler: Assembler,
    state: ExecutionState,
    program: Option<ProgramRange>,
    breakpoints: BTreeSet<u16>,
    stop: StopHandle,
    batches_run: usize,
    events: Dispatcher<Event>,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let cpu = CPU::with_origin(Memory::new(), config.origin);
        let assembler = Assembler::with_origin(config.origin);
        Simulator {
            config,
            cpu,
            assembler,
            state: ExecutionState::Initialized,
            program: None,
            breakpoints: BTreeSet::new(),
            stop: StopHandle::default(),
            batches_run: 0,
            events: Dispatcher::new(),
        }
    }

    // ========== Accessors ==========

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn cpu(&self) -> &CPU<Memory> {
        &self.cpu
    }

    /// Mutable CPU access for hosts that edit registers between steps.
    pub fn cpu_mut(&mut self) -> &mut CPU<Memory> {
        &mut self.cpu
    }

    pub fn memory(&self) -> &Memory {
        self.cpu.memory()
    }

    /// Mutable memory access, used to answer prompts or poke input bytes.
    pub fn memory_mut(&mut self) -> &mut Memory {
        self.cpu.memory_mut()
    }

    /// Range of the last assembled or loaded program.
    pub fn program(&self) -> Option<ProgramRange> {
        self.program
    }

    /// Symbols of the last successful assembly.
    pub fn symbols(&self) -> &SymbolTable {
        self.assembler.symbols()
    }

    /// Returns a handle that can request a stop from inside a listener.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    // ========== Events ==========

    /// Registers a listener for simulator notifications of `kind`.
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Registers a listener for memory notifications of `kind`.
    pub fn subscribe_memory<F>(&mut self, kind: MemoryEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&MemoryEvent) + 'static,
    {
        self.cpu.memory_mut().subscribe(kind, listener)
    }

    pub fn unsubscribe_memory(&mut self, id: ListenerId) -> bool {
        self.cpu.memory_mut().unsubscribe(id)
    }

    fn notify(&mut self, event: Event) {
        self.events.dispatch(&event);
    }

    fn info(&mut self, message: String) {
        let snapshot = self.cpu.snapshot();
        self.notify(Event::SimulatorInfo { snapshot, message });
    }

    fn set_state(&mut self, state: ExecutionState) {
        if self.state != state {
            info!("{} -> {}", self.state, state);
            self.state = state;
        }
    }

    fn require(&self, allowed: &[ExecutionState], operation: &'static str) -> Result<(), SimulatorError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SimulatorError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    // ========== Loading ==========

    /// Assembles `source` at the configured origin.
    ///
    /// On success the registers are reset and the session is `Ready`. On
    /// failure nothing is runnable and the session is `Initialized`.
    pub fn assemble(&mut self, source: &str) -> Result<AssemblerOutput, SimulatorError> {
        if self.config.clear_memory_on_assemble {
            self.cpu.memory_mut().reset();
        }
        self.assembler.set_origin(self.config.origin);

        match self.assembler.assemble(source, self.cpu.memory_mut()) {
            Ok(output) => {
                self.program = Some(ProgramRange {
                    start: output.start,
                    length: output.length,
                });
                self.cpu.set_origin(self.config.origin);
                self.prepare();
                info!(
                    "assembled {} bytes at ${:04X}",
                    output.length, output.start
                );

                self.notify(Event::LabelsInfo(output.symbols.symbols().to_vec()));
                for warning in &output.warnings {
                    warn!("line {}: {}", warning.line, warning.message);
                    let message = match warning.line {
                        0 => warning.message.clone(),
                        line => format!("line {}: {}", line, warning.message),
                    };
                    self.notify(Event::AssembleInfo(message));
                }
                self.notify(Event::AssembleInfo(format!(
                    "Code assembled successfully, {} bytes.",
                    output.length
                )));
                self.notify(Event::AssembleSuccess {
                    start: output.start,
                    length: output.length,
                });
                Ok(output)
            }
            Err(err) => {
                error!("assembly failed: {}", err);
                self.program = None;
                self.set_state(ExecutionState::Initialized);
                if err.is_label_error() {
                    self.notify(Event::LabelsFailure(err.clone()));
                }
                self.notify(Event::AssembleFailure(err.clone()));
                Err(err.into())
            }
        }
    }

    /// Loads a binary image at `origin` and makes it the program.
    ///
    /// Bytes that would run past `$FFFF` are dropped.
    pub fn load_program(&mut self, origin: u16, bytes: &[u8]) {
        let room = 0x10000 - origin as usize;
        let bytes = &bytes[..bytes.len().min(room)];

        self.cpu.memory_mut().load(origin, bytes);
        self.assembler.clear();
        self.config.origin = origin;
        self.assembler.set_origin(origin);
        self.cpu.set_origin(origin);
        self.program = Some(ProgramRange {
            start: origin,
            length: bytes.len(),
        });
        self.prepare();
        info!("loaded {} bytes at ${:04X}", bytes.len(), origin);

        self.notify(Event::AssembleInfo(format!(
            "Loaded {} bytes at ${:04X}.",
            bytes.len(),
            origin
        )));
        self.notify(Event::AssembleSuccess {
            start: origin,
            length: bytes.len(),
        });
    }

    fn prepare(&mut self) {
        self.cpu.reset();
        self.stop.clear();
        self.batches_run = 0;
        self.set_state(ExecutionState::Ready);
    }

    // ========== Execution ==========

    /// Executes one instruction and pauses in the debugger.
    ///
    /// Allowed from `Ready`, `Stopped` and `DebuggingPaused`. The session ends
    /// up `DebuggingPaused`, or `Completed` if the program ended.
    pub fn step(&mut self) -> Result<StepResult, SimulatorError> {
        use ExecutionState::*;
        self.require(&[Ready, Stopped, DebuggingPaused], "step")?;

        let (step, completed) = self.execute_one()?;
        if !completed {
            self.set_state(DebuggingPaused);
        }

        let snapshot = self.cpu.snapshot();
        self.notify(Event::Step { snapshot, step });
        Ok(StepResult {
            step,
            snapshot,
            state: self.state,
        })
    }

    /// Executes at most `budget` instructions.
    ///
    /// The batch ends early, between instructions, when the program
    /// completes, a stop is requested, or (while debugging) a breakpoint is
    /// reached at any instruction but the first. Exactly one
    /// [`Event::MultiStep`] is dispatched unless an instruction fails.
    ///
    /// Like [`step`](Self::step), a call from `Ready` or `Stopped` enters
    /// the debugger, so the session is `DebuggingPaused` afterwards unless
    /// the program completed.
    pub fn multi_step(&mut self, budget: usize) -> Result<BatchSummary, SimulatorError> {
        use ExecutionState::*;
        self.require(
            &[Ready, Stopped, Running, Debugging, DebuggingPaused],
            "multi-step",
        )?;
        if matches!(self.state, Ready | Stopped) {
            self.set_state(DebuggingPaused);
        }
        self.batch(budget, true)
    }

    fn batch(&mut self, budget: usize, skip_first_breakpoint: bool) -> Result<BatchSummary, SimulatorError> {
        let debugging = self.state.is_debugging();
        let mut executed = 0;
        let mut end = BatchEnd::BudgetExhausted;

        while executed < budget {
            if self.stop.take() {
                self.halt();
                end = BatchEnd::StopRequested;
                break;
            }

            let pc = self.cpu.pc();
            let armed = executed > 0 || !skip_first_breakpoint;
            if debugging && armed && self.breakpoints.contains(&pc) {
                info!("breakpoint at ${:04X}", pc);
                self.set_state(ExecutionState::DebuggingPaused);
                end = BatchEnd::Breakpoint(pc);
                break;
            }

            let (_, completed) = self.execute_one()?;
            executed += 1;
            if completed {
                end = BatchEnd::Completed;
                break;
            }
        }

        let summary = BatchSummary { executed, end };
        debug!("batch: {:?}", summary);
        let snapshot = self.cpu.snapshot();
        self.notify(Event::MultiStep { snapshot, summary });
        Ok(summary)
    }

    /// Executes one instruction and handles its side effects.
    ///
    /// Returns the step and whether the program completed.
    fn execute_one(&mut self) -> Result<(Step, bool), SimulatorError> {
        let step = match self.cpu.step() {
            Ok(step) => step,
            Err(err) => {
                error!("{}", err);
                self.set_state(ExecutionState::Stopped);
                let snapshot = self.cpu.snapshot();
                self.notify(Event::SimulatorFailure {
                    snapshot,
                    error: err.clone(),
                });
                return Err(err.into());
            }
        };

        if step.stack_wrapped {
            let message = format!(
                "Stack wrapped at ${:04X} (SP=${:02X})",
                step.address,
                self.cpu.sp()
            );
            warn!("{}", message);
            self.info(message);
        }

        let mut completed = false;
        match step.effect {
            Effect::None => {}
            Effect::Break => completed = true,
            Effect::PseudoOp(op) => {
                let output = op.render(self.cpu.memory());
                debug!("pseudo-op {} -> {:?}", op, output);
                let snapshot = self.cpu.snapshot();
                self.notify(Event::PseudoOp {
                    snapshot,
                    op,
                    output,
                });
            }
        }

        let pc = self.cpu.pc();
        if !completed && self.config.halt_outside_program {
            completed = self.program.is_some_and(|range| !range.contains(pc));
        }

        if completed {
            self.set_state(ExecutionState::Completed);
            self.info(format!("Program end at PC=${:04X}", pc));
        }

        Ok((step, completed))
    }

    /// Runs until the program completes, a stop is requested, a breakpoint is
    /// hit or the configured batch limit is reached.
    ///
    /// Returns the state the session ended in.
    pub fn run(&mut self) -> Result<ExecutionState, SimulatorError> {
        self.start()?;
        while self.state.is_running() {
            self.run_slice()?;
        }
        Ok(self.state)
    }

    /// Enters `Running` (or `Debugging` from `DebuggingPaused`) without
    /// executing anything. Follow with [`Simulator::run_slice`].
    pub fn start(&mut self) -> Result<(), SimulatorError> {
        let next = match self.state {
            ExecutionState::Ready | ExecutionState::Stopped => ExecutionState::Running,
            ExecutionState::DebuggingPaused => ExecutionState::Debugging,
            state => {
                return Err(SimulatorError::InvalidState {
                    operation: "run",
                    state,
                })
            }
        };

        self.stop.clear();
        self.batches_run = 0;
        self.set_state(next);
        let snapshot = self.cpu.snapshot();
        self.notify(Event::Start(snapshot));
        Ok(())
    }

    /// Executes one batch of a run started with [`Simulator::start`].
    ///
    /// Breakpoints are checked at every instruction except the very first
    /// one of the run, so resuming from a breakpoint moves past it.
    pub fn run_slice(&mut self) -> Result<BatchSummary, SimulatorError> {
        if !self.state.is_running() {
            return Err(SimulatorError::InvalidState {
                operation: "continue running",
                state: self.state,
            });
        }

        let summary = self.batch(self.config.batch_size, self.batches_run == 0)?;
        self.batches_run += 1;

        if let Some(max) = self.config.max_batches {
            if self.state.is_running() && self.batches_run >= max {
                info!("stopping after {} batches", self.batches_run);
                self.halt();
            }
        }

        Ok(summary)
    }

    /// Stops a run: `Running` becomes `Stopped`, `Debugging` becomes
    /// `DebuggingPaused`.
    pub fn stop(&mut self) -> Result<(), SimulatorError> {
        if !self.state.is_running() {
            return Err(SimulatorError::InvalidState {
                operation: "stop",
                state: self.state,
            });
        }
        self.halt();
        Ok(())
    }

    fn halt(&mut self) {
        let next = if self.state.is_debugging() {
            ExecutionState::DebuggingPaused
        } else {
            ExecutionState::Stopped
        };
        self.set_state(next);
        let snapshot = self.cpu.snapshot();
        self.notify(Event::Stop(snapshot));
    }

    /// Resets registers to their power-up values with PC at the origin.
    ///
    /// Memory is left alone. Allowed in every state but `Initialized`.
    pub fn reset(&mut self) -> Result<(), SimulatorError> {
        self.require(
            &[
                ExecutionState::Ready,
                ExecutionState::Running,
                ExecutionState::Stopped,
                ExecutionState::Completed,
                ExecutionState::Debugging,
                ExecutionState::DebuggingPaused,
            ],
            "reset",
        )?;
        self.prepare();
        let snapshot = self.cpu.snapshot();
        self.notify(Event::Reset(snapshot));
        Ok(())
    }

    /// Moves PC to `address`. Rejected while running.
    ///
    /// A completed program becomes `Stopped` so that it can be resumed.
    pub fn goto(&mut self, address: u16) -> Result<(), SimulatorError> {
        if self.state.is_running() {
            return Err(SimulatorError::InvalidState {
                operation: "goto",
                state: self.state,
            });
        }
        self.cpu.set_pc(address);
        if self.state == ExecutionState::Completed {
            self.set_state(ExecutionState::Stopped);
        }
        info!("goto ${:04X}", address);
        let snapshot = self.cpu.snapshot();
        self.notify(Event::Goto(snapshot));
        Ok(())
    }

    // ========== Debugger ==========

    /// Arms breakpoints. `Ready`/`Stopped` pause in the debugger, a run in
    /// progress continues as `Debugging`.
    pub fn enable_debugger(&mut self) -> Result<(), SimulatorError> {
        let next = match self.state {
            ExecutionState::Ready | ExecutionState::Stopped => ExecutionState::DebuggingPaused,
            ExecutionState::Running => ExecutionState::Debugging,
            ExecutionState::Debugging | ExecutionState::DebuggingPaused => return Ok(()),
            state => {
                return Err(SimulatorError::InvalidState {
                    operation: "enable the debugger",
                    state,
                })
            }
        };
        self.set_state(next);
        Ok(())
    }

    /// Disarms breakpoints. `DebuggingPaused` becomes `Ready`, `Debugging`
    /// becomes `Running`.
    pub fn disable_debugger(&mut self) -> Result<(), SimulatorError> {
        let next = match self.state {
            ExecutionState::DebuggingPaused => ExecutionState::Ready,
            ExecutionState::Debugging => ExecutionState::Running,
            state => {
                return Err(SimulatorError::InvalidState {
                    operation: "disable the debugger",
                    state,
                })
            }
        };
        self.set_state(next);
        Ok(())
    }

    /// Adds a breakpoint. Returns false if one was already set there.
    pub fn add_breakpoint(&mut self, address: u16) -> bool {
        self.breakpoints.insert(address)
    }

    /// Sets a breakpoint on the first instruction assembled from `line`.
    ///
    /// Returns the address, or `None` if the line produced no instruction.
    pub fn add_breakpoint_at_line(&mut self, line: usize) -> Option<u16> {
        let range = self.assembler.source_map().get_address_range(line)?;
        self.breakpoints.insert(range.start);
        Some(range.start)
    }

    pub fn remove_breakpoint(&mut self, address: u16) -> bool {
        self.breakpoints.remove(&address)
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    /// Breakpoint addresses in ascending order.
    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    /// Source line of the instruction at PC, if it was assembled from source.
    pub fn current_line(&self) -> Option<usize> {
        self.assembler.source_map().line_at(self.cpu.pc())
    }

    // ========== Inspection ==========

    /// Hex dump of `length` bytes at `start`.
    pub fn hexdump(&mut self, start: u16, length: usize) -> String {
        let dump = self.cpu.memory().format(start, length);
        self.notify(Event::Hexdump(dump.clone()));
        dump
    }

    /// Disassembles `length` bytes at `start`, naming known labels.
    pub fn disassemble(&mut self, start: u16, length: usize) -> Vec<InstructionData> {
        let listing = disassembler::disassemble(
            self.cpu.memory(),
            start,
            length,
            Some(self.assembler.symbols()),
        );
        if self.events.has_listeners(EventKind::Disassembly) {
            self.notify(Event::Disassembly(format_listing(&listing)));
        }
        listing
    }

    /// Hex dump of the last program.
    pub fn program_hexdump(&mut self) -> String {
        let (start, length) = self.program_bounds();
        self.hexdump(start, length)
    }

    /// Disassembly of the last program.
    pub fn program_disassembly(&mut self) -> Vec<InstructionData> {
        let (start, length) = self.program_bounds();
        self.disassemble(start, length)
    }

    fn program_bounds(&self) -> (u16, usize) {
        self.program
            .map_or((self.config.origin, 0), |range| (range.start, range.length))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("state", &self.state)
            .field("cpu", &self.cpu)
            .field("program", &self.program)
            .field("breakpoints", &self.breakpoints)
            .finish()
    }
}
