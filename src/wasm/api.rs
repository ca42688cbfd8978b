//! WASM API for the simulator.
//!
//! Provides JavaScript-callable interfaces for assembly, execution control,
//! state inspection and disassembly. Notifications are forwarded to two
//! JavaScript callbacks: `on_event(name, text)` for simulator events and
//! `on_memory(addr, value)` for memory writes.

use crate::{
    Event, EventKind, MemoryBus, MemoryEvent, MemoryEventKind, Simulator, SimulatorConfig,
    SimulatorError,
};
use wasm_bindgen::prelude::*;

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl From<SimulatorError> for JsError {
    fn from(err: SimulatorError) -> Self {
        JsError::new(&err.to_string())
    }
}

/// Result of assembly operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    machine_code: Vec<u8>,
    start_addr: u16,
    length: usize,
    error_message: Option<String>,
    error_line: Option<usize>,
    error_column: Option<usize>,
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn machine_code(&self) -> Vec<u8> {
        self.machine_code.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn start_addr(&self) -> u16 {
        self.start_addr
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.length
    }

    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }

    #[wasm_bindgen(getter)]
    pub fn error_column(&self) -> Option<usize> {
        self.error_column
    }
}

/// One disassembled instruction
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    address: u16,
    bytes: Vec<u8>,
    mnemonic: String,
    operand: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> u16 {
        self.address
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mnemonic(&self) -> String {
        self.mnemonic.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn operand(&self) -> String {
        self.operand.clone()
    }
}

/// Main simulator interface for JavaScript
#[wasm_bindgen]
pub struct Simulator6502 {
    sim: Simulator,
}

#[wasm_bindgen]
impl Simulator6502 {
    /// Create a session that reports to the given callbacks.
    #[wasm_bindgen(constructor)]
    pub fn new(on_event: js_sys::Function, on_memory: js_sys::Function) -> Self {
        let mut sim = Simulator::new(SimulatorConfig::default());

        for kind in EventKind::ALL {
            let callback = on_event.clone();
            sim.subscribe(kind, move |event: &Event| {
                let _ = callback.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(kind.name()),
                    &JsValue::from_str(&event.to_string()),
                );
            });
        }

        let changed = on_memory.clone();
        sim.subscribe_memory(MemoryEventKind::Changed, move |event: &MemoryEvent| {
            if let MemoryEvent::Changed { addr, value } = *event {
                let _ = changed.call2(&JsValue::NULL, &JsValue::from(addr), &JsValue::from(value));
            }
        });
        sim.subscribe_memory(MemoryEventKind::Cleared, move |_: &MemoryEvent| {
            let _ = on_memory.call0(&JsValue::NULL);
        });

        Simulator6502 { sim }
    }

    /// Assemble source at `$0600` and load it
    pub fn assemble(&mut self, source: String) -> AssemblyResult {
        match self.sim.assemble(&source) {
            Ok(output) => AssemblyResult {
                success: true,
                machine_code: output.bytes,
                start_addr: output.start,
                length: output.length,
                error_message: None,
                error_line: None,
                error_column: None,
            },
            Err(err) => {
                let (line, column) = match &err {
                    SimulatorError::Assembly(e) => (Some(e.line), Some(e.column)),
                    _ => (None, None),
                };
                AssemblyResult {
                    success: false,
                    machine_code: Vec::new(),
                    start_addr: self.sim.config().origin,
                    length: 0,
                    error_message: Some(err.to_string()),
                    error_line: line,
                    error_column: column,
                }
            }
        }
    }

    /// Load a binary program and make it runnable
    pub fn load_program(&mut self, program: &[u8], start_addr: u16) {
        self.sim.load_program(start_addr, program);
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<(), JsError> {
        self.sim.step()?;
        Ok(())
    }

    /// Execute up to `budget` instructions and return how many ran
    pub fn multi_step(&mut self, budget: u32) -> Result<u32, JsError> {
        Ok(self.sim.multi_step(budget as usize)?.executed as u32)
    }

    /// Enter the running state; drive it with `run_slice` from a timer
    pub fn start(&mut self) -> Result<(), JsError> {
        Ok(self.sim.start()?)
    }

    /// Execute one batch; returns false once the run is over
    pub fn run_slice(&mut self) -> Result<bool, JsError> {
        self.sim.run_slice()?;
        Ok(self.sim.state().is_running())
    }

    pub fn stop(&mut self) -> Result<(), JsError> {
        Ok(self.sim.stop()?)
    }

    pub fn reset(&mut self) -> Result<(), JsError> {
        Ok(self.sim.reset()?)
    }

    pub fn goto(&mut self, addr: u16) -> Result<(), JsError> {
        Ok(self.sim.goto(addr)?)
    }

    pub fn enable_debugger(&mut self) -> Result<(), JsError> {
        Ok(self.sim.enable_debugger()?)
    }

    pub fn disable_debugger(&mut self) -> Result<(), JsError> {
        Ok(self.sim.disable_debugger()?)
    }

    pub fn add_breakpoint(&mut self, addr: u16) -> bool {
        self.sim.add_breakpoint(addr)
    }

    pub fn remove_breakpoint(&mut self, addr: u16) -> bool {
        self.sim.remove_breakpoint(addr)
    }

    pub fn clear_breakpoints(&mut self) {
        self.sim.clear_breakpoints();
    }

    /// Current execution state as text
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.sim.state().to_string()
    }

    /// Source line of the instruction at PC
    #[wasm_bindgen(getter)]
    pub fn current_line(&self) -> Option<usize> {
        self.sim.current_line()
    }

    // Register getters
    #[wasm_bindgen(getter)]
    pub fn a(&self) -> u8 {
        self.sim.cpu().a()
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> u8 {
        self.sim.cpu().x()
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> u8 {
        self.sim.cpu().y()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.sim.cpu().pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u8 {
        self.sim.cpu().sp()
    }

    /// Status register with bit 5 set
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> u8 {
        self.sim.cpu().status()
    }

    #[wasm_bindgen(getter)]
    pub fn instructions(&self) -> f64 {
        self.sim.cpu().instructions() as f64
    }

    // Memory access methods

    /// Read a single byte from memory
    pub fn read_memory(&self, addr: u16) -> u8 {
        self.sim.memory().read(addr)
    }

    /// Write a single byte to memory
    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.sim.memory_mut().write(addr, value);
    }

    /// Read a 256-byte page from memory (for efficient display)
    pub fn get_memory_page(&self, page: u8) -> Vec<u8> {
        self.sim.memory().slice((page as u16) << 8, 256)
    }

    pub fn hexdump(&mut self, start_addr: u16, length: usize) -> String {
        self.sim.hexdump(start_addr, length)
    }

    /// Disassemble memory starting at an address
    pub fn disassemble(&mut self, start_addr: u16, length: usize) -> Vec<JsValue> {
        self.sim
            .disassemble(start_addr, length)
            .into_iter()
            .map(|instr| {
                JsValue::from(DisassemblyLine {
                    address: instr.address,
                    mnemonic: instr.mnemonic_text().to_string(),
                    bytes: instr.bytes,
                    operand: instr.operand_text,
                })
            })
            .collect()
    }
}
