//! 6502 Assembler Module
//!
//! Converts assembly language source code into machine code written through a
//! [`MemoryBus`].
//!
//! Assembly runs in two passes over the parsed lines:
//!
//! 1. Walk the lines with a location counter, define labels and constants,
//!    evaluate `.org`, and fix each statement's addressing mode and size.
//! 2. Evaluate operands against the complete symbol table (forward references
//!    are legal here), range-check, write the bytes and record a source map
//!    entry per instruction.
//!
//! The first error stops assembly. Bytes written before the error stay in
//! memory, but the result is still a failure.

pub mod encoder;
pub mod lexer;
pub mod parser;
pub mod source_map;
pub mod symbol_table;

pub use lexer::{tokenize, LexerError, Token, TokenType};
pub use source_map::{AddressRange, SourceLocation, SourceMap};
pub use symbol_table::{Symbol, SymbolError, SymbolKind, SymbolTable};

use crate::addressing::AddressingMode;
use crate::cpu::DEFAULT_ORIGIN;
use crate::memory::{Memory, MemoryBus};
use crate::opcodes::Mnemonic;
use encoder::{encode, evaluate, fit_byte, fit_word, is_narrow, plan_mode, EncodeError};
use log::debug;
use parser::{parse_prefix, AssemblyLine, DataItem, Expr, Operand, Statement};
use thiserror::Error;

/// Upper bound (exclusive) of the location counter.
const ADDRESS_LIMIT: u32 = 0x10000;

/// Complete output from assembling source code
#[derive(Debug, Clone)]
pub struct AssemblerOutput {
    /// Memory contents from `start` for `length` bytes after assembly
    pub bytes: Vec<u8>,

    /// Origin the assembly started from
    pub origin: u16,

    /// Lowest address written
    pub start: u16,

    /// Span from `start` to the highest address written, inclusive
    pub length: usize,

    /// Symbol table with all defined labels and constants
    pub symbols: SymbolTable,

    /// Source map for debugging
    pub source_map: SourceMap,

    /// Non-fatal warnings encountered during assembly
    pub warnings: Vec<AssemblerWarning>,
}

/// A non-fatal warning from the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerWarning {
    /// Line number where warning occurred, 0 for the program as a whole
    pub line: usize,

    /// Warning message
    pub message: String,
}

/// An error encountered during assembly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct AssemblerError {
    /// Error type classification
    pub error_type: ErrorType,

    /// Line number where error occurred (1-indexed)
    pub line: usize,

    /// Column number where error starts (0-indexed)
    pub column: usize,

    /// Text of the offending source line
    pub text: String,

    /// Human-readable error message
    pub message: String,
}

impl AssemblerError {
    pub fn new(
        error_type: ErrorType,
        line: usize,
        column: usize,
        text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AssemblerError {
            error_type,
            line,
            column,
            text: text.into(),
            message: message.into(),
        }
    }

    fn at(line: &AssemblyLine, column: usize, error_type: ErrorType, message: impl Into<String>) -> Self {
        AssemblerError::new(error_type, line.line_number, column, line.text.as_str(), message)
    }

    fn encode(line: &AssemblyLine, error: EncodeError) -> Self {
        let error_type = match error {
            EncodeError::InvalidAddressingMode { .. } => ErrorType::InvalidAddressingMode,
            EncodeError::OutOfRange { .. } => ErrorType::OperandOutOfRange,
            EncodeError::UndefinedSymbol(_) => ErrorType::UndefinedLabel,
        };
        AssemblerError::at(line, line.column, error_type, error.to_string())
    }

    /// True for errors caused by a label or constant definition.
    pub fn is_label_error(&self) -> bool {
        matches!(
            self.error_type,
            ErrorType::DuplicateLabel | ErrorType::LabelShadowsSymbol | ErrorType::InvalidLabel
        )
    }
}

/// Classification of assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Syntax error (invalid format, unexpected character)
    SyntaxError,

    /// Label or constant defined twice
    DuplicateLabel,

    /// Label or constant named like a mnemonic, a register or a symbol of
    /// the other kind
    LabelShadowsSymbol,

    /// Not a recognized instruction
    UnknownMnemonic,

    /// Undefined label reference
    UndefinedLabel,

    /// Operand value out of range (e.g., immediate value > 255, branch too far)
    OperandOutOfRange,

    /// Operand syntax the mnemonic has no encoding for
    InvalidAddressingMode,

    /// Invalid directive usage
    InvalidDirective,

    /// Invalid label name (too long, bad characters)
    InvalidLabel,
}

/// A statement that emits bytes, with everything pass 1 decided about it.
struct Planned<'a> {
    line: &'a AssemblyLine,
    address: u16,
    item: Item<'a>,
}

enum Item<'a> {
    Instruction {
        mnemonic: Mnemonic,
        mode: AddressingMode,
        operand: &'a Operand,
    },
    Bytes(&'a [DataItem]),
    Words(&'a [Expr]),
}

impl Item<'_> {
    fn size(&self) -> u32 {
        match self {
            Item::Instruction { mode, .. } => mode.size_bytes() as u32,
            Item::Bytes(items) => items
                .iter()
                .map(|item| match item {
                    DataItem::Text(text) => text.chars().count() as u32,
                    DataItem::Expr(_) => 1,
                })
                .sum(),
            Item::Words(words) => 2 * words.len() as u32,
        }
    }
}

/// Two-pass assembler.
///
/// Keeps the symbol table and source map of the last successful assembly so
/// that the disassembler and debugger can use them.
///
/// # Examples
///
/// ```
/// use sim6502::assembler::Assembler;
/// use sim6502::Memory;
///
/// let mut memory = Memory::new();
/// let mut assembler = Assembler::new();
/// let output = assembler
///     .assemble("start: LDA #$01\n  JMP start", &mut memory)
///     .unwrap();
///
/// assert_eq!(output.bytes, vec![0xA9, 0x01, 0x4C, 0x00, 0x06]);
/// assert_eq!(memory.get(0x0600), 0xA9);
/// assert_eq!(assembler.symbols().label_at(0x0600), Some("START"));
/// ```
#[derive(Debug, Clone)]
pub struct Assembler {
    origin: u16,
    symbols: SymbolTable,
    source_map: SourceMap,
}

impl Assembler {
    /// Creates an assembler starting at the default origin `$0600`.
    pub fn new() -> Self {
        Self::with_origin(DEFAULT_ORIGIN)
    }

    pub fn with_origin(origin: u16) -> Self {
        Assembler {
            origin,
            symbols: SymbolTable::new(),
            source_map: SourceMap::new(),
        }
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: u16) {
        self.origin = origin;
    }

    /// Symbols of the last successful assembly.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Source map of the last successful assembly.
    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Forgets the symbols and source map of the previous assembly.
    pub fn clear(&mut self) {
        self.symbols.clear();
        self.source_map = SourceMap::new();
    }

    /// Assembles `source` into `memory`.
    pub fn assemble<M: MemoryBus>(&mut self, source: &str, memory: &mut M) -> Result<AssemblerOutput, AssemblerError> {
        self.clear();

        // Errors are reported in line order, so pass 1 checks the lines
        // above a syntax error before the syntax error itself
        let (lines, syntax_error) = parse_prefix(source);
        let mut symbols = SymbolTable::new();
        let mut warnings = Vec::new();

        let planned = self.first_pass(&lines, &mut symbols, &mut warnings)?;
        if let Some(err) = syntax_error {
            return Err(err);
        }
        debug!(
            "pass 1: {} lines, {} symbols, {} statements to emit",
            lines.len(),
            symbols.len(),
            planned.len()
        );

        let mut source_map = SourceMap::new();
        let mut written: Option<(u16, u16)> = None;
        for plan in &planned {
            let bytes = Self::emit(plan, &symbols)?;
            if bytes.is_empty() {
                continue;
            }

            for (offset, byte) in bytes.iter().enumerate() {
                memory.write(plan.address.wrapping_add(offset as u16), *byte);
            }

            let last = plan.address.wrapping_add(bytes.len() as u16 - 1);
            written = Some(match written {
                Some((low, high)) => (low.min(plan.address), high.max(last)),
                None => (plan.address, last),
            });

            if matches!(plan.item, Item::Instruction { .. }) {
                source_map.add_mapping(plan.address, bytes.len() as u16, Self::location(plan.line));
            }
        }
        source_map.finalize();

        let (start, length) = match written {
            Some((low, high)) => (low, (high - low) as usize + 1),
            None => {
                warnings.push(AssemblerWarning {
                    line: 0,
                    message: "program contains no code or data".to_string(),
                });
                (self.origin, 0)
            }
        };
        let bytes = (0..length)
            .map(|offset| memory.read(start.wrapping_add(offset as u16)))
            .collect();

        debug!(
            "pass 2: {} bytes at ${:04X}, {} warnings",
            length,
            start,
            warnings.len()
        );

        self.symbols = symbols.clone();
        self.source_map = source_map.clone();

        Ok(AssemblerOutput {
            bytes,
            origin: self.origin,
            start,
            length,
            symbols,
            source_map,
            warnings,
        })
    }

    fn first_pass<'a>(
        &self,
        lines: &'a [AssemblyLine],
        symbols: &mut SymbolTable,
        warnings: &mut Vec<AssemblerWarning>,
    ) -> Result<Vec<Planned<'a>>, AssemblerError> {
        let mut counter = self.origin as u32;
        let mut planned = Vec::new();

        for line in lines {
            if let Some((name, column)) = &line.label {
                define(line, *column, symbols, name, counter as u16, false)?;
            }

            let Some(statement) = &line.statement else {
                continue;
            };

            let item = match statement {
                Statement::Constant { name, value } => {
                    let value = evaluate(value, symbols).map_err(|e| AssemblerError::encode(line, e))?;
                    let value = fit_word(value).ok_or_else(|| {
                        AssemblerError::at(
                            line,
                            line.column,
                            ErrorType::OperandOutOfRange,
                            format!("constant value {} does not fit in 16 bits", value),
                        )
                    })?;
                    define(line, line.column, symbols, name, value, true)?;
                    continue;
                }
                Statement::Origin(expr) => {
                    let value = evaluate(expr, symbols).map_err(|e| AssemblerError::encode(line, e))?;
                    if !(0..ADDRESS_LIMIT as i32).contains(&value) {
                        return Err(AssemblerError::at(
                            line,
                            line.column,
                            ErrorType::OperandOutOfRange,
                            format!(".org address {} is outside memory", value),
                        ));
                    }
                    if (value as u32) < counter {
                        warnings.push(AssemblerWarning {
                            line: line.line_number,
                            message: format!(
                                ".org ${:04X} moves backwards from ${:04X}",
                                value, counter
                            ),
                        });
                    }
                    counter = value as u32;
                    continue;
                }
                Statement::Byte(items) => Item::Bytes(items),
                Statement::Word(words) => Item::Words(words),
                Statement::Instruction { mnemonic, operand } => {
                    let mnemonic: Mnemonic = mnemonic.parse().map_err(|e: crate::opcodes::UnknownMnemonic| {
                        AssemblerError::at(line, line.column, ErrorType::UnknownMnemonic, e.to_string())
                    })?;
                    let narrow = operand.expr().is_some_and(|e| is_narrow(e, symbols));
                    let mode = plan_mode(mnemonic, operand, narrow).map_err(|e| AssemblerError::encode(line, e))?;
                    Item::Instruction {
                        mnemonic,
                        mode,
                        operand,
                    }
                }
            };

            let size = item.size();
            if counter + size > ADDRESS_LIMIT {
                return Err(AssemblerError::at(
                    line,
                    line.column,
                    ErrorType::OperandOutOfRange,
                    "program extends past $FFFF",
                ));
            }
            planned.push(Planned {
                line,
                address: counter as u16,
                item,
            });
            counter += size;
        }

        Ok(planned)
    }

    fn emit(plan: &Planned<'_>, symbols: &SymbolTable) -> Result<Vec<u8>, AssemblerError> {
        let line = plan.line;
        let value_of = |expr: &Expr| evaluate(expr, symbols).map_err(|e| AssemblerError::encode(line, e));
        let out_of_range = |message: String| AssemblerError::at(line, line.column, ErrorType::OperandOutOfRange, message);

        match plan.item {
            Item::Instruction {
                mnemonic,
                mode,
                operand,
            } => {
                let value = operand.expr().map(&value_of).transpose()?;
                encode(mnemonic, mode, value, plan.address).map_err(|e| AssemblerError::encode(line, e))
            }
            Item::Bytes(items) => {
                let mut bytes = Vec::new();
                for item in items {
                    match item {
                        DataItem::Text(text) => {
                            for ch in text.chars() {
                                let byte = u8::try_from(ch).map_err(|_| {
                                    out_of_range(format!("character '{}' does not fit in a byte", ch))
                                })?;
                                bytes.push(byte);
                            }
                        }
                        DataItem::Expr(expr) => {
                            let value = value_of(expr)?;
                            bytes.push(fit_byte(value).ok_or_else(|| {
                                out_of_range(format!("value {} does not fit in a byte", value))
                            })?);
                        }
                    }
                }
                Ok(bytes)
            }
            Item::Words(words) => {
                let mut bytes = Vec::with_capacity(words.len() * 2);
                for expr in words {
                    let value = value_of(expr)?;
                    let word = fit_word(value).ok_or_else(|| {
                        out_of_range(format!("value {} does not fit in a word", value))
                    })?;
                    bytes.extend_from_slice(&word.to_le_bytes());
                }
                Ok(bytes)
            }
        }
    }

    fn location(line: &AssemblyLine) -> SourceLocation {
        let code = line.text.split(';').next().unwrap_or("").trim_end();
        SourceLocation {
            line: line.line_number,
            column: line.column,
            length: code.len().saturating_sub(line.column),
        }
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

fn define(
    line: &AssemblyLine,
    column: usize,
    symbols: &mut SymbolTable,
    name: &str,
    value: u16,
    constant: bool,
) -> Result<(), AssemblerError> {
    validate_label(name).map_err(|message| AssemblerError::at(line, column, ErrorType::InvalidLabel, message))?;

    let result = if constant {
        symbols.add_constant(name.to_string(), value, line.line_number)
    } else {
        symbols.add_label(name.to_string(), value, line.line_number)
    };

    result.map_err(|e| {
        let error_type = match e {
            SymbolError::Duplicate { .. } => ErrorType::DuplicateLabel,
            SymbolError::Shadows { .. } => ErrorType::LabelShadowsSymbol,
        };
        AssemblerError::at(line, column, error_type, e.to_string())
    })
}

/// Assembles `source` at `$0600` into scratch memory.
///
/// # Examples
///
/// ```
/// use sim6502::assembler::{assemble, ErrorType};
///
/// let output = assemble("LDX #$08\nloop: DEX\n  BNE loop\n  BRK").unwrap();
/// assert_eq!(output.bytes, vec![0xA2, 0x08, 0xCA, 0xD0, 0xFD, 0x00]);
///
/// let err = assemble("loop: NOP\nloop: NOP").unwrap_err();
/// assert_eq!(err.error_type, ErrorType::DuplicateLabel);
/// assert_eq!(err.line, 2);
/// ```
pub fn assemble(source: &str) -> Result<AssemblerOutput, AssemblerError> {
    let mut memory = Memory::new();
    Assembler::new().assemble(source, &mut memory)
}

/// Validate a label name according to 6502 conventions
///
/// Labels must:
/// - Start with a letter or underscore
/// - Contain only alphanumeric characters and underscores
/// - Not exceed 32 characters in length
fn validate_label(name: &str) -> Result<(), String> {
    let Some(first) = name.chars().next() else {
        return Err("label name cannot be empty".to_string());
    };

    if name.len() > 32 {
        return Err(format!("label name too long (max 32 characters): {}", name));
    }

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(format!("label must start with a letter, not '{}'", first));
    }

    if let Some(ch) = name.chars().find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(format!(
            "label contains invalid character '{}' (only letters, digits, and underscores allowed)",
            ch
        ));
    }

    Ok(())
}
