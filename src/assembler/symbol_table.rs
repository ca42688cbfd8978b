//! Symbol table management for labels and constants

use crate::opcodes::Mnemonic;
use std::fmt;
use thiserror::Error;

/// What kind of definition introduced a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `name:`, bound to an address
    Label,
    /// `NAME = expr`
    Constant,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Label => "label",
            SymbolKind::Constant => "constant",
        })
    }
}

/// A symbol table entry mapping a name to a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Symbol name (uppercase normalized)
    pub name: String,

    /// Address for labels, assigned value for constants
    pub value: u16,

    /// Source line where the symbol was defined
    pub line: usize,

    pub kind: SymbolKind,
}

/// Why a definition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// The same name was already defined as the same kind of symbol.
    #[error("{kind} '{name}' already defined on line {previous_line}")]
    Duplicate {
        name: String,
        kind: SymbolKind,
        previous_line: usize,
    },

    /// The name collides with a mnemonic, a register or a symbol of the
    /// other kind.
    #[error("{kind} '{name}' shadows {shadowed}")]
    Shadows {
        name: String,
        kind: SymbolKind,
        shadowed: String,
    },
}

/// Symbol table for label and constant definitions
///
/// Names are unique across both kinds.
///
/// # Examples
///
/// ```
/// use sim6502::assembler::symbol_table::SymbolTable;
///
/// let mut symbols = SymbolTable::new();
/// symbols.add_label("LOOP".to_string(), 0x0602, 3).unwrap();
/// symbols.add_constant("SCREEN".to_string(), 0x0200, 1).unwrap();
///
/// assert_eq!(symbols.lookup("LOOP").map(|s| s.value), Some(0x0602));
/// assert_eq!(symbols.label_at(0x0602), Some("LOOP"));
/// // Constants are never used to name addresses
/// assert_eq!(symbols.label_at(0x0200), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a new empty symbol table
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    /// Defines a label at `address`.
    pub fn add_label(&mut self, name: String, address: u16, line: usize) -> Result<(), SymbolError> {
        self.add(name, address, line, SymbolKind::Label)
    }

    /// Defines a constant.
    pub fn add_constant(&mut self, name: String, value: u16, line: usize) -> Result<(), SymbolError> {
        self.add(name, value, line, SymbolKind::Constant)
    }

    fn add(&mut self, name: String, value: u16, line: usize, kind: SymbolKind) -> Result<(), SymbolError> {
        if matches!(name.as_str(), "A" | "X" | "Y") {
            return Err(SymbolError::Shadows {
                shadowed: format!("register {}", name),
                name,
                kind,
            });
        }
        if name.parse::<Mnemonic>().is_ok() {
            return Err(SymbolError::Shadows {
                shadowed: format!("mnemonic {}", name),
                name,
                kind,
            });
        }

        if let Some(existing) = self.lookup(&name) {
            return Err(if existing.kind == kind {
                SymbolError::Duplicate {
                    name,
                    kind,
                    previous_line: existing.line,
                }
            } else {
                SymbolError::Shadows {
                    shadowed: format!("{} on line {}", existing.kind, existing.line),
                    name,
                    kind,
                }
            });
        }

        self.symbols.push(Symbol {
            name,
            value,
            line,
            kind,
        });
        Ok(())
    }

    /// Look up a symbol by name
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Name of the first label defined at `address`.
    pub fn label_at(&self, address: u16) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Label && s.value == address)
            .map(|s| s.name.as_str())
    }

    /// All symbols in definition order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Labels only, in definition order.
    pub fn labels(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.kind == SymbolKind::Label)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}
