//! Instruction encoder for the 6502 assembler
//!
//! Chooses addressing modes from operand syntax, evaluates expressions
//! against the symbol table and turns a planned instruction into bytes using
//! the [`OPCODE_TABLE`](crate::OPCODE_TABLE).

use crate::addressing::AddressingMode;
use crate::assembler::parser::{ByteSelector, Expr, Operand, Term};
use crate::assembler::symbol_table::{SymbolKind, SymbolTable};
use crate::opcodes::{find_opcode, Mnemonic};
use thiserror::Error;

/// Reasons an instruction cannot be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{mnemonic} does not support {syntax} addressing")]
    InvalidAddressingMode {
        mnemonic: Mnemonic,
        syntax: &'static str,
    },

    #[error("{message}")]
    OutOfRange { message: String },

    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),
}

/// Picks the addressing mode for `mnemonic` with the given operand syntax.
///
/// `narrow` says whether the operand is known to fit in one byte; see
/// [`is_narrow`]. A zero page form is used when the operand is narrow and the
/// mnemonic has one. Otherwise the 16-bit form is used, falling back to the
/// zero page form for mnemonics that only have that (such as `STX $10,Y`),
/// in which case the value is range-checked when it is encoded.
///
/// # Examples
///
/// ```
/// use sim6502::assembler::encoder::plan_mode;
/// use sim6502::assembler::parser::{Expr, Operand};
/// use sim6502::{AddressingMode, Mnemonic};
///
/// let operand = Operand::Direct(Expr::number(0x10));
/// assert_eq!(plan_mode(Mnemonic::Lda, &operand, true), Ok(AddressingMode::ZeroPage));
/// assert_eq!(plan_mode(Mnemonic::Lda, &operand, false), Ok(AddressingMode::Absolute));
/// assert_eq!(plan_mode(Mnemonic::Beq, &operand, true), Ok(AddressingMode::Relative));
/// ```
pub fn plan_mode(mnemonic: Mnemonic, operand: &Operand, narrow: bool) -> Result<AddressingMode, EncodeError> {
    use AddressingMode::*;

    let pick = |zero_page: AddressingMode| -> Option<AddressingMode> {
        let wide = zero_page.widened()?;
        if narrow && mnemonic.supports(zero_page) {
            Some(zero_page)
        } else if mnemonic.supports(wide) {
            Some(wide)
        } else if mnemonic.supports(zero_page) {
            Some(zero_page)
        } else {
            None
        }
    };
    let only = |mode: AddressingMode| mnemonic.supports(mode).then_some(mode);

    let (mode, syntax) = match operand {
        Operand::None => (only(Implicit).or_else(|| only(Accumulator)), "implied"),
        Operand::Accumulator => (only(Accumulator), "accumulator"),
        Operand::Immediate(_) => (only(Immediate), "immediate"),
        Operand::Direct(_) if mnemonic.is_branch() => (only(Relative), "relative"),
        Operand::Direct(_) => (pick(ZeroPage), "absolute or zero page"),
        Operand::IndexedX(_) => (pick(ZeroPageX), "X-indexed"),
        Operand::IndexedY(_) => (pick(ZeroPageY), "Y-indexed"),
        Operand::Indirect(_) => (only(Indirect), "indirect"),
        Operand::IndirectX(_) => (only(IndirectX), "(indirect,X)"),
        Operand::IndirectY(_) => (only(IndirectY), "(indirect),Y"),
    };

    mode.ok_or(EncodeError::InvalidAddressingMode { mnemonic, syntax })
}

/// Evaluates an expression with the symbols defined so far.
///
/// The result is unbounded; range checks happen at the point of use. A byte
/// selector takes the low or high byte of the 16-bit value.
pub fn evaluate(expr: &Expr, symbols: &SymbolTable) -> Result<i32, EncodeError> {
    let mut total: i32 = 0;
    for (negative, term) in &expr.terms {
        let value = match term {
            Term::Number { value, .. } => *value as i32,
            Term::Symbol(name) => symbols
                .lookup(name)
                .map(|s| s.value as i32)
                .ok_or_else(|| EncodeError::UndefinedSymbol(name.clone()))?,
        };
        total = if *negative {
            total.wrapping_sub(value)
        } else {
            total.wrapping_add(value)
        };
    }

    Ok(match expr.selector {
        Some(ByteSelector::Low) => total & 0xFF,
        Some(ByteSelector::High) => (total >> 8) & 0xFF,
        None => total,
    })
}

/// Returns true if the operand is known to fit in a byte when pass 1 sees it.
///
/// That is the case for a byte selection, or when every term is a short
/// literal or an already-defined constant and the sum is at most 255. Labels
/// are never narrow, since their final value is an address.
pub fn is_narrow(expr: &Expr, symbols: &SymbolTable) -> bool {
    if expr.selector.is_some() {
        return true;
    }

    let terms_narrow = expr.terms.iter().all(|(_, term)| match term {
        Term::Number { wide, .. } => !wide,
        Term::Symbol(name) => symbols
            .lookup(name)
            .is_some_and(|s| s.kind == SymbolKind::Constant && s.value <= 0xFF),
    });

    terms_narrow && matches!(evaluate(expr, symbols), Ok(0..=0xFF))
}

/// A byte value; negative numbers down to -128 are stored in two's complement.
pub fn fit_byte(value: i32) -> Option<u8> {
    (-0x80..=0xFF).contains(&value).then_some(value as u8)
}

/// A word value; negative numbers down to -32768 are stored in two's complement.
pub fn fit_word(value: i32) -> Option<u16> {
    (-0x8000..=0xFFFF).contains(&value).then_some(value as u16)
}

/// Encodes one instruction located at `address`.
///
/// `value` is the evaluated operand, or the branch target for relative mode.
pub fn encode(mnemonic: Mnemonic, mode: AddressingMode, value: Option<i32>, address: u16) -> Result<Vec<u8>, EncodeError> {
    let opcode = find_opcode(mnemonic, mode).ok_or(EncodeError::InvalidAddressingMode {
        mnemonic,
        syntax: "this",
    })?;

    let out_of_range = |message: String| EncodeError::OutOfRange { message };
    let value = value.unwrap_or(0);

    let bytes = match mode {
        AddressingMode::Implicit | AddressingMode::Accumulator => vec![opcode],
        AddressingMode::Immediate => {
            let byte = fit_byte(value).ok_or_else(|| {
                out_of_range(format!("immediate value {} does not fit in a byte", value))
            })?;
            vec![opcode, byte]
        }
        AddressingMode::Relative => {
            if !(0..=0xFFFF).contains(&value) {
                return Err(out_of_range(format!(
                    "branch target {} is outside memory",
                    format_value(value)
                )));
            }
            // PC wraps at $FFFF, so the distance is taken modulo 64 KiB
            let offset = value.wrapping_sub(address as i32 + 2) as u16 as i16 as i32;
            if !(-128..=127).contains(&offset) {
                return Err(out_of_range(format!(
                    "branch target ${:04X} is {} bytes away (range is -128 to 127)",
                    value, offset
                )));
            }
            vec![opcode, offset as i8 as u8]
        }
        mode if mode.operand_bytes() == 1 => {
            if !(0..=0xFF).contains(&value) {
                return Err(out_of_range(format!(
                    "address {} is outside zero page for {} addressing",
                    format_value(value),
                    mode
                )));
            }
            vec![opcode, value as u8]
        }
        _ => {
            if !(0..=0xFFFF).contains(&value) {
                return Err(out_of_range(format!(
                    "address {} is outside memory",
                    format_value(value)
                )));
            }
            let [lo, hi] = (value as u16).to_le_bytes();
            vec![opcode, lo, hi]
        }
    };

    Ok(bytes)
}

fn format_value(value: i32) -> String {
    if value < 0 {
        value.to_string()
    } else {
        format!("${:X}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::parser::parse_source;

    fn expr(source: &str) -> Expr {
        let line = parse_source(&format!("LDA {}", source)).unwrap().remove(0);
        match line.statement {
            Some(crate::assembler::parser::Statement::Instruction {
                operand: Operand::Direct(e),
                ..
            }) => e,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_plan_prefers_zero_page() {
        let e = Operand::IndexedY(Expr::number(0x10));
        assert_eq!(plan_mode(Mnemonic::Ldx, &e, true), Ok(AddressingMode::ZeroPageY));
        // LDA has no zero page,Y form
        assert_eq!(plan_mode(Mnemonic::Lda, &e, true), Ok(AddressingMode::AbsoluteY));
        // STX only has zero page,Y
        assert_eq!(plan_mode(Mnemonic::Stx, &e, false), Ok(AddressingMode::ZeroPageY));
    }

    #[test]
    fn test_plan_rejects_unsupported() {
        let imm = Operand::Immediate(Expr::number(1));
        assert!(matches!(
            plan_mode(Mnemonic::Sta, &imm, true),
            Err(EncodeError::InvalidAddressingMode { .. })
        ));
        assert_eq!(plan_mode(Mnemonic::Asl, &Operand::None, true), Ok(AddressingMode::Accumulator));
        assert_eq!(plan_mode(Mnemonic::Jmp, &Operand::Direct(Expr::number(1)), true), Ok(AddressingMode::Absolute));
    }

    #[test]
    fn test_evaluate_and_narrowness() {
        let mut symbols = SymbolTable::new();
        symbols.add_constant("PTR".into(), 0x10, 1).unwrap();
        symbols.add_label("DATA".into(), 0x0634, 2).unwrap();

        assert_eq!(evaluate(&expr("PTR+1"), &symbols), Ok(0x11));
        assert_eq!(evaluate(&expr(">DATA"), &symbols), Ok(0x06));
        assert_eq!(evaluate(&expr("<DATA"), &symbols), Ok(0x34));
        assert_eq!(
            evaluate(&expr("MISSING"), &symbols),
            Err(EncodeError::UndefinedSymbol("MISSING".into()))
        );

        assert!(is_narrow(&expr("PTR+1"), &symbols));
        assert!(is_narrow(&expr("<DATA"), &symbols));
        assert!(!is_narrow(&expr("DATA"), &symbols));
        assert!(!is_narrow(&expr("$0010"), &symbols));
        assert!(!is_narrow(&expr("$F0+$20"), &symbols));
        assert!(!is_narrow(&expr("LATER"), &symbols));
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(Mnemonic::Lda, AddressingMode::Immediate, Some(-1), 0), Ok(vec![0xA9, 0xFF]));
        assert_eq!(encode(Mnemonic::Sta, AddressingMode::Absolute, Some(0x0200), 0), Ok(vec![0x8D, 0x00, 0x02]));
        assert_eq!(encode(Mnemonic::Bne, AddressingMode::Relative, Some(0x0600), 0x0602), Ok(vec![0xD0, 0xFC]));
        assert!(matches!(
            encode(Mnemonic::Lda, AddressingMode::Immediate, Some(300), 0),
            Err(EncodeError::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(Mnemonic::Stx, AddressingMode::ZeroPageY, Some(0x0200), 0),
            Err(EncodeError::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(Mnemonic::Beq, AddressingMode::Relative, Some(0x0700), 0x0600),
            Err(EncodeError::OutOfRange { .. })
        ));
    }
}
