//! Property-based tests for the assembler.
//!
//! These tests verify assembler invariants like:
//! - Number format equivalence (hex, decimal, binary produce same bytes)
//! - Zero page versus absolute selection from how an operand is written
//! - Label and constant resolution
//! - No panics on malformed input

use proptest::prelude::*;
use sim6502::{assemble, ErrorType};

// ========== Number Format Equivalence ==========

proptest! {
    /// Property: decimal, hex and binary immediates produce identical bytes
    #[test]
    fn prop_number_formats_equivalent_immediate(value in any::<u8>()) {
        let hex = assemble(&format!("LDA #${:02X}", value)).unwrap();
        let dec = assemble(&format!("LDA #{}", value)).unwrap();
        let bin = assemble(&format!("LDA #%{:08b}", value)).unwrap();

        prop_assert_eq!(&hex.bytes, &vec![0xA9, value]);
        prop_assert_eq!(&dec.bytes, &hex.bytes);
        prop_assert_eq!(&bin.bytes, &hex.bytes);
    }

    /// Property: negative immediates are stored in two's complement
    #[test]
    fn prop_negative_immediate(value in 1i16..=128i16) {
        let output = assemble(&format!("LDA #-{}", value)).unwrap();
        prop_assert_eq!(output.bytes, vec![0xA9, (-value) as u8]);
    }
}

// ========== Addressing Mode Selection ==========

proptest! {
    /// Property: a two-digit hex operand selects zero page
    #[test]
    fn prop_short_hex_is_zero_page(addr in any::<u8>()) {
        let output = assemble(&format!("LDA ${:02X}", addr)).unwrap();
        prop_assert_eq!(output.bytes, vec![0xA5, addr]);
    }

    /// Property: a four-digit hex operand selects absolute even below $0100
    #[test]
    fn prop_long_hex_is_absolute(addr in any::<u8>()) {
        let output = assemble(&format!("LDA ${:04X}", addr)).unwrap();
        prop_assert_eq!(output.bytes, vec![0xAD, addr, 0x00]);
    }

    /// Property: decimal operands select the mode from their value
    #[test]
    fn prop_decimal_operand_mode(addr in any::<u16>()) {
        let output = assemble(&format!("STA {},X", addr)).unwrap();
        if addr <= 0xFF {
            prop_assert_eq!(output.bytes, vec![0x95, addr as u8]);
        } else {
            prop_assert_eq!(output.bytes, vec![0x9D, addr as u8, (addr >> 8) as u8]);
        }
    }

    /// Property: byte selectors split any address into immediates
    #[test]
    fn prop_byte_selectors(addr in any::<u16>()) {
        let source = format!("target = ${:04X}\nLDA #<target\nLDX #>target", addr);
        let output = assemble(&source).unwrap();
        prop_assert_eq!(output.bytes, vec![0xA9, addr as u8, 0xA2, (addr >> 8) as u8]);
    }
}

// ========== Symbols ==========

proptest! {
    /// Property: a forward label resolves to its final address
    #[test]
    fn prop_forward_label_resolves(padding in 0usize..40) {
        let source = format!("JMP target\n{}target: BRK", "NOP\n".repeat(padding));
        let output = assemble(&source).unwrap();

        let target = 0x0600 + 3 + padding as u16;
        prop_assert_eq!(&output.bytes[..3], &[0x4C, target as u8, (target >> 8) as u8][..]);
        prop_assert_eq!(output.symbols.lookup("TARGET").map(|s| s.value), Some(target));
        prop_assert_eq!(output.length, 4 + padding);
    }

    /// Property: a backward branch encodes the distance to its label
    #[test]
    fn prop_backward_branch_offset(padding in 0usize..60) {
        let source = format!("loop: {}BNE loop", "NOP\n".repeat(padding));
        let output = assemble(&source).unwrap();

        let offset = -(padding as i16 + 2) as u8;
        prop_assert_eq!(output.bytes.last().copied(), Some(offset));
    }

    /// Property: a branch beyond 127 bytes is rejected with its line
    #[test]
    fn prop_branch_out_of_range(padding in 128usize..200) {
        let source = format!("BEQ far\n{}far: BRK", "NOP\n".repeat(padding));
        let err = assemble(&source).unwrap_err();

        prop_assert_eq!(err.error_type, ErrorType::OperandOutOfRange);
        prop_assert_eq!(err.line, 1);
    }
}

// ========== Robustness ==========

proptest! {
    /// Property: arbitrary assembler-like text never panics
    #[test]
    fn prop_no_panic_on_arbitrary_source(source in "[A-Za-z0-9_$#%,():;.<>+= \\-\"\n]{0,80}") {
        if let Ok(output) = assemble(&source) {
            prop_assert_eq!(output.bytes.len(), output.length);
            prop_assert!(output.start as usize + output.length <= 0x10000);
        }
    }

    /// Property: arbitrary unicode never panics
    #[test]
    fn prop_no_panic_on_unicode(source in "\\PC{0,40}") {
        let _ = assemble(&source);
    }
}
