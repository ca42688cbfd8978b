//! Integration tests for the two-pass assembler.
//!
//! Tests cover:
//! - Forward and backward label references
//! - Zero page versus absolute selection
//! - Constants, byte selectors and expressions
//! - Directives (.org, .byte, .word and their aliases)
//! - Error classification with line, column and source text
//! - Symbol table and source map contents

use sim6502::assembler::{AddressRange, Assembler, ErrorType};
use sim6502::{assemble, Memory, MemoryBus, SymbolKind};

fn bytes(source: &str) -> Vec<u8> {
    assemble(source)
        .unwrap_or_else(|e| panic!("{:?} failed: {}", source, e))
        .bytes
}

fn error_type(source: &str) -> ErrorType {
    assemble(source).unwrap_err().error_type
}

// ========== Instructions ==========

#[test]
fn test_basic_program() {
    let source = "
        LDA #$01
        STA $0200
        LDA #$05
        STA $0201
        BRK
    ";
    assert_eq!(
        bytes(source),
        vec![0xA9, 0x01, 0x8D, 0x00, 0x02, 0xA9, 0x05, 0x8D, 0x01, 0x02, 0x00]
    );
}

#[test]
fn test_case_insensitive() {
    assert_eq!(bytes("lda #$ff\nLdX $10,y"), vec![0xA9, 0xFF, 0xB6, 0x10]);
}

#[test]
fn test_all_operand_syntaxes() {
    let source = "
        NOP
        ASL A
        LSR
        LDA #10
        LDA $10
        LDA $10,X
        LDX $10,Y
        LDA $1234
        LDA $1234,X
        LDA $1234,Y
        JMP ($1234)
        LDA ($10,X)
        LDA ($10),Y
    ";
    assert_eq!(
        bytes(source),
        vec![
            0xEA, 0x0A, 0x4A, 0xA9, 0x0A, 0xA5, 0x10, 0xB5, 0x10, 0xB6, 0x10, 0xAD, 0x34, 0x12,
            0xBD, 0x34, 0x12, 0xB9, 0x34, 0x12, 0x6C, 0x34, 0x12, 0xA1, 0x10, 0xB1, 0x10,
        ]
    );
}

#[test]
fn test_number_formats() {
    assert_eq!(
        bytes("LDA #$1F\nLDA #%00011111\nLDA #31"),
        vec![0xA9, 0x1F, 0xA9, 0x1F, 0xA9, 0x1F]
    );
}

#[test]
fn test_negative_immediate_is_twos_complement() {
    assert_eq!(bytes("LDA #-1\nLDX #-128"), vec![0xA9, 0xFF, 0xA2, 0x80]);
}

#[test]
fn test_wide_literal_forces_absolute() {
    // Four hex digits keep the absolute form even for a small value
    assert_eq!(bytes("LDA $00FF"), vec![0xAD, 0xFF, 0x00]);
    assert_eq!(bytes("LDA $FF"), vec![0xA5, 0xFF]);
    assert_eq!(bytes("LDA 256"), vec![0xAD, 0x00, 0x01]);
}

#[test]
fn test_indexed_mode_fallbacks() {
    // STX has no absolute,Y form, so a wide operand must fit in zero page
    assert_eq!(error_type("STX $1234,Y"), ErrorType::OperandOutOfRange);
    assert_eq!(bytes("STX $12,Y"), vec![0x96, 0x12]);
    // STA has no zero page,Y form, so a short operand is widened
    assert_eq!(bytes("STA $10,Y"), vec![0x99, 0x10, 0x00]);
    // LDX cannot be indexed by X at all
    assert_eq!(error_type("LDX $10,X"), ErrorType::InvalidAddressingMode);
    // The pointer of (zp),Y lives in zero page
    assert_eq!(error_type("LDA ($1234),Y"), ErrorType::OperandOutOfRange);
}

#[test]
fn test_absolute_only_modes_widen() {
    // JMP and JSR have no zero page form
    assert_eq!(bytes("JMP $10"), vec![0x4C, 0x10, 0x00]);
    assert_eq!(bytes("JSR $20"), vec![0x20, 0x20, 0x00]);
}

// ========== Labels and Constants ==========

#[test]
fn test_forward_reference_is_resolved() {
    let output = assemble("    JMP target\n    NOP\ntarget: BRK").unwrap();
    assert_eq!(output.bytes, vec![0x4C, 0x04, 0x06, 0xEA, 0x00]);
    assert_eq!(output.symbols.lookup("TARGET").map(|s| s.value), Some(0x0604));
}

#[test]
fn test_backward_branch() {
    assert_eq!(
        bytes("      LDX #$03\nloop: DEX\n      BNE loop"),
        vec![0xA2, 0x03, 0xCA, 0xD0, 0xFD]
    );
}

#[test]
fn test_forward_branch() {
    assert_eq!(
        bytes("      BEQ done\n      NOP\ndone: BRK"),
        vec![0xF0, 0x01, 0xEA, 0x00]
    );
}

#[test]
fn test_label_on_its_own_line() {
    assert_eq!(bytes("start:\n  JMP start"), vec![0x4C, 0x00, 0x06]);
}

#[test]
fn test_constants_select_zero_page() {
    let source = "
ptr = $10
screen = $0200
        LDA ptr
        STA screen
        LDA #ptr
    ";
    assert_eq!(
        bytes(source),
        vec![0xA5, 0x10, 0x8D, 0x00, 0x02, 0xA9, 0x10]
    );
}

#[test]
fn test_constant_expression() {
    let source = "
BASE = $0200
ROW = 32
        STA BASE+ROW+1
        LDA #ROW-1
    ";
    assert_eq!(bytes(source), vec![0x8D, 0x21, 0x02, 0xA9, 0x1F]);
}

#[test]
fn test_byte_selectors() {
    let source = "
        LDX #<data
        LDY #>data
        BRK
        .org $1234
data:   .byte 0
    ";
    let output = assemble(source).unwrap();
    assert_eq!(&output.bytes[..5], &[0xA2, 0x34, 0xA0, 0x12, 0x00]);
}

#[test]
fn test_labels_are_never_zero_page() {
    let source = "
        .org $0010
var:    .byte 0
        .org $0600
        LDA var
    ";
    let output = assemble(source).unwrap();
    assert_eq!(output.start, 0x0010);
    assert_eq!(&output.bytes[output.bytes.len() - 3..], &[0xAD, 0x10, 0x00]);
}

#[test]
fn test_symbol_table_contents() {
    let output = assemble("SIZE = 4\nstart: NOP\nend: BRK").unwrap();
    let symbols = output.symbols.symbols();

    assert_eq!(symbols.len(), 3);
    assert_eq!(symbols[0].name, "SIZE");
    assert_eq!(symbols[0].kind, SymbolKind::Constant);
    assert_eq!(symbols[1].name, "START");
    assert_eq!((symbols[1].value, symbols[1].line), (0x0600, 2));
    assert_eq!(symbols[2].value, 0x0601);
    assert_eq!(output.symbols.labels().count(), 2);
}

// ========== Directives ==========

#[test]
fn test_byte_and_word_directives() {
    let output = assemble(".byte 1, $02, %11, \"AB\"\n.word $1234, 5").unwrap();
    assert_eq!(
        output.bytes,
        vec![0x01, 0x02, 0x03, b'A', b'B', 0x34, 0x12, 0x05, 0x00]
    );
}

#[test]
fn test_directive_aliases() {
    assert_eq!(bytes(".db 1, 2\n.dw $0102\nDCB 3"), vec![1, 2, 0x02, 0x01, 3]);
}

#[test]
fn test_org_moves_location_counter() {
    let output = assemble(".org $0800\nstart: NOP\nJMP start").unwrap();
    assert_eq!(output.start, 0x0800);
    assert_eq!(output.bytes, vec![0xEA, 0x4C, 0x00, 0x08]);
}

#[test]
fn test_gap_between_org_blocks_is_part_of_output() {
    let output = assemble("NOP\n.org $0604\nNOP").unwrap();
    assert_eq!(output.start, 0x0600);
    assert_eq!(output.length, 5);
    assert_eq!(output.bytes, vec![0xEA, 0x00, 0x00, 0x00, 0xEA]);
}

#[test]
fn test_comments_and_blank_lines() {
    let source = "; header\n\n  NOP ; trailing\n\t\n; LDA #1\n  BRK";
    assert_eq!(bytes(source), vec![0xEA, 0x00]);
}

// ========== Errors ==========

#[test]
fn test_duplicate_label_reported_on_second_line() {
    let err = assemble("loop: NOP\nloop: NOP").unwrap_err();
    assert_eq!(err.error_type, ErrorType::DuplicateLabel);
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 0);
    assert_eq!(err.text, "loop: NOP");
    assert!(err.is_label_error());
    assert!(err.to_string().starts_with("line 2:"));
}

#[test]
fn test_first_error_in_line_order_wins() {
    let err = assemble("loop: NOP\nloop: NOP\nLDA ($10,X").unwrap_err();
    assert_eq!(err.error_type, ErrorType::DuplicateLabel);
    assert_eq!(err.line, 2);

    let err = assemble("loop: NOP\nloop: NOP\n.byte \"AB").unwrap_err();
    assert_eq!(err.error_type, ErrorType::DuplicateLabel);
    assert_eq!(err.line, 2);

    let err = assemble("LDA ($10,X\nloop: NOP\nloop: NOP").unwrap_err();
    assert_eq!(err.error_type, ErrorType::SyntaxError);
    assert_eq!(err.line, 1);

    // Pass 2 errors never mask a syntax error
    let err = assemble("JMP nowhere\nLDA ($10,X").unwrap_err();
    assert_eq!(err.error_type, ErrorType::SyntaxError);
    assert_eq!(err.line, 2);
}

#[test]
fn test_error_classification() {
    assert_eq!(error_type("FOO #1"), ErrorType::UnknownMnemonic);
    assert_eq!(error_type("JMP nowhere"), ErrorType::UndefinedLabel);
    assert_eq!(error_type("LDA #256"), ErrorType::OperandOutOfRange);
    assert_eq!(error_type("LDA #-129"), ErrorType::OperandOutOfRange);
    assert_eq!(error_type("STA #1"), ErrorType::InvalidAddressingMode);
    assert_eq!(error_type("INX #1"), ErrorType::InvalidAddressingMode);
    assert_eq!(error_type("LDA ($10,X"), ErrorType::SyntaxError);
    assert_eq!(error_type("tax: NOP"), ErrorType::LabelShadowsSymbol);
    assert_eq!(error_type("A = 1"), ErrorType::LabelShadowsSymbol);
    assert_eq!(error_type(".byte 256"), ErrorType::OperandOutOfRange);
}

#[test]
fn test_label_and_constant_cannot_share_a_name() {
    let err = assemble("SIZE = 4\nsize: NOP").unwrap_err();
    assert_eq!(err.error_type, ErrorType::LabelShadowsSymbol);
    assert_eq!(err.line, 2);
}

#[test]
fn test_error_points_at_offending_line() {
    let err = assemble("NOP\nNOP\n  LDA #$1FF\nNOP").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.column, 2);
    assert_eq!(err.text, "  LDA #$1FF");
}

#[test]
fn test_branch_out_of_range() {
    let mut source = String::from("start: NOP\n");
    for _ in 0..130 {
        source.push_str("NOP\n");
    }
    source.push_str("BNE start\n");

    let err = assemble(&source).unwrap_err();
    assert_eq!(err.error_type, ErrorType::OperandOutOfRange);
    assert_eq!(err.line, 132);
}

#[test]
fn test_branch_wraps_around_top_of_memory() {
    let output = assemble(".org $FFFC
BNE $0000").unwrap();
    assert_eq!(output.start, 0xFFFC);
    assert_eq!(output.bytes, vec![0xD0, 0x02]);

    let output = assemble(".org $0000
BEQ $FFF0").unwrap();
    assert_eq!(output.bytes, vec![0xF0, 0xEE]);
}

#[test]
fn test_program_past_end_of_memory() {
    assert_eq!(error_type(".org $FFFE\nNOP\nJMP $0000"), ErrorType::OperandOutOfRange);
    assert!(assemble(".org $FFFD\nJMP $0000").is_ok());
}

// ========== Assembler State ==========

#[test]
fn test_assembler_writes_into_memory() {
    let mut memory = Memory::new();
    let mut assembler = Assembler::with_origin(0x0C00);

    let output = assembler.assemble("LDA #1\nBRK", &mut memory).unwrap();

    assert_eq!(output.origin, 0x0C00);
    assert_eq!(memory.read(0x0C00), 0xA9);
    assert_eq!(memory.read(0x0C02), 0x00);
    assert_eq!(assembler.origin(), 0x0C00);
}

#[test]
fn test_source_map_ranges() {
    let mut memory = Memory::new();
    let mut assembler = Assembler::new();
    assembler
        .assemble("LDA #1\n\nloop: JMP loop", &mut memory)
        .unwrap();

    let map = assembler.source_map();
    assert_eq!(map.line_at(0x0600), Some(1));
    assert_eq!(map.line_at(0x0602), Some(3));
    assert_eq!(map.line_at(0x0601), None);
    assert_eq!(
        map.get_address_range(3),
        Some(AddressRange {
            start: 0x0602,
            end: 0x0605
        })
    );
    assert_eq!(map.get_address_range(2), None);
}

#[test]
fn test_reassembly_replaces_symbols() {
    let mut memory = Memory::new();
    let mut assembler = Assembler::new();

    assembler.assemble("first: NOP", &mut memory).unwrap();
    assembler.assemble("second: NOP", &mut memory).unwrap();

    assert!(assembler.symbols().lookup("FIRST").is_none());
    assert!(assembler.symbols().lookup("SECOND").is_some());
}
