//! Tests for loads, stores, transfers, increments and shifts.
//!
//! Tests cover:
//! - Every addressing mode through LDA and STA
//! - Zero page index and pointer wraparound
//! - Transfer flag behavior (TXS sets none)
//! - INC/DEC on memory and registers
//! - ASL/LSR/ROL/ROR on the accumulator and memory

use sim6502::{Memory, MemoryBus, MemoryEvent, MemoryEventKind, CPU};
use std::cell::RefCell;
use std::rc::Rc;

/// Creates a CPU with `program` loaded at the default origin.
fn setup_cpu(program: &[u8]) -> CPU<Memory> {
    let mut memory = Memory::new();
    memory.load(0x0600, program);
    CPU::new(memory)
}

// ========== Loads ==========

#[test]
fn test_lda_immediate_flags() {
    // LDA #$00 / LDA #$80 / LDA #$01
    let mut cpu = setup_cpu(&[0xA9, 0x00, 0xA9, 0x80, 0xA9, 0x01]);

    cpu.step().unwrap();
    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());

    cpu.step().unwrap();
    assert!(!cpu.flag_z());
    assert!(cpu.flag_n());

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x01);
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_lda_addressing_modes() {
    let mut memory = Memory::new();
    memory.load(
        0x0600,
        &[
            0xA5, 0x10, // LDA $10
            0xB5, 0x10, // LDA $10,X
            0xAD, 0x00, 0x03, // LDA $0300
            0xBD, 0x00, 0x03, // LDA $0300,X
            0xB9, 0x00, 0x03, // LDA $0300,Y
            0xA1, 0x20, // LDA ($20,X)
            0xB1, 0x30, // LDA ($30),Y
        ],
    );
    memory.load(0x0010, &[0x11, 0x00, 0x12]);
    memory.load(0x0300, &[0x13, 0x00, 0x14, 0x00, 0x15]);
    memory.load(0x0022, &[0x00, 0x04]); // pointer for ($20,X) -> $0400
    memory.load(0x0030, &[0x00, 0x05]); // pointer for ($30),Y -> $0500 + Y
    memory.load(0x0400, &[0x16]);
    memory.load(0x0504, &[0x17]);

    let mut cpu = CPU::new(memory);
    cpu.set_x(0x02);
    cpu.set_y(0x04);

    let expected = [0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17];
    for value in expected {
        cpu.step().unwrap();
        assert_eq!(cpu.a(), value);
    }
    assert_eq!(cpu.pc(), 0x0600 + 17);
}

#[test]
fn test_zero_page_x_wraps_within_page() {
    let mut cpu = setup_cpu(&[0xB5, 0xF0]); // LDA $F0,X
    cpu.memory_mut().write(0x0010, 0x42);
    cpu.memory_mut().write(0x0110, 0x99);
    cpu.set_x(0x20);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x42);
}

#[test]
fn test_indirect_x_pointer_wraps_within_page() {
    let mut cpu = setup_cpu(&[0xA1, 0xFF]); // LDA ($FF,X) with X=0 reads $FF/$00
    cpu.memory_mut().write(0x00FF, 0x34);
    cpu.memory_mut().write(0x0000, 0x12);
    cpu.memory_mut().write(0x1234, 0x77);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x77);
}

#[test]
fn test_absolute_y_wraps_at_top_of_memory() {
    let mut cpu = setup_cpu(&[0xB9, 0xFF, 0xFF]); // LDA $FFFF,Y
    cpu.memory_mut().write(0x0001, 0x5A);
    cpu.set_y(0x02);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x5A);
}

#[test]
fn test_ldx_zero_page_y_and_ldy_absolute_x() {
    // LDX $10,Y / LDY $0300,X
    let mut cpu = setup_cpu(&[0xB6, 0x10, 0xBC, 0x00, 0x03]);
    cpu.memory_mut().write(0x0013, 0x80);
    cpu.memory_mut().write(0x0380, 0x07);
    cpu.set_y(0x03);

    cpu.step().unwrap();
    assert_eq!(cpu.x(), 0x80);
    assert!(cpu.flag_n());

    cpu.step().unwrap();
    assert_eq!(cpu.y(), 0x07);
    assert!(!cpu.flag_n());
}

// ========== Stores ==========

#[test]
fn test_sta_stx_sty() {
    // STA $0200 / STX $10 / STY $11,X
    let mut cpu = setup_cpu(&[0x8D, 0x00, 0x02, 0x86, 0x10, 0x94, 0x11]);
    cpu.set_a(0xAA);
    cpu.set_x(0x01);
    cpu.set_y(0xCC);

    cpu.step().unwrap();
    cpu.step().unwrap();
    cpu.step().unwrap();

    assert_eq!(cpu.memory().read(0x0200), 0xAA);
    assert_eq!(cpu.memory().read(0x0010), 0x01);
    assert_eq!(cpu.memory().read(0x0012), 0xCC);
}

#[test]
fn test_stores_do_not_touch_flags() {
    let mut cpu = setup_cpu(&[0x85, 0x10]);
    cpu.set_a(0x00);
    cpu.set_status(0x00);

    cpu.step().unwrap();

    assert!(!cpu.flag_z());
    assert_eq!(cpu.status(), 0x20);
}

#[test]
fn test_store_notifies_memory_listeners() {
    let mut cpu = setup_cpu(&[0x9D, 0x00, 0x02]); // STA $0200,X
    cpu.set_a(0x05);
    cpu.set_x(0x03);

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    cpu.memory_mut()
        .subscribe(MemoryEventKind::Changed, move |event| sink.borrow_mut().push(*event));

    cpu.step().unwrap();

    assert_eq!(
        *events.borrow(),
        vec![MemoryEvent::Changed {
            addr: 0x0203,
            value: 0x05
        }]
    );
}

// ========== Transfers ==========

#[test]
fn test_register_transfers() {
    // TAX / TAY / TXA / TYA
    let mut cpu = setup_cpu(&[0xAA, 0xA8, 0x8A, 0x98]);
    cpu.set_a(0x80);

    cpu.step().unwrap();
    assert_eq!(cpu.x(), 0x80);
    assert!(cpu.flag_n());

    cpu.step().unwrap();
    assert_eq!(cpu.y(), 0x80);

    cpu.set_x(0x00);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_z());

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x80);
    assert!(!cpu.flag_z());
}

#[test]
fn test_txs_sets_no_flags_and_tsx_does() {
    // TXS / TSX
    let mut cpu = setup_cpu(&[0x9A, 0xBA]);
    cpu.set_x(0x00);

    cpu.step().unwrap();
    assert_eq!(cpu.sp(), 0x00);
    assert!(!cpu.flag_z());

    cpu.set_x(0x55);
    cpu.step().unwrap();
    assert_eq!(cpu.x(), 0x00);
    assert!(cpu.flag_z());
}

// ========== Increments ==========

#[test]
fn test_inc_dec_memory() {
    // INC $10 / DEC $11 / DEC $11
    let mut cpu = setup_cpu(&[0xE6, 0x10, 0xC6, 0x11, 0xC6, 0x11]);
    cpu.memory_mut().write(0x0010, 0xFF);
    cpu.memory_mut().write(0x0011, 0x01);

    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(0x0010), 0x00);
    assert!(cpu.flag_z());

    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(0x0011), 0x00);
    assert!(cpu.flag_z());

    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(0x0011), 0xFF);
    assert!(cpu.flag_n());
}

#[test]
fn test_register_increments_wrap() {
    // INX / DEY / INY / DEX
    let mut cpu = setup_cpu(&[0xE8, 0x88, 0xC8, 0xCA]);
    cpu.set_x(0xFF);

    cpu.step().unwrap();
    assert_eq!(cpu.x(), 0x00);
    assert!(cpu.flag_z());

    cpu.step().unwrap();
    assert_eq!(cpu.y(), 0xFF);
    assert!(cpu.flag_n());

    cpu.step().unwrap();
    assert_eq!(cpu.y(), 0x00);

    cpu.step().unwrap();
    assert_eq!(cpu.x(), 0xFF);
}

// ========== Shifts ==========

#[test]
fn test_asl_accumulator() {
    let mut cpu = setup_cpu(&[0x0A]);
    cpu.set_a(0x81);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x02);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
}

#[test]
fn test_lsr_memory() {
    let mut cpu = setup_cpu(&[0x46, 0x10]); // LSR $10
    cpu.memory_mut().write(0x0010, 0x01);

    cpu.step().unwrap();

    assert_eq!(cpu.memory().read(0x0010), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_rol_ror_through_carry() {
    // ROL A / ROR A
    let mut cpu = setup_cpu(&[0x2A, 0x6A]);
    cpu.set_a(0x80);
    cpu.set_flag_c(false);

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x80);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

#[test]
fn test_ror_absolute_x() {
    let mut cpu = setup_cpu(&[0x7E, 0x00, 0x03]); // ROR $0300,X
    cpu.memory_mut().write(0x0301, 0x02);
    cpu.set_x(0x01);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.memory().read(0x0301), 0x81);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}
