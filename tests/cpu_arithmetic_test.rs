//! Tests for the arithmetic and logic instructions.
//!
//! Tests cover:
//! - ADC and SBC results with carry in and out
//! - Signed overflow detection
//! - Binary arithmetic regardless of the decimal flag
//! - CMP, CPX and CPY flag results
//! - AND, ORA, EOR and BIT

use sim6502::{Memory, MemoryBus, CPU};

/// Creates a CPU with `program` loaded at the default origin.
fn setup_cpu(program: &[u8]) -> CPU<Memory> {
    let mut memory = Memory::new();
    memory.load(0x0600, program);
    CPU::new(memory)
}

// ========== ADC ==========

#[test]
fn test_adc_immediate_basic() {
    let mut cpu = setup_cpu(&[0x69, 0x05]); // ADC #$05
    cpu.set_a(0x10);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x15);
    assert!(!cpu.flag_c());
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_v());
    assert!(!cpu.flag_n());
    assert_eq!(cpu.pc(), 0x0602);
}

#[test]
fn test_adc_signed_overflow() {
    let mut cpu = setup_cpu(&[0x69, 0x01]); // ADC #$01
    cpu.set_a(0x7F);
    cpu.set_flag_c(false);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.flag_v());
    assert!(cpu.flag_n());
    assert!(!cpu.flag_c());
    assert!(!cpu.flag_z());
}

#[test]
fn test_adc_carry_out_and_zero() {
    let mut cpu = setup_cpu(&[0x69, 0x01]);
    cpu.set_a(0xFF);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_v());
}

#[test]
fn test_adc_with_carry_in() {
    let mut cpu = setup_cpu(&[0x69, 0x05]);
    cpu.set_a(0x10);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x16);
}

#[test]
fn test_adc_negative_overflow() {
    // 0x80 + 0xFF = -128 + -1, which does not fit in a signed byte
    let mut cpu = setup_cpu(&[0x69, 0xFF]);
    cpu.set_a(0x80);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x7F);
    assert!(cpu.flag_v());
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
}

#[test]
fn test_adc_ignores_decimal_flag() {
    let mut cpu = setup_cpu(&[0x69, 0x01]);
    cpu.set_a(0x09);
    cpu.set_flag_d(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x0A);
    assert!(cpu.flag_d());
}

#[test]
fn test_adc_zero_page_and_absolute_x() {
    // ADC $10 / ADC $0300,X
    let mut cpu = setup_cpu(&[0x65, 0x10, 0x7D, 0x00, 0x03]);
    cpu.memory_mut().write(0x0010, 0x20);
    cpu.memory_mut().write(0x0304, 0x03);
    cpu.set_x(0x04);

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x20);

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x23);
    assert_eq!(cpu.pc(), 0x0605);
}

// ========== SBC ==========

#[test]
fn test_sbc_without_borrow() {
    let mut cpu = setup_cpu(&[0xE9, 0x03]); // SBC #$03
    cpu.set_a(0x05);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x02);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
}

#[test]
fn test_sbc_borrow() {
    let mut cpu = setup_cpu(&[0xE9, 0x05]);
    cpu.set_a(0x03);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0xFE);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

#[test]
fn test_sbc_carry_clear_subtracts_one_more() {
    let mut cpu = setup_cpu(&[0xE9, 0x01]);
    cpu.set_a(0x05);
    cpu.set_flag_c(false);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x03);
    assert!(cpu.flag_c());
}

#[test]
fn test_sbc_signed_overflow() {
    let mut cpu = setup_cpu(&[0xE9, 0x01]);
    cpu.set_a(0x80);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x7F);
    assert!(cpu.flag_v());
    assert!(cpu.flag_c());
}

// ========== Compare ==========

#[test]
fn test_cmp_equal() {
    let mut cpu = setup_cpu(&[0xC9, 0x10]); // CMP #$10
    cpu.set_a(0x10);

    cpu.step().unwrap();

    assert!(cpu.flag_z());
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
    assert_eq!(cpu.a(), 0x10);
}

#[test]
fn test_cmp_less_than() {
    let mut cpu = setup_cpu(&[0xC9, 0x20]);
    cpu.set_a(0x10);

    cpu.step().unwrap();

    assert!(!cpu.flag_z());
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n()); // 0x10 - 0x20 = 0xF0
}

#[test]
fn test_cmp_greater_than() {
    let mut cpu = setup_cpu(&[0xC9, 0x01]);
    cpu.set_a(0x90);

    cpu.step().unwrap();

    assert!(cpu.flag_c());
    assert!(!cpu.flag_z());
    assert!(cpu.flag_n()); // 0x8F
}

#[test]
fn test_cpx_and_cpy() {
    // CPX #$05 / CPY $10
    let mut cpu = setup_cpu(&[0xE0, 0x05, 0xC4, 0x10]);
    cpu.memory_mut().write(0x0010, 0x40);
    cpu.set_x(0x05);
    cpu.set_y(0x30);

    cpu.step().unwrap();
    assert!(cpu.flag_z());
    assert!(cpu.flag_c());

    cpu.step().unwrap();
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_c());
}

// ========== Logic ==========

#[test]
fn test_and_ora_eor() {
    // AND #$0F / ORA #$80 / EOR #$FF
    let mut cpu = setup_cpu(&[0x29, 0x0F, 0x09, 0x80, 0x49, 0xFF]);
    cpu.set_a(0x3C);

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x0C);
    assert!(!cpu.flag_n());

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x8C);
    assert!(cpu.flag_n());

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x73);
    assert!(!cpu.flag_n());
    assert!(!cpu.flag_z());
}

#[test]
fn test_and_sets_zero() {
    let mut cpu = setup_cpu(&[0x29, 0xF0]);
    cpu.set_a(0x0F);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_z());
}

#[test]
fn test_bit_copies_high_bits() {
    let mut cpu = setup_cpu(&[0x24, 0x10]); // BIT $10
    cpu.memory_mut().write(0x0010, 0xC0);
    cpu.set_a(0x3F);

    cpu.step().unwrap();

    assert!(cpu.flag_z());
    assert!(cpu.flag_n());
    assert!(cpu.flag_v());
    assert_eq!(cpu.a(), 0x3F);
}

#[test]
fn test_bit_nonzero_result() {
    let mut cpu = setup_cpu(&[0x2C, 0x00, 0x03]); // BIT $0300
    cpu.memory_mut().write(0x0300, 0x01);
    cpu.set_a(0x01);
    cpu.set_flag_v(true);

    cpu.step().unwrap();

    assert!(!cpu.flag_z());
    assert!(!cpu.flag_n());
    assert!(!cpu.flag_v());
}
