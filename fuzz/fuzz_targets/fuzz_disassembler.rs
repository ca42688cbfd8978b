//! Fuzz target for the disassembler.
//!
//! Feeds arbitrary byte sequences to the disassembler and checks that the
//! records tile the input exactly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sim6502::disassemble_bytes;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bytes: Vec<u8>,
    start_address: u16,
}

fuzz_target!(|input: FuzzInput| {
    // Limit input size to prevent OOM
    if input.bytes.len() > 65536 {
        return;
    }

    let instructions = disassemble_bytes(&input.bytes, input.start_address);

    let mut total_size: usize = 0;
    let mut expected_address = input.start_address;

    for instr in &instructions {
        assert_eq!(instr.address, expected_address);
        assert!((1..=3).contains(&instr.bytes.len()));
        assert_eq!(instr.bytes[0], instr.opcode);
        assert!(!instr.text.is_empty());

        total_size += instr.bytes.len();
        expected_address = expected_address.wrapping_add(instr.bytes.len() as u16);
    }

    assert_eq!(total_size, input.bytes.len());
});
