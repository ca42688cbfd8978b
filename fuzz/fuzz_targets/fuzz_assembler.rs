//! Fuzz target for the assembler.
//!
//! Feeds arbitrary text to the assembler. Errors are expected; panics are bugs.
//! Successful output must describe what was written to memory.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sim6502::assemble;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    if let Ok(output) = assemble(&source) {
        assert_eq!(output.bytes.len(), output.length);
        assert!(output.start as usize + output.length <= 0x10000);

        // Every symbol in the table is reachable by name
        for symbol in output.symbols.symbols() {
            assert_eq!(output.symbols.lookup(&symbol.name).map(|s| s.value), Some(symbol.value));
        }
    }
});
