//! Runs every program in demos/ and checks what it prints.

use sim6502::{Event, EventKind, ExecutionState, Simulator, SimulatorConfig};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Assembles and runs `source`, returning the final state and printed text.
fn run_program(source: &str) -> (Simulator, ExecutionState, String) {
    let mut sim = Simulator::new(SimulatorConfig::default().with_max_batches(Some(100)));
    let printed = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&printed);
    sim.subscribe(EventKind::PseudoOp, move |event| {
        if let Event::PseudoOp {
            output: Some(text), ..
        } = event
        {
            sink.borrow_mut().push_str(text);
        }
    });

    sim.assemble(source).unwrap();
    let state = sim.run().unwrap();
    let text = printed.borrow().clone();
    (sim, state, text)
}

#[test]
fn test_hello() {
    let (_, state, text) = run_program(include_str!("../demos/hello.asm"));
    assert_eq!(state, ExecutionState::Completed);
    assert_eq!(text, "Hello, 6502!");
}

#[test]
fn test_countdown() {
    let (sim, state, text) = run_program(include_str!("../demos/countdown.asm"));
    assert_eq!(state, ExecutionState::Completed);
    assert_eq!(text, "5 4 3 2 1 ");
    assert_eq!(sim.cpu().x(), 0);
}

#[test]
fn test_fibonacci() {
    let (_, state, text) = run_program(include_str!("../demos/fibonacci.asm"));
    assert_eq!(state, ExecutionState::Completed);
    assert_eq!(text, "0 1 1 2 3 5 8 13 21 34 55 89 ");
}

#[test]
fn test_subroutine() {
    let (sim, state, text) = run_program(include_str!("../demos/subroutine.asm"));
    assert_eq!(state, ExecutionState::Completed);
    assert_eq!(text, "Hi bye");
    assert_eq!(sim.cpu().sp(), 0xFF);
}

#[test]
fn test_screen_fill() {
    let (sim, state, _) = run_program(include_str!("../demos/screen.asm"));
    assert_eq!(state, ExecutionState::Completed);
    let row = sim.memory().slice(0x0200, 32);
    let expected: Vec<u8> = (0..32u8).map(|i| i & 0x0F).collect();
    assert_eq!(row, expected);
}

#[test]
fn test_all_demos_assemble() {
    let demo_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

    let mut files: Vec<_> = fs::read_dir(&demo_dir)
        .expect("Failed to read demos directory")
        .map(|entry| entry.expect("Failed to read directory entry").path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("asm"))
        .collect();
    files.sort();
    assert!(!files.is_empty(), "no .asm files in demos/");

    let mut failed = Vec::new();
    for path in &files {
        let source = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        if let Err(err) = sim6502::assemble(&source) {
            failed.push(format!("{}: {}", path.display(), err));
        }
    }

    assert!(failed.is_empty(), "demos failed to assemble:\n{}", failed.join("\n"));
}
