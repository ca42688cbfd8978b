//! Integration tests for the observable address space.

use sim6502::{Memory, MemoryBus, MemoryEvent, MemoryEventKind, MEMORY_SIZE};
use std::cell::RefCell;
use std::rc::Rc;

/// Subscribes to every notification kind and records what arrives.
fn recording(memory: &mut Memory) -> Rc<RefCell<Vec<MemoryEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    for kind in [MemoryEventKind::Changed, MemoryEventKind::Cleared] {
        let sink = Rc::clone(&events);
        memory.subscribe(kind, move |event| sink.borrow_mut().push(*event));
    }
    events
}

#[test]
fn test_set_masks_and_notifies_once() {
    let mut memory = Memory::new();
    let events = recording(&mut memory);

    memory.set(0x0200, 300);

    assert_eq!(memory.get(0x0200), 44);
    assert_eq!(
        *events.borrow(),
        vec![MemoryEvent::Changed {
            addr: 0x0200,
            value: 44
        }]
    );
}

#[test]
fn test_every_address_is_writable() {
    let mut memory = Memory::new();
    for addr in [0x0000u16, 0x00FF, 0x0100, 0x7FFF, 0xFFFF] {
        memory.write(addr, 0xA5);
        assert_eq!(memory.read(addr), 0xA5);
    }
    assert_eq!(MEMORY_SIZE, 0x10000);
}

#[test]
fn test_writing_same_value_still_notifies() {
    let mut memory = Memory::new();
    let events = recording(&mut memory);

    memory.write(0x10, 0);
    memory.write(0x10, 0);

    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn test_load_notifies_per_byte() {
    let mut memory = Memory::new();
    let events = recording(&mut memory);

    memory.load(0xFFFF, &[1, 2]);

    assert_eq!(memory.get(0xFFFF), 1);
    assert_eq!(memory.get(0x0000), 2);
    assert_eq!(
        *events.borrow(),
        vec![
            MemoryEvent::Changed {
                addr: 0xFFFF,
                value: 1
            },
            MemoryEvent::Changed { addr: 0, value: 2 },
        ]
    );
}

#[test]
fn test_reset_zeroes_and_sends_one_event() {
    let mut memory = Memory::new();
    memory.load(0x0600, &[1, 2, 3]);
    let events = recording(&mut memory);

    memory.reset();

    assert_eq!(memory.slice(0x0600, 3), vec![0, 0, 0]);
    assert_eq!(*events.borrow(), vec![MemoryEvent::Cleared]);
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let mut memory = Memory::new();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let id = memory.subscribe(MemoryEventKind::Changed, move |_| *sink.borrow_mut() += 1);

    memory.write(0, 1);
    assert!(memory.unsubscribe(id));
    assert!(!memory.unsubscribe(id));
    memory.write(0, 2);

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_word_reads_are_little_endian() {
    let mut memory = Memory::new();
    memory.load(0x1000, &[0x34, 0x12]);

    assert_eq!(memory.get_word(0x1000), 0x1234);
    assert_eq!(memory.read_word(0x1000), 0x1234);
}

#[test]
fn test_format_hex_dump() {
    let mut memory = Memory::new();
    memory.load(0x0200, &[0xDE, 0xAD, 0xBE, 0xEF]);

    assert_eq!(memory.format(0x0200, 4), "0200: DE AD BE EF\n");
}
