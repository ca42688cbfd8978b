//! # Memory
//!
//! This module provides the `MemoryBus` trait that decouples the CPU, assembler
//! and disassembler from a specific memory implementation, and [`Memory`], the
//! 64 KiB observable address space used by a simulator session.
//!
//! ## Design Principles
//!
//! The MemoryBus trait follows 6502 hardware behavior:
//! - No bus errors - reads/writes always succeed
//! - Addresses are 16-bit; callers wrap with 16-bit arithmetic
//!
//! ## Observability
//!
//! Every write to [`Memory`] dispatches exactly one
//! [`MemoryEvent::Changed`] carrying the final (masked) value. This is the only
//! way memory-mapped I/O (a display window, a keyboard latch) becomes visible
//! outside the core; the core never attaches meaning to particular addresses.

use crate::disassembler::formatter::hex_dump;
use crate::events::{Dispatcher, ListenerId, Notification};
use std::fmt;

/// Size of the 6502 address space in bytes.
pub const MEMORY_SIZE: usize = 0x10000;

/// Memory bus trait for reading and writing bytes.
///
/// # Examples
///
/// ```
/// use sim6502::{Memory, MemoryBus};
///
/// let mut mem = Memory::new();
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
/// ```
///
/// ## Implementing Custom Memory
///
/// ```
/// use sim6502::MemoryBus;
///
/// struct SmallRam {
///     data: [u8; 0x100],
/// }
///
/// impl MemoryBus for SmallRam {
///     fn read(&self, addr: u16) -> u8 {
///         // Mirror the page across the whole address space
///         self.data[(addr & 0xFF) as usize]
///     }
///
///     fn write(&mut self, addr: u16, value: u8) {
///         self.data[(addr & 0xFF) as usize] = value;
///     }
/// }
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address. Must never panic.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address. Must never panic.
    fn write(&mut self, addr: u16, value: u8);

    /// Reads a little-endian word; the high byte address wraps at 0xFFFF.
    fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

/// Kinds of memory notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryEventKind {
    /// A byte was written.
    Changed,
    /// All memory was zeroed.
    Cleared,
}

impl MemoryEventKind {
    /// Wire name of the notification.
    pub fn name(self) -> &'static str {
        match self {
            MemoryEventKind::Changed => "changed",
            MemoryEventKind::Cleared => "cleared",
        }
    }
}

/// Notification dispatched by [`Memory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    /// `value` was written at `addr`.
    Changed { addr: u16, value: u8 },
    /// Memory was reset to zero. Listeners should drop any cached contents.
    Cleared,
}

impl Notification for MemoryEvent {
    type Kind = MemoryEventKind;

    fn kind(&self) -> MemoryEventKind {
        match self {
            MemoryEvent::Changed { .. } => MemoryEventKind::Changed,
            MemoryEvent::Cleared => MemoryEventKind::Cleared,
        }
    }
}

/// The simulator's 64 KiB address space.
///
/// All addresses (0x0000-0xFFFF) are writable RAM initialized to 0x00.
///
/// # Examples
///
/// ```
/// use sim6502::{Memory, MemoryEvent, MemoryEventKind};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let mut memory = Memory::new();
/// let writes = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&writes);
/// memory.subscribe(MemoryEventKind::Changed, move |event| {
///     if let MemoryEvent::Changed { addr, value } = *event {
///         sink.borrow_mut().push((addr, value));
///     }
/// });
///
/// memory.set(0x0200, 300); // masked to 44
/// assert_eq!(memory.get(0x0200), 44);
/// assert_eq!(*writes.borrow(), vec![(0x0200, 44)]);
/// ```
pub struct Memory {
    data: Box<[u8]>,
    listeners: Dispatcher<MemoryEvent>,
}

impl Memory {
    /// Creates a new zeroed address space with no listeners.
    pub fn new() -> Self {
        Self {
            data: vec![0; MEMORY_SIZE].into_boxed_slice(),
            listeners: Dispatcher::new(),
        }
    }

    /// Returns the byte at `addr`.
    pub fn get(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    /// Stores the low 8 bits of `value` at `addr` and notifies listeners.
    pub fn set(&mut self, addr: u16, value: u32) {
        let value = (value & 0xFF) as u8;
        self.data[addr as usize] = value;
        self.listeners.dispatch(&MemoryEvent::Changed { addr, value });
    }

    /// Returns the little-endian word at `addr`, `addr + 1`.
    pub fn get_word(&self, addr: u16) -> u16 {
        self.read_word(addr)
    }

    /// Writes `bytes` starting at `addr`, wrapping at the top of memory.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            self.set(addr.wrapping_add(offset as u16), byte.into());
        }
    }

    /// Copies `length` bytes starting at `start` (wrapping) into a vector.
    pub fn slice(&self, start: u16, length: usize) -> Vec<u8> {
        (0..length)
            .map(|offset| self.get(start.wrapping_add(offset as u16)))
            .collect()
    }

    /// Renders a hex dump of `length` bytes starting at `start`.
    ///
    /// Rows hold 16 bytes and are prefixed with their address:
    ///
    /// ```
    /// use sim6502::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.load(0x0600, &[0xA9, 0x01]);
    /// assert_eq!(memory.format(0x0600, 2), "0600: A9 01\n");
    /// ```
    pub fn format(&self, start: u16, length: usize) -> String {
        hex_dump(self, start, length)
    }

    /// Zeroes every byte and dispatches a single [`MemoryEvent::Cleared`].
    ///
    /// Listeners stay registered.
    pub fn reset(&mut self) {
        self.data.fill(0);
        self.listeners.dispatch(&MemoryEvent::Cleared);
    }

    /// Registers a listener for memory notifications of `kind`.
    pub fn subscribe<F>(&mut self, kind: MemoryEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&MemoryEvent) + 'static,
    {
        self.listeners.subscribe(kind, listener)
    }

    /// Removes a listener registered with [`Memory::subscribe`].
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("size", &self.data.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl MemoryBus for Memory {
    fn read(&self, addr: u16) -> u8 {
        self.get(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.set(addr, value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();

        assert_eq!(mem.get(0x0000), 0x00);
        assert_eq!(mem.get(0xFFFF), 0x00);

        mem.set(0x1234, 0x42);
        assert_eq!(mem.get(0x1234), 0x42);

        assert_eq!(mem.get(0x1233), 0x00);
        assert_eq!(mem.get(0x1235), 0x00);
    }

    #[test]
    fn test_set_masks_to_byte() {
        let mut mem = Memory::new();
        mem.set(0x0010, 300);
        assert_eq!(mem.get(0x0010), 44);
        mem.set(0x0011, 0x1FF);
        assert_eq!(mem.get(0x0011), 0xFF);
    }

    #[test]
    fn test_get_word_wraps() {
        let mut mem = Memory::new();
        mem.set(0xFFFF, 0x34);
        mem.set(0x0000, 0x12);
        assert_eq!(mem.get_word(0xFFFF), 0x1234);
    }

    #[test]
    fn test_one_notification_per_write() {
        let mut mem = Memory::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        mem.subscribe(MemoryEventKind::Changed, move |_| *c.borrow_mut() += 1);

        mem.load(0x0200, &[1, 2, 3]);
        mem.set(0x0300, 7);
        assert_eq!(*count.borrow(), 4);
    }

    #[test]
    fn test_reset_keeps_listeners() {
        let mut mem = Memory::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let e1 = Rc::clone(&events);
        let e2 = Rc::clone(&events);
        mem.subscribe(MemoryEventKind::Cleared, move |e| e1.borrow_mut().push(*e));
        mem.subscribe(MemoryEventKind::Changed, move |e| e2.borrow_mut().push(*e));

        mem.set(0x0400, 9);
        mem.reset();
        mem.set(0x0401, 1);

        assert_eq!(mem.get(0x0400), 0);
        assert_eq!(
            *events.borrow(),
            vec![
                MemoryEvent::Changed { addr: 0x0400, value: 9 },
                MemoryEvent::Cleared,
                MemoryEvent::Changed { addr: 0x0401, value: 1 },
            ]
        );
    }

    #[test]
    fn test_slice_wraps() {
        let mut mem = Memory::new();
        mem.set(0xFFFF, 0xAA);
        mem.set(0x0000, 0xBB);
        assert_eq!(mem.slice(0xFFFF, 2), vec![0xAA, 0xBB]);
    }
}
