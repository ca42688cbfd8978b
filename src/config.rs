//! Simulator configuration.

use crate::cpu::DEFAULT_ORIGIN;

/// Default number of instructions executed per [`Simulator::run`](crate::Simulator::run) batch.
pub const DEFAULT_BATCH_SIZE: usize = 97;

/// Settings for a [`Simulator`](crate::Simulator) session.
///
/// # Examples
///
/// ```
/// use sim6502::SimulatorConfig;
///
/// let config = SimulatorConfig::default()
///     .with_origin(0x0800)
///     .with_max_batches(Some(10));
/// assert_eq!(config.origin, 0x0800);
/// assert_eq!(config.max_batches, Some(10));
/// assert!(config.halt_outside_program);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Address programs are assembled at and execution starts from.
    pub origin: u16,

    /// Instructions executed per batch while running.
    pub batch_size: usize,

    /// Stop a run after this many batches. `None` runs until the program
    /// completes or a stop is requested.
    pub max_batches: Option<usize>,

    /// Treat the program as complete when PC leaves the assembled range.
    pub halt_outside_program: bool,

    /// Zero memory before each assembly.
    pub clear_memory_on_assemble: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            origin: DEFAULT_ORIGIN,
            batch_size: DEFAULT_BATCH_SIZE,
            max_batches: None,
            halt_outside_program: true,
            clear_memory_on_assemble: true,
        }
    }
}

impl SimulatorConfig {
    pub fn with_origin(mut self, origin: u16) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the batch size; zero is raised to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_max_batches(mut self, max_batches: Option<usize>) -> Self {
        self.max_batches = max_batches;
        self
    }

    pub fn with_halt_outside_program(mut self, halt: bool) -> Self {
        self.halt_outside_program = halt;
        self
    }

    pub fn with_clear_memory_on_assemble(mut self, clear: bool) -> Self {
        self.clear_memory_on_assemble = clear;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.origin, 0x0600);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.max_batches, None);
        assert!(config.clear_memory_on_assemble);
    }

    #[test]
    fn test_zero_batch_size_is_raised() {
        assert_eq!(SimulatorConfig::default().with_batch_size(0).batch_size, 1);
    }
}
