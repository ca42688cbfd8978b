//! WebAssembly bindings for the simulator.
//!
//! This module exposes a [`Simulator`](crate::Simulator) session to
//! JavaScript so that a browser page can assemble, run and debug programs.

pub mod api;

pub use api::Simulator6502;
