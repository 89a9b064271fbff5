//! The CHIP-8 virtual machine and everything that drives it.

pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod emulator;
pub mod input;
pub mod instruction;
pub mod keypad;
pub mod memory;
pub mod opcode;
pub mod output;
pub mod quirks;
pub mod runner;
pub mod snapshot;
pub mod timer;

pub use config::Config;
pub use controller::{Controller, ExecutionState};
pub use emulator::Emulator;
pub use quirks::Quirks;
pub use runner::Runner;
