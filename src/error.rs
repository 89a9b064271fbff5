//! Errors that stop the virtual machine.

/// Everything that can go wrong while loading or running a program.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid opcode {opcode:#06X} at address {address:#05X}")]
    InvalidOpcode { opcode: u16, address: u16 },

    #[error("ROM is too large ({size} bytes), at most {max} bytes fit in memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("stack overflow: call at address {address:#05X} exceeds the maximum call depth")]
    StackOverflow { address: u16 },

    #[error("stack underflow: return at address {address:#05X} with an empty call stack")]
    StackUnderflow { address: u16 },

    #[error("could not read ROM")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
