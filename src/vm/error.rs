use thiserror::Error;

/// Errors that can occur while loading or running a program.
///
/// Unknown opcode bit patterns are deliberately not represented here; they
/// execute as no-ops, since many programs in the wild rely on that leniency.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VmError {
    #[error("rom is too large: maximum {max} bytes, got {len}")]
    RomTooLarge { len: usize, max: usize },

    #[error("memory access out of bounds at address {addr:#05X}")]
    MemoryOutOfBounds { addr: u16 },

    #[error("stack overflow: subroutine calls exceeded the stack size")]
    StackOverflow,

    #[error("stack underflow: no subroutine to return from")]
    StackUnderflow,

    #[error("invalid key index {key:#04X}, the keypad has keys 0x0 to 0xF")]
    InvalidKeyIndex { key: u8 },
}

/// A [`VmError`] annotated with the opcode word that caused it and the
/// address it was fetched from, so frontends can report exactly which
/// instruction failed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("failed to execute opcode {opcode:#06X} at {addr:#05X}: {source}")]
pub struct StepError {
    pub opcode: u16,
    pub addr: u16,
    #[source]
    pub source: VmError,
}
