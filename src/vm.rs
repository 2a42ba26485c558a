//! The CHIP-8 virtual machine core: machine state, opcode decoding, and the
//! fetch-decode-execute interpreter.

pub mod error;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod opcode;
pub mod rng;
