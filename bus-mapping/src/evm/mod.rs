//! EVM-level primitives: the static opcode table.

pub mod opcodes;

pub use opcodes::{OpcodeId, OpcodeInfo};
