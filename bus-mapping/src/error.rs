//! Error module for the bus-mapping crate.
//!
//! Holds every failure kind in the crate's error taxonomy: the assembler
//! fails fast with line-number context, the disassembler rejects malformed
//! hex, and the engine fails only for structural problems. EVM-level
//! execution outcomes (revert, out-of-gas, ...) are never represented here
//! -- they are data on `FrameResult::exit_reason`, not errors.

use thiserror::Error;

/// Error type for any bus-mapping failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A mnemonic token on `line` was not found in the opcode table.
    #[error("unknown mnemonic on line {line}")]
    UnknownMnemonic {
        /// 1-based source line.
        line: usize,
    },
    /// A PUSH-family opcode on `line` needs a `bytes`-byte immediate but
    /// none was given.
    #[error("missing {bytes}-byte immediate on line {line}")]
    MissingImmediate {
        /// 1-based source line.
        line: usize,
        /// Declared immediate width in bytes.
        bytes: usize,
    },
    /// The immediate on `line` does not fit in `bytes` bytes.
    #[error("immediate on line {line} does not fit in {bytes} bytes")]
    ImmediateTooLarge {
        /// 1-based source line.
        line: usize,
        /// Declared immediate width in bytes.
        bytes: usize,
    },
    /// The immediate on `line` was a negative decimal literal.
    #[error("negative immediate on line {line}")]
    NegativeImmediate {
        /// 1-based source line.
        line: usize,
    },
    /// Disassembler input had an odd number of hex characters.
    #[error("odd length hex string")]
    OddLengthHex,
    /// Disassembler input contained a byte outside `[0-9a-fA-F]`.
    #[error("non-hex character in input")]
    NonHexChar,
    /// `execute` produced a root frame with zero steps: the bytecode was
    /// empty or trapped before its first instruction.
    #[error("no steps produced")]
    NoStepsProduced,
    /// The underlying interpreter reported a failure not attributable to
    /// an EVM-level revert (a protocol violation, a database error, ...).
    #[error("interpreter error: {0}")]
    InterpreterError(String),
    /// `Engine::get_state` / `Engine::set_state` are declared on the
    /// interface but are not part of the core behaviour.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl From<eth_types::Error> for Error {
    fn from(e: eth_types::Error) -> Self {
        match e {
            eth_types::Error::OddLengthHex => Error::OddLengthHex,
            eth_types::Error::NonHexChar => Error::NonHexChar,
        }
    }
}
