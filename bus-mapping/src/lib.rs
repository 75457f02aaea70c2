//! The core engine behind an EVM time-travel debugger: it runs a single
//! call or contract deployment through [`revm`], records an immutable
//! [`exec_trace::Trace`] of every opcode-level step and call/create frame
//! it produced, and hands that trace to a [`session::DebugSession`] for
//! step-forward/step-backward/step-over/step-out navigation and
//! breakpoints.
//!
//! ## Modules
//! - [`evm`] -- the static opcode table (mnemonics, stack deltas,
//!   immediate widths) every other module builds on.
//! - [`asm`] -- a small assembler/disassembler between human-readable
//!   mnemonic source and raw bytecode, independent of execution.
//! - [`exec_trace`] -- the trace data model ([`exec_trace::Frame`],
//!   [`exec_trace::Step`]), the interpreter-agnostic [`exec_trace::builder::FrameBuilder`]
//!   that assembles it from abstract before/step/after events, and the
//!   [`exec_trace::engine::Engine`] that drives `revm` to produce those
//!   events.
//! - [`session`] -- [`session::DebugSession`], which flattens a trace and
//!   navigates it.
//!
//! ## Example
//! ```rust,ignore
//! use bus_mapping::exec_trace::engine::{Engine, ExecutionParams};
//! use bus_mapping::session::DebugSession;
//! use eth_types::Bytes;
//! use std::str::FromStr;
//!
//! let bytecode = Bytes::from_str("0x6001600101600055").unwrap();
//! let mut engine = Engine::new();
//! let trace = engine.execute(ExecutionParams::call(bytecode)).unwrap();
//!
//! let mut session = DebugSession::new(&trace);
//! session.step_forward();
//! assert!(session.current_step().is_some());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(broken_intra_doc_links)]
#![deny(missing_docs)]
#![allow(clippy::upper_case_acronyms)] // Too pedantic

pub mod asm;
pub mod error;
pub mod evm;
pub mod exec_trace;
pub mod session;

pub use error::Error;
pub use evm::{OpcodeId, OpcodeInfo};
pub use exec_trace::engine::{Engine, ExecutionParams};
pub use exec_trace::Trace;
pub use session::DebugSession;
