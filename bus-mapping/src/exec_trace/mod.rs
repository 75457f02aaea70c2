//! The trace data model: an immutable tree of [`Frame`]s produced once by
//! the [`Engine`](crate::exec_trace::engine::Engine) and never mutated
//! afterwards.

pub mod builder;
pub mod engine;

use eth_types::{Address, Bytes, Word};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The mode an [`crate::exec_trace::engine::ExecutionParams`] requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run bytecode as already-deployed code against `to`.
    Call,
    /// Run bytecode as initcode, deploying a new contract.
    Deploy,
}

/// One execution context: the root, a `CALL`-family child, or a
/// `CREATE`/`CREATE2` child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameType {
    /// The outermost frame of the trace.
    Root,
    /// `CALL`.
    Call,
    /// `STATICCALL`.
    Staticcall,
    /// `DELEGATECALL`.
    Delegatecall,
    /// `CALLCODE`.
    Callcode,
    /// `CREATE`.
    Create,
    /// `CREATE2`.
    Create2,
}

impl FrameType {
    /// Infer the frame type a new child frame must have from the mnemonic
    /// of the step in the parent frame that spawned it.
    pub fn from_spawning_mnemonic(mnemonic: &str) -> Self {
        match mnemonic {
            "CREATE" => FrameType::Create,
            "CREATE2" => FrameType::Create2,
            "STATICCALL" => FrameType::Staticcall,
            "DELEGATECALL" => FrameType::Delegatecall,
            "CALLCODE" => FrameType::Callcode,
            _ => FrameType::Call,
        }
    }

    /// Whether this frame type pertains to contract creation.
    pub fn is_create(&self) -> bool {
        matches!(self, FrameType::Create | FrameType::Create2 | FrameType::Root)
    }
}

/// The closed set of ways a frame's execution can conclude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameExitReason {
    /// Ran to completion (`STOP`, `RETURN`, or fell off the end of code).
    Success,
    /// Explicit `REVERT`.
    Revert,
    /// `INVALID` or any other unclassified interpreter exception.
    Invalid,
    /// Ran out of gas.
    OutOfGas,
    /// Popped from an empty stack.
    StackUnderflow,
    /// Pushed past the 1024-item stack limit.
    StackOverflow,
    /// Jumped to a non-`JUMPDEST` destination.
    InvalidJump,
    /// Attempted a state-changing operation inside a `STATICCALL`.
    WriteProtection,
}

impl FrameExitReason {
    /// Map an underlying interpreter's exception message onto a
    /// [`FrameExitReason`] by case-insensitive substring test.
    pub fn from_exception_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("revert") {
            FrameExitReason::Revert
        } else if lower.contains("out of gas") {
            FrameExitReason::OutOfGas
        } else if lower.contains("stack underflow") {
            FrameExitReason::StackUnderflow
        } else if lower.contains("stack overflow") {
            FrameExitReason::StackOverflow
        } else if lower.contains("invalid jump") {
            FrameExitReason::InvalidJump
        } else if lower.contains("static") {
            FrameExitReason::WriteProtection
        } else {
            FrameExitReason::Invalid
        }
    }
}

/// A `{slot, before, after}` triple recording one storage write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageChange {
    /// The storage slot written.
    pub slot: Word,
    /// The value at `slot` before this write.
    pub before: Word,
    /// The value at `slot` after this write.
    pub after: Word,
}

/// Pre-execution memory observation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMemory {
    /// Memory contents before the opcode executes.
    pub current: Bytes,
    /// New total byte size if this opcode triggers expansion, else `None`.
    ///
    /// The engine does not compute memory expansion; this is always `None`
    /// in traces it produces.
    pub expanded_size: Option<u64>,
}

/// Pre-execution observation of one opcode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Program counter.
    pub pc: usize,
    /// Raw opcode byte.
    pub opcode: u8,
    /// Opcode mnemonic (`"no info"` for an undefined byte, matching the
    /// static table's sentinel).
    pub mnemonic: String,
    /// Gas remaining before this opcode executes.
    pub gas_remaining: u64,
    /// This opcode's gas cost (base fee plus any dynamic component).
    pub gas_cost: u64,
    /// Call-stack depth this step executed at.
    pub depth: usize,
    /// Full stack before the opcode, top-of-stack at index 0.
    pub stack: Vec<Word>,
    /// Memory before the opcode.
    pub memory: StepMemory,
    /// Storage writes this opcode performed (normally at most one, for
    /// `SSTORE`).
    pub storage_changes: Vec<StorageChange>,
    /// Transient storage writes this opcode performed. Reserved: populated
    /// only when the underlying interpreter surfaces `TSTORE` events.
    pub transient_storage_changes: Vec<StorageChange>,
    /// Snapshot of this frame's accumulated storage before this opcode,
    /// present only once at least one `SSTORE` has executed earlier in the
    /// frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<BTreeMap<Word, Word>>,
    /// Full stack after the opcode executes. Filled in once the next step
    /// (or frame-exit synthesis) is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_after: Option<Vec<Word>>,
    /// Memory after the opcode executes. Filled in the same way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_after: Option<Bytes>,
}

/// An execution context's result once it has exited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResult {
    /// How the frame's execution concluded.
    pub exit_reason: FrameExitReason,
    /// Aggregate return data (or revert reason / deployed runtime code).
    pub return_data: Bytes,
    /// Total gas consumed by this frame alone.
    pub gas_used: u64,
    /// The address this frame deployed, if it was a successful
    /// `CREATE`/`CREATE2`/deploy-mode root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_address: Option<Address>,
}

impl FrameResult {
    fn placeholder() -> Self {
        FrameResult {
            exit_reason: FrameExitReason::Success,
            return_data: Bytes::default(),
            gas_used: 0,
            deployed_address: None,
        }
    }
}

/// Pairs a completed child [`Frame`] with the index, within the parent's
/// `steps`, of the instruction that spawned it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildFrame {
    /// Index into the parent frame's `steps`.
    pub step_index: usize,
    /// The child execution context.
    pub frame: Frame,
}

/// A single execution context: the root, a `CALL`-family child, or a
/// `CREATE`/`CREATE2` child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// `"root"` for the outermost frame, `"frame-0"`, `"frame-1"`, ... for
    /// every other frame in creation order.
    pub id: String,
    /// Which kind of execution context this is.
    #[serde(rename = "type")]
    pub frame_type: FrameType,
    /// Account whose code executes here.
    pub code_address: Address,
    /// Bytecode executed in this frame.
    pub code: Bytes,
    /// Calldata (for calls) or initcode (for creates).
    pub input: Bytes,
    /// Call value.
    pub value: Word,
    /// Caller address.
    pub caller: Address,
    /// Gas provided to this frame.
    pub gas: u64,
    /// Opcode-level steps, in execution order.
    pub steps: Vec<Step>,
    /// Child frames, sorted non-decreasingly by `step_index`.
    pub children: Vec<ChildFrame>,
    /// This frame's exit.
    pub result: FrameResult,
}

/// Aggregate facts about one `execute` call, alongside the root [`Frame`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceMetadata {
    /// Whether `execute` was invoked in `call` or `deploy` mode.
    pub mode: ExecutionMode,
    /// Mirrors `root.result.exit_reason == Success`.
    pub success: bool,
    /// `root.result.return_data`.
    pub return_data: Bytes,
    /// `root.result.gas_used`.
    pub gas_used: u64,
    /// The deployed contract address, set in `deploy` mode on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_address: Option<Address>,
    /// Whether the Engine appended a synthetic `STOP` to `params.bytecode`
    /// before execution because its last byte was not a terminal opcode.
    pub appended_stop: bool,
    /// The bytecode actually dispatched to the interpreter: `params.bytecode`
    /// plus the synthetic `STOP`, if `appended_stop` is set.
    pub exec_bytecode: Bytes,
}

/// The root artifact of one `execute` call: an immutable tree of frames
/// plus summary metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// The outermost execution context.
    pub root: Frame,
    /// Summary facts about the execution, derived from `root`.
    pub metadata: TraceMetadata,
}
