//! Drives bytecode execution through `revm` and assembles the result into
//! a [`Trace`] via [`FrameBuilder`].

use crate::error::Error;
use crate::evm::opcodes::OpcodeId;
use crate::exec_trace::builder::{AfterMessage, BeforeMessage, FrameBuilder, StepEvent};
use crate::exec_trace::{ExecutionMode, Trace, TraceMetadata};
use eth_types::{Address as EthAddress, Bytes as EthBytes, Word as EthWord};
use revm::context::{BlockEnv, CfgEnv, ContextTr, Evm, JournalTr, TxEnv};
use revm::database::{CacheDB, Database, EmptyDB};
use revm::handler::instructions::EthInstructions;
use revm::handler::EthPrecompiles;
use revm::interpreter::interpreter::EthInterpreter;
use revm::interpreter::interpreter_types::{InputsTr, Jumps, LoopControl, MemoryTr};
use revm::interpreter::{CallInputs, CallOutcome, CreateInputs, CreateOutcome, Interpreter};
use revm::primitives::{Address as RevmAddress, Bytes as RevmBytes, TxKind, U256 as RevmU256};
use revm::state::{AccountInfo, Bytecode};
use revm::inspector::InspectorEvmTr;
use revm::{Context, InspectEvm, Inspector, MainContext};
use std::cell::RefCell;
use std::rc::Rc;

const TERMINAL_OPCODES: [u8; 5] = [
    OpcodeId::STOP.as_u8(),
    OpcodeId::RETURN.as_u8(),
    OpcodeId::REVERT.as_u8(),
    OpcodeId::INVALID.as_u8(),
    OpcodeId::SELFDESTRUCT.as_u8(),
];

/// A well-known, pre-funded externally-owned account used as the default
/// sender when `params.from` is not supplied.
fn default_sender() -> RevmAddress {
    RevmAddress::from_slice(&[0x11; 20])
}

/// A well-known fixed address used as the default `to` in `call` mode when
/// `params.to` is not supplied.
fn default_callee() -> RevmAddress {
    RevmAddress::from_slice(&[0x22; 20])
}

const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

/// Block-level overrides for one `execute` call.
#[derive(Clone, Debug, Default)]
pub struct BlockOverrides {
    /// Block number.
    pub number: Option<u64>,
    /// Block timestamp.
    pub timestamp: Option<u64>,
    /// Block gas limit.
    pub gas_limit: Option<u64>,
    /// Base fee per gas.
    pub base_fee: Option<u64>,
}

/// Inputs to [`Engine::execute`].
#[derive(Clone, Debug)]
pub struct ExecutionParams {
    /// Hex bytecode: already-deployed code in `call` mode, initcode in
    /// `deploy` mode.
    pub bytecode: EthBytes,
    /// Whether to run `bytecode` as a call or as a contract creation.
    pub mode: ExecutionMode,
    /// Calldata, for `call` mode.
    pub calldata: Option<EthBytes>,
    /// Call value.
    pub value: Option<EthWord>,
    /// Sender address.
    pub from: Option<EthAddress>,
    /// Callee address, for `call` mode.
    pub to: Option<EthAddress>,
    /// Gas limit.
    pub gas_limit: Option<u64>,
    /// Block environment overrides.
    pub block: Option<BlockOverrides>,
}

impl ExecutionParams {
    /// The simplest possible `call`-mode execution of `bytecode`.
    pub fn call(bytecode: EthBytes) -> Self {
        ExecutionParams {
            bytecode,
            mode: ExecutionMode::Call,
            calldata: None,
            value: None,
            from: None,
            to: None,
            gas_limit: None,
            block: None,
        }
    }

    /// The simplest possible `deploy`-mode execution of `initcode`.
    pub fn deploy(initcode: EthBytes) -> Self {
        ExecutionParams {
            bytecode: initcode,
            mode: ExecutionMode::Deploy,
            calldata: None,
            value: None,
            from: None,
            to: None,
            gas_limit: None,
            block: None,
        }
    }
}

/// A handle to the persistent world state shared between the EVM's own
/// execution and the post-processing passes that read resolved code back
/// out of it.
type Db = Rc<RefCell<CacheDB<EmptyDB>>>;

/// Wraps the shared `Db` handle so it can be moved into `revm`'s `Context`
/// while `Engine` keeps its own handle for post-processing reads.
#[derive(Clone)]
struct SharedDb(Db);

impl Database for SharedDb {
    type Error = <CacheDB<EmptyDB> as Database>::Error;

    fn basic(&mut self, address: RevmAddress) -> Result<Option<AccountInfo>, Self::Error> {
        self.0.borrow_mut().basic(address)
    }

    fn code_by_hash(&mut self, code_hash: revm::primitives::B256) -> Result<Bytecode, Self::Error> {
        self.0.borrow_mut().code_by_hash(code_hash)
    }

    fn storage(&mut self, address: RevmAddress, index: RevmU256) -> Result<RevmU256, Self::Error> {
        self.0.borrow_mut().storage(address, index)
    }

    fn block_hash(&mut self, number: u64) -> Result<revm::primitives::B256, Self::Error> {
        self.0.borrow_mut().block_hash(number)
    }
}

type EngineContext = Context<BlockEnv, TxEnv, CfgEnv, SharedDb>;

/// The trace-builder. Owns the underlying interpreter's persistent world
/// state across calls to [`Engine::execute`].
pub struct Engine {
    db: Db,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// A fresh engine with an empty, funded-on-demand world state.
    pub fn new() -> Self {
        Engine { db: Rc::new(RefCell::new(CacheDB::new(EmptyDB::default()))) }
    }

    /// Discard accumulated world state and start fresh.
    pub fn reset_state(&mut self) {
        self.db = Rc::new(RefCell::new(CacheDB::new(EmptyDB::default())));
    }

    /// Not part of the core behaviour; declared on the interface only.
    pub fn get_state(&self) -> Result<(), Error> {
        Err(Error::NotImplemented("Engine::get_state"))
    }

    /// Not part of the core behaviour; declared on the interface only.
    pub fn set_state(&mut self, _modifications: ()) -> Result<(), Error> {
        Err(Error::NotImplemented("Engine::set_state"))
    }

    /// Execute `params.bytecode` to completion and return the resulting
    /// trace.
    pub fn execute(&mut self, params: ExecutionParams) -> Result<Trace, Error> {
        let original_bytecode = params.bytecode.clone();
        let (exec_bytecode, appended_stop) = normalize_terminal_opcode(&original_bytecode);
        if appended_stop {
            log::debug!("execute: appended synthetic STOP, bytecode did not end on a terminal opcode");
        }
        log::debug!("execute: mode={:?} bytecode_len={}", params.mode, original_bytecode.len());

        let from = to_revm_address(params.from.unwrap_or_else(|| from_revm_address(default_sender())));
        let value = to_revm_u256(params.value.unwrap_or_default());
        let gas_limit = params.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT);
        let calldata = params.calldata.clone().unwrap_or_default();

        fund_sender(&self.db, from, value);

        let inspector = RevmTraceInspector::new(self.db.clone());

        let tx_kind = match params.mode {
            ExecutionMode::Deploy => TxKind::Create,
            ExecutionMode::Call => {
                let to = params.to.unwrap_or_else(|| from_revm_address(default_callee()));
                let to_revm = to_revm_address(to);
                self.db
                    .borrow_mut()
                    .insert_account_info(to_revm, AccountInfo {
                        code: Some(Bytecode::new_raw(to_revm_bytes(&exec_bytecode))),
                        ..Default::default()
                    });
                TxKind::Call(to_revm)
            }
        };

        let ctx = Context::mainnet().with_db(SharedDb(self.db.clone()));
        let mut evm = Evm::new_with_inspector(
            ctx,
            inspector,
            EthInstructions::<EthInterpreter, EngineContext>::new_mainnet(),
            EthPrecompiles::default(),
        );

        let tx = TxEnv {
            caller: from,
            kind: tx_kind,
            value,
            data: match params.mode {
                ExecutionMode::Deploy => to_revm_bytes(&exec_bytecode),
                ExecutionMode::Call => to_revm_bytes(&calldata),
            },
            gas_limit,
            ..Default::default()
        };

        evm.inspect_with_tx(tx).map_err(|e| Error::InterpreterError(format!("{e:?}")))?;

        let inspector = evm.inspector();
        let builder = std::mem::replace(&mut inspector.builder, FrameBuilder::new());
        let mut root = builder.finish().ok_or(Error::NoStepsProduced)?;

        if matches!(params.mode, ExecutionMode::Call) {
            // Faithful display per the design: show the caller-supplied
            // bytecode, not the terminal-normalized one.
            root.code = original_bytecode.clone();
            root.input = calldata;
        } else {
            root.input = original_bytecode.clone();
        }

        populate_missing_code(&self.db, &mut root);
        strip_synthetic_stop(&mut root, appended_stop);

        if root.steps.is_empty() {
            return Err(Error::NoStepsProduced);
        }

        let metadata = TraceMetadata {
            mode: params.mode,
            success: root.result.exit_reason == crate::exec_trace::FrameExitReason::Success,
            return_data: root.result.return_data.clone(),
            gas_used: root.result.gas_used,
            deployed_address: root.result.deployed_address,
            appended_stop,
            exec_bytecode,
        };
        log::debug!(
            "execute: finished success={} root_steps={} gas_used={}",
            metadata.success,
            root.steps.len(),
            metadata.gas_used,
        );

        Ok(Trace { root, metadata })
    }
}

fn normalize_terminal_opcode(bytecode: &EthBytes) -> (EthBytes, bool) {
    match bytecode.as_slice().last() {
        Some(last) if TERMINAL_OPCODES.contains(last) => (bytecode.clone(), false),
        _ => {
            let mut padded = bytecode.as_slice().to_vec();
            padded.push(OpcodeId::STOP.as_u8());
            (EthBytes::new(padded), true)
        }
    }
}

fn strip_synthetic_stop(root: &mut crate::exec_trace::Frame, appended_stop: bool) {
    if !appended_stop {
        return;
    }
    if root.steps.last().map(|s| s.opcode) == Some(OpcodeId::STOP.as_u8()) {
        root.steps.pop();
    }
}

fn resolve_code(db: &Db, addr: RevmAddress) -> Option<EthBytes> {
    let info = db.borrow_mut().basic(addr).ok().flatten()?;
    let code = info.code?;
    let bytes = code.bytes();
    if bytes.is_empty() {
        None
    } else {
        Some(EthBytes::new(bytes.to_vec()))
    }
}

fn populate_missing_code(db: &Db, frame: &mut crate::exec_trace::Frame) {
    if frame.code.is_empty() {
        let addr = to_revm_address(frame.code_address);
        if let Some(code) = resolve_code(db, addr) {
            frame.code = code;
        }
    }
    for child in &mut frame.children {
        populate_missing_code(db, &mut child.frame);
    }
}

fn fund_sender(db: &Db, address: RevmAddress, value: RevmU256) {
    let mut db = db.borrow_mut();
    let balance = RevmU256::MAX / RevmU256::from(2) + value;
    let existing = db.basic(address).ok().flatten();
    let info = AccountInfo { balance, nonce: existing.as_ref().map(|i| i.nonce).unwrap_or(0), ..Default::default() };
    db.insert_account_info(address, info);
}

fn to_revm_address(addr: EthAddress) -> RevmAddress {
    RevmAddress::from_slice(addr.0.as_bytes())
}

fn from_revm_address(addr: RevmAddress) -> EthAddress {
    EthAddress::from_slice(addr.as_slice())
}

fn to_revm_u256(word: EthWord) -> RevmU256 {
    RevmU256::from_be_bytes(word.to_be_bytes32())
}

fn from_revm_u256(value: RevmU256) -> EthWord {
    EthWord::from_big_endian(&value.to_be_bytes::<32>())
}

fn to_revm_bytes(bytes: &EthBytes) -> RevmBytes {
    RevmBytes::copy_from_slice(bytes.as_slice())
}

struct PendingStep {
    pc: usize,
    opcode: u8,
    stack: Vec<EthWord>,
    memory: EthBytes,
    gas_left: u64,
    depth: usize,
    sstore_before: Option<EthWord>,
}

/// Translates `revm`'s `Inspector` callbacks into the abstract
/// `beforeMessage` / `step` / `afterMessage` events [`FrameBuilder`]
/// expects.
struct RevmTraceInspector {
    builder: FrameBuilder,
    db: Db,
    pending: Option<PendingStep>,
}

impl RevmTraceInspector {
    fn new(db: Db) -> Self {
        RevmTraceInspector { builder: FrameBuilder::new(), db, pending: None }
    }
}

impl Inspector<EngineContext> for RevmTraceInspector {
    fn step(&mut self, interp: &mut Interpreter, ctx: &mut EngineContext) {
        let pc = interp.bytecode.pc();
        let opcode = interp.bytecode.opcode();
        let depth = ctx.journal().depth();
        let stack: Vec<EthWord> =
            interp.stack.data().iter().rev().map(|v| from_revm_u256(*v)).collect();
        let memory = EthBytes::new(interp.memory.slice(0..interp.memory.size()).to_vec());
        let gas_left = interp.control.gas().remaining();

        let sstore_before = if opcode == OpcodeId::SSTORE.as_u8() && !stack.is_empty() {
            let slot = to_revm_u256(stack[0]);
            let addr = interp.input.target_address();
            self.db.borrow_mut().storage(addr, slot).ok().map(from_revm_u256)
        } else {
            None
        };

        self.pending =
            Some(PendingStep { pc, opcode, stack, memory, gas_left, depth, sstore_before });
    }

    fn step_end(&mut self, interp: &mut Interpreter, _ctx: &mut EngineContext) {
        let Some(pending) = self.pending.take() else { return };
        let gas_cost = pending.gas_left.saturating_sub(interp.control.gas().remaining());
        self.builder.step(StepEvent {
            pc: pending.pc,
            opcode: pending.opcode,
            fee: gas_cost,
            dynamic_fee: None,
            gas_left: pending.gas_left,
            depth: pending.depth,
            stack: pending.stack,
            memory: pending.memory,
            sstore_before: pending.sstore_before,
        });
    }

    fn call(&mut self, _ctx: &mut EngineContext, inputs: &mut CallInputs) -> Option<CallOutcome> {
        // `bytecode_address`, not `target_address`: for DELEGATECALL/
        // CALLCODE the code that executes belongs to a different account
        // than the one whose storage/context the frame runs in.
        let code_address = inputs.bytecode_address;
        let code = resolve_code(&self.db, code_address);
        self.builder.before_message(BeforeMessage {
            to: Some(from_revm_address(code_address)),
            caller: from_revm_address(inputs.caller),
            value: from_revm_u256(inputs.value.get()),
            gas_limit: inputs.gas_limit,
            data: EthBytes::new(inputs.input.to_vec()),
            code,
        });
        None
    }

    fn call_end(&mut self, _ctx: &mut EngineContext, _inputs: &CallInputs, outcome: &mut CallOutcome) {
        let (exception, return_value, gas_used) = classify_outcome_gas(outcome.result.result, &outcome.result.output, outcome.result.gas.spent());
        self.builder.after_message(AfterMessage {
            exception_error: exception,
            return_value,
            execution_gas_used: gas_used,
            created_address: None,
        });
    }

    fn create(&mut self, _ctx: &mut EngineContext, inputs: &mut CreateInputs) -> Option<CreateOutcome> {
        self.builder.before_message(BeforeMessage {
            to: None,
            caller: from_revm_address(inputs.caller),
            value: from_revm_u256(inputs.value),
            gas_limit: inputs.gas_limit,
            data: EthBytes::new(inputs.init_code.to_vec()),
            code: None,
        });
        None
    }

    fn create_end(&mut self, _ctx: &mut EngineContext, _inputs: &CreateInputs, outcome: &mut CreateOutcome) {
        let created_address = outcome.address.map(from_revm_address);
        let (exception, return_value, gas_used) = classify_outcome_gas(outcome.result.result, &outcome.result.output, outcome.result.gas.spent());
        self.builder.after_message(AfterMessage {
            exception_error: exception,
            return_value,
            execution_gas_used: gas_used,
            created_address,
        });
    }
}

fn classify_outcome_gas(
    result: revm::interpreter::InstructionResult,
    output: &RevmBytes,
    gas_used: u64,
) -> (Option<String>, EthBytes, u64) {
    let data = EthBytes::new(output.to_vec());
    if result.is_ok() {
        (None, data, gas_used)
    } else {
        (Some(format!("{result:?}")), data, gas_used)
    }
}
