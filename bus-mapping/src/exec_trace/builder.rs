//! Interpreter-agnostic frame-tree construction.
//!
//! [`FrameBuilder`] implements the event-handling algorithm from the
//! engine's design: it consumes `beforeMessage` / `step` / `afterMessage`
//! events and produces the immutable [`Frame`] tree. It knows nothing about
//! `revm` or any other concrete interpreter -- [`crate::exec_trace::engine`]
//! is the thing that drives it from a real one.

use crate::evm::opcodes::{lookup_by_code, OpcodeId};
use crate::exec_trace::{
    ChildFrame, Frame, FrameExitReason, FrameResult, FrameType, Step, StepMemory, StorageChange,
};
use eth_types::{Address, Bytes, Word};
use std::collections::BTreeMap;

/// `beforeMessage(msg)`: fired once per new execution context, before its
/// first opcode.
#[derive(Clone, Debug)]
pub struct BeforeMessage {
    /// Account whose code executes here (absent for a `CREATE`-family
    /// message). For `DELEGATECALL`/`CALLCODE` this is the code source,
    /// not the caller's own storage context.
    pub to: Option<Address>,
    /// Caller address.
    pub caller: Address,
    /// Call value.
    pub value: Word,
    /// Gas provided.
    pub gas_limit: u64,
    /// Calldata (calls) or initcode (creates).
    pub data: Bytes,
    /// Code loaded from state, for `CALL`-family children whose code the
    /// interpreter already resolved.
    pub code: Option<Bytes>,
}

/// `step(data)`: fired before each opcode executes.
#[derive(Clone, Debug)]
pub struct StepEvent {
    /// Program counter.
    pub pc: usize,
    /// Raw opcode byte.
    pub opcode: u8,
    /// Base gas fee for this opcode.
    pub fee: u64,
    /// Dynamic gas component, if any.
    pub dynamic_fee: Option<u64>,
    /// Gas remaining before the opcode executes.
    pub gas_left: u64,
    /// Call-stack depth.
    pub depth: usize,
    /// Full stack, top-of-stack at index 0.
    pub stack: Vec<Word>,
    /// Memory contents.
    pub memory: Bytes,
    /// When `opcode` is `SSTORE`, the slot's value before the write, if the
    /// caller was able to read it from the interpreter's state manager.
    pub sstore_before: Option<Word>,
}

/// `afterMessage(result)`: fired when a context exits.
#[derive(Clone, Debug)]
pub struct AfterMessage {
    /// The interpreter's exception message, if the frame ended
    /// exceptionally.
    pub exception_error: Option<String>,
    /// Aggregate return data (or revert reason / deployed runtime code).
    pub return_value: Bytes,
    /// Gas consumed by this frame alone.
    pub execution_gas_used: u64,
    /// The address created, for a successful `CREATE`-family frame.
    pub created_address: Option<Address>,
}

struct OpenFrame {
    frame: Frame,
    storage: BTreeMap<Word, Word>,
}

/// Builds the immutable [`Frame`] tree from a stream of interpreter events.
///
/// Maintains an explicit stack of open frames rather than relying on
/// interpreter recursion, so it stays correct regardless of how the
/// underlying interpreter structures its own call stack.
pub struct FrameBuilder {
    open: Vec<OpenFrame>,
    completed_root: Option<Frame>,
    next_frame_id: usize,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    /// A fresh builder with no frames yet opened.
    pub fn new() -> Self {
        FrameBuilder { open: Vec::new(), completed_root: None, next_frame_id: 0 }
    }

    /// Handle a `beforeMessage` event.
    pub fn before_message(&mut self, msg: BeforeMessage) {
        let frame_type = if self.open.is_empty() {
            FrameType::Root
        } else {
            let parent = &self.open.last().expect("checked non-empty").frame;
            let spawning_mnemonic =
                parent.steps.last().map(|s| s.mnemonic.as_str()).unwrap_or("CALL");
            FrameType::from_spawning_mnemonic(spawning_mnemonic)
        };

        // `msg.data` only doubles as `code` for a CREATE-family message
        // (`msg.to` absent), where the data genuinely *is* the initcode. A
        // CALL-family message's calldata is never its code.
        let code = msg
            .code
            .clone()
            .filter(|c| !c.is_empty())
            .or_else(|| if msg.to.is_none() && !msg.data.is_empty() { Some(msg.data.clone()) } else { None })
            .unwrap_or_default();

        let id = if self.open.is_empty() {
            "root".to_string()
        } else {
            let id = format!("frame-{}", self.next_frame_id);
            self.next_frame_id += 1;
            id
        };

        let frame = Frame {
            id,
            frame_type,
            code_address: msg.to.unwrap_or_default(),
            code,
            input: msg.data,
            value: msg.value,
            caller: msg.caller,
            gas: msg.gas_limit,
            steps: Vec::new(),
            children: Vec::new(),
            result: FrameResult::placeholder(),
        };

        if let Some(parent) = self.open.last_mut() {
            let step_index = parent.frame.steps.len().saturating_sub(1);
            parent.frame.children.push(ChildFrame { step_index, frame: frame.clone() });
        }

        self.open.push(OpenFrame { frame, storage: BTreeMap::new() });
    }

    /// Override the root frame's `code`/`input` with the original
    /// user-supplied bytecode, for faithful display (the root frame may
    /// otherwise show the terminal-normalized `execBytecode`).
    pub fn set_root_display_code(&mut self, code: Bytes, input: Bytes) {
        if let Some(root) = self.open.first_mut() {
            root.frame.code = code;
            root.frame.input = input;
        }
    }

    /// Handle a `step` event.
    pub fn step(&mut self, event: StepEvent) {
        let top = self.open.last_mut().expect("step fired with no open frame");

        // 1. Retro-fill the previous step's post-state from this event.
        if let Some(prev) = top.frame.steps.last_mut() {
            prev.stack_after = Some(event.stack.clone());
            prev.memory_after = Some(event.memory.clone());
        }

        // 2. Snapshot the storage accumulator before this opcode, if any
        // SSTORE has happened earlier in the frame.
        let storage_snapshot = if top.storage.is_empty() { None } else { Some(top.storage.clone()) };

        // 3. SSTORE capture.
        let mut storage_changes = Vec::new();
        if event.opcode == OpcodeId::SSTORE.as_u8() && event.stack.len() >= 2 {
            let slot = event.stack[0];
            let after = event.stack[1];
            if let Some(before) = event.sstore_before {
                storage_changes.push(StorageChange { slot, before, after });
                top.storage.insert(slot, after);
            }
        }

        let info = lookup_by_code(event.opcode);
        let step = Step {
            pc: event.pc,
            opcode: event.opcode,
            mnemonic: info.mnemonic.to_string(),
            gas_remaining: event.gas_left,
            gas_cost: event.fee + event.dynamic_fee.unwrap_or(0),
            depth: event.depth,
            stack: event.stack,
            memory: StepMemory { current: event.memory, expanded_size: None },
            storage_changes,
            transient_storage_changes: Vec::new(),
            storage: storage_snapshot,
            stack_after: None,
            memory_after: None,
        };
        top.frame.steps.push(step);
    }

    /// Handle an `afterMessage` event, popping and finalizing the current
    /// frame.
    pub fn after_message(&mut self, event: AfterMessage) {
        let mut open = self.open.pop().expect("afterMessage fired with no open frame");

        let exit_reason = match &event.exception_error {
            Some(msg) => FrameExitReason::from_exception_message(msg),
            None => FrameExitReason::Success,
        };
        open.frame.result = FrameResult {
            exit_reason,
            return_data: event.return_value,
            gas_used: event.execution_gas_used,
            deployed_address: event.created_address,
        };
        if open.frame.frame_type.is_create() {
            if let Some(addr) = event.created_address {
                open.frame.code_address = addr;
            }
        }

        if let Some(last) = open.frame.steps.last_mut() {
            if last.stack_after.is_none() {
                last.stack_after = Some(synthesize_stack_after(last.opcode, &last.stack));
                last.memory_after.get_or_insert_with(|| last.memory.current.clone());
            }
        }

        let finished = open.frame;
        match self.open.last_mut() {
            // The child was already attached as a placeholder in
            // `before_message`; splice in its finished state.
            Some(parent) => {
                let child = parent
                    .frame
                    .children
                    .last_mut()
                    .expect("a non-root frame was always attached to its parent on creation");
                child.frame = finished;
            }
            None => self.completed_root = Some(finished),
        }
    }

    /// Consume the builder, returning the completed root frame.
    ///
    /// `None` if `afterMessage` was never called for the root (the event
    /// stream was incomplete).
    pub fn finish(self) -> Option<Frame> {
        self.completed_root
    }
}

fn synthesize_stack_after(opcode: u8, stack: &[Word]) -> Vec<Word> {
    match opcode {
        x if x == OpcodeId::STOP.as_u8() || x == OpcodeId::INVALID.as_u8() => stack.to_vec(),
        x if x == OpcodeId::RETURN.as_u8() || x == OpcodeId::REVERT.as_u8() => {
            stack.get(2..).map(|s| s.to_vec()).unwrap_or_default()
        }
        x if x == OpcodeId::SELFDESTRUCT.as_u8() => {
            stack.get(1..).map(|s| s.to_vec()).unwrap_or_default()
        }
        _ => stack.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(v: u64) -> Word {
        Word::from(v)
    }

    fn simple_step(opcode: u8, stack: Vec<Word>) -> StepEvent {
        StepEvent {
            pc: 0,
            opcode,
            fee: 3,
            dynamic_fee: None,
            gas_left: 1_000_000,
            depth: 0,
            stack,
            memory: Bytes::default(),
            sstore_before: None,
        }
    }

    fn root_message() -> BeforeMessage {
        BeforeMessage {
            to: Some(Address::zero()),
            caller: Address::zero(),
            value: Word::zero(),
            gas_limit: 1_000_000,
            data: Bytes::default(),
            code: Some(Bytes::default()),
        }
    }

    #[test]
    fn two_step_push_stop_retrofills_stack_after() {
        let mut b = FrameBuilder::new();
        b.before_message(root_message());
        b.step(StepEvent { pc: 0, ..simple_step(OpcodeId::PUSH1.as_u8(), vec![]) });
        b.step(StepEvent {
            pc: 2,
            ..simple_step(OpcodeId::STOP.as_u8(), vec![word(0x42)])
        });
        b.after_message(AfterMessage {
            exception_error: None,
            return_value: Bytes::default(),
            execution_gas_used: 6,
            created_address: None,
        });

        let root = b.finish().unwrap();
        assert_eq!(root.steps.len(), 2);
        assert_eq!(root.steps[0].stack_after, Some(vec![word(0x42)]));
        assert_eq!(root.result.exit_reason, FrameExitReason::Success);
    }

    #[test]
    fn revert_maps_to_revert_exit_reason() {
        let mut b = FrameBuilder::new();
        b.before_message(root_message());
        b.step(simple_step(OpcodeId::PUSH1.as_u8(), vec![]));
        b.step(simple_step(OpcodeId::PUSH1.as_u8(), vec![word(0)]));
        b.step(simple_step(OpcodeId::REVERT.as_u8(), vec![word(0), word(0)]));
        b.step(simple_step(OpcodeId::STOP.as_u8(), vec![]));
        b.after_message(AfterMessage {
            exception_error: Some("execution reverted".to_string()),
            return_value: Bytes::default(),
            execution_gas_used: 9,
            created_address: None,
        });

        let root = b.finish().unwrap();
        assert_eq!(root.result.exit_reason, FrameExitReason::Revert);
    }

    #[test]
    fn sstore_capture_builds_storage_change_and_snapshot() {
        let mut b = FrameBuilder::new();
        b.before_message(root_message());
        b.step(StepEvent {
            sstore_before: Some(word(0)),
            ..simple_step(OpcodeId::SSTORE.as_u8(), vec![word(1), word(0x42)])
        });
        b.step(simple_step(OpcodeId::STOP.as_u8(), vec![]));
        b.after_message(AfterMessage {
            exception_error: None,
            return_value: Bytes::default(),
            execution_gas_used: 20_000,
            created_address: None,
        });

        let root = b.finish().unwrap();
        assert_eq!(
            root.steps[0].storage_changes,
            vec![StorageChange { slot: word(1), before: word(0), after: word(0x42) }]
        );
        assert!(root.steps[0].storage.is_none());
        assert_eq!(root.steps[1].storage, Some(BTreeMap::from([(word(1), word(0x42))])));
    }

    #[test]
    fn deploy_then_call_produces_three_sibling_frame_types() {
        let mut b = FrameBuilder::new();
        b.before_message(root_message());
        b.step(simple_step(OpcodeId::CREATE.as_u8(), vec![word(0), word(0), word(0)]));

        b.before_message(BeforeMessage {
            to: None,
            caller: Address::zero(),
            value: Word::zero(),
            gas_limit: 500_000,
            data: Bytes::new(vec![0xfe]),
            code: None,
        });
        b.step(simple_step(OpcodeId::STOP.as_u8(), vec![]));
        b.after_message(AfterMessage {
            exception_error: None,
            return_value: Bytes::default(),
            execution_gas_used: 50_000,
            created_address: Some(Address::from_slice(&[0xaa; 20])),
        });

        b.step(simple_step(OpcodeId::CALL.as_u8(), vec![
            word(100_000),
            word(0),
            word(0),
            word(0),
            word(0),
            word(0),
            word(0),
        ]));

        b.before_message(BeforeMessage {
            to: Some(Address::from_slice(&[0xaa; 20])),
            caller: Address::zero(),
            value: Word::zero(),
            gas_limit: 100_000,
            data: Bytes::default(),
            code: Some(Bytes::new(vec![0x00])),
        });
        b.step(simple_step(OpcodeId::STOP.as_u8(), vec![]));
        b.after_message(AfterMessage {
            exception_error: None,
            return_value: Bytes::default(),
            execution_gas_used: 21,
            created_address: None,
        });

        b.step(simple_step(OpcodeId::STOP.as_u8(), vec![word(1)]));
        b.after_message(AfterMessage {
            exception_error: None,
            return_value: Bytes::default(),
            execution_gas_used: 200_000,
            created_address: None,
        });

        let root = b.finish().unwrap();
        assert_eq!(root.frame_type, FrameType::Root);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].frame.frame_type, FrameType::Create);
        assert_eq!(root.children[0].frame.input.as_slice(), &[0xfe]);
        assert_eq!(root.children[0].frame.result.deployed_address, Some(Address::from_slice(&[0xaa; 20])));
        assert_eq!(root.children[1].frame.frame_type, FrameType::Call);
        assert_eq!(root.children[1].frame.code.as_slice(), &[0x00]);
        assert!(root.children[0].step_index < root.children[1].step_index);
    }

    #[test]
    fn synthesizes_stack_after_when_no_successor_step_exists() {
        let mut b = FrameBuilder::new();
        b.before_message(root_message());
        b.step(simple_step(OpcodeId::STOP.as_u8(), vec![word(7)]));
        b.after_message(AfterMessage {
            exception_error: None,
            return_value: Bytes::default(),
            execution_gas_used: 0,
            created_address: None,
        });

        let root = b.finish().unwrap();
        assert_eq!(root.steps[0].stack_after, Some(vec![word(7)]));
    }
}
