//! The debug session: flattens a [`Trace`]'s frame tree into a globally
//! indexed, navigable sequence and implements step-over / step-out and
//! breakpoints over that flattening.
//!
//! The produced [`Trace`] is immutable; a session holds only one integer
//! cursor and derived read-only views over it.

use crate::evm::opcodes::OpcodeId;
use crate::exec_trace::{Frame, Step, StorageChange, Trace};
use eth_types::Word;

/// One position in the flattened step sequence.
#[derive(Clone, Debug)]
pub struct FlatStep<'t> {
    /// The frame this position belongs to.
    pub frame: &'t Frame,
    /// Index into `frame.steps`, or `usize::MAX` when `is_frame_end`.
    pub step_index: usize,
    /// The chain of frames from the root down to (and including) `frame`.
    pub call_stack: Vec<&'t Frame>,
    /// Whether this is the frame's virtual trailing "end" marker.
    pub is_frame_end: bool,
}

impl<'t> FlatStep<'t> {
    fn real(frame: &'t Frame, step_index: usize, call_stack: Vec<&'t Frame>) -> Self {
        FlatStep { frame, step_index, call_stack, is_frame_end: false }
    }

    fn frame_end(frame: &'t Frame, call_stack: Vec<&'t Frame>) -> Self {
        FlatStep { frame, step_index: usize::MAX, call_stack, is_frame_end: true }
    }
}

fn flatten<'t>(frame: &'t Frame, parent_stack: &[&'t Frame], out: &mut Vec<FlatStep<'t>>) {
    let mut call_stack = parent_stack.to_vec();
    call_stack.push(frame);

    let mut child_idx = 0;
    for i in 0..frame.steps.len() {
        out.push(FlatStep::real(frame, i, call_stack.clone()));
        while child_idx < frame.children.len() && frame.children[child_idx].step_index == i {
            flatten(&frame.children[child_idx].frame, &call_stack, out);
            child_idx += 1;
        }
    }
    out.push(FlatStep::frame_end(frame, call_stack));
}

/// An opaque identifier for a registered [`Breakpoint`].
pub type BreakpointId = u64;

/// A (possibly conjunctive) condition a [`FlatStep`] is tested against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BreakpointCondition {
    /// Match a step at this program counter.
    pub pc: Option<usize>,
    /// Match a step executing this opcode byte.
    pub opcode: Option<u8>,
    /// Match a step whose `storageChanges` touches this slot.
    pub storage_slot: Option<Word>,
    /// Match this exact global flat index.
    pub global_step_index: Option<usize>,
}

impl BreakpointCondition {
    fn matches(&self, flat_index: usize, step: &Step) -> bool {
        if let Some(pc) = self.pc {
            if step.pc != pc {
                return false;
            }
        }
        if let Some(opcode) = self.opcode {
            if step.opcode != opcode {
                return false;
            }
        }
        if let Some(slot) = self.storage_slot {
            if !step.storage_changes.iter().any(|c: &StorageChange| c.slot == slot) {
                return false;
            }
        }
        if let Some(index) = self.global_step_index {
            if flat_index != index {
                return false;
            }
        }
        true
    }
}

/// A registered breakpoint: a condition plus the opaque id returned by
/// [`DebugSession::add_breakpoint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    /// Opaque id.
    pub id: BreakpointId,
    /// The matching condition.
    pub condition: BreakpointCondition,
}

/// Navigates a [`Trace`]'s flattened step sequence.
pub struct DebugSession<'t> {
    trace: &'t Trace,
    flat_steps: Vec<FlatStep<'t>>,
    global_step_index: usize,
    breakpoints: Vec<Breakpoint>,
    next_breakpoint_id: BreakpointId,
}

impl<'t> DebugSession<'t> {
    /// Construct a session over `trace`, flattening its frame tree.
    pub fn new(trace: &'t Trace) -> Self {
        let mut flat_steps = Vec::new();
        flatten(&trace.root, &[], &mut flat_steps);
        DebugSession {
            trace,
            flat_steps,
            global_step_index: 0,
            breakpoints: Vec::new(),
            next_breakpoint_id: 0,
        }
    }

    /// The trace this session navigates.
    pub fn trace(&self) -> &'t Trace {
        self.trace
    }

    /// The full flattened step sequence.
    pub fn flat_steps(&self) -> &[FlatStep<'t>] {
        &self.flat_steps
    }

    /// The current cursor position.
    pub fn global_step_index(&self) -> usize {
        self.global_step_index
    }

    fn current(&self) -> &FlatStep<'t> {
        &self.flat_steps[self.global_step_index]
    }

    /// The frame at the current cursor.
    pub fn current_frame(&self) -> &'t Frame {
        self.current().frame
    }

    /// The step index within `current_frame` at the current cursor, or
    /// `None` at a frame-end marker.
    pub fn current_step_index(&self) -> Option<usize> {
        if self.current().is_frame_end {
            None
        } else {
            Some(self.current().step_index)
        }
    }

    /// The chain of frames from the root to the current frame.
    pub fn call_stack(&self) -> &[&'t Frame] {
        &self.current().call_stack
    }

    /// The `Step` at the current cursor, or `None` at a frame-end marker.
    pub fn current_step(&self) -> Option<&'t Step> {
        let flat = self.current();
        if flat.is_frame_end {
            None
        } else {
            Some(&flat.frame.steps[flat.step_index])
        }
    }

    /// Whether the cursor is at a frame's virtual trailing marker.
    pub fn is_at_frame_end(&self) -> bool {
        self.current().is_frame_end
    }

    /// Advance the cursor by one, saturating at the last index.
    pub fn step_forward(&mut self) {
        self.global_step_index = (self.global_step_index + 1).min(self.flat_steps.len() - 1);
    }

    /// Retreat the cursor by one, saturating at 0.
    pub fn step_backward(&mut self) {
        self.global_step_index = self.global_step_index.saturating_sub(1);
    }

    /// Move the cursor to `index`, clamped to the valid range.
    pub fn jump_to(&mut self, index: usize) {
        self.global_step_index = index.min(self.flat_steps.len() - 1);
    }

    /// Move the cursor to the first flat index.
    pub fn jump_to_start(&mut self) {
        self.global_step_index = 0;
    }

    /// Move the cursor to the last flat index.
    pub fn jump_to_end(&mut self) {
        self.global_step_index = self.flat_steps.len() - 1;
    }

    /// Whether the current step opens a call/create frame, making
    /// [`Self::step_over`] meaningfully different from
    /// [`Self::step_forward`].
    pub fn can_step_over(&self) -> bool {
        self.current_step().map(|s| OpcodeId(s.opcode).is_frame_creating()).unwrap_or(false)
    }

    /// Advance past the entire nested sub-trace produced by the call at
    /// the cursor, if any; otherwise behaves as [`Self::step_forward`].
    pub fn step_over(&mut self) {
        if !self.can_step_over() {
            self.step_forward();
            return;
        }
        let start_frame = self.current().frame as *const Frame;
        let start_step_index = self.current().step_index;
        let last = self.flat_steps.len() - 1;

        while self.global_step_index < last {
            self.global_step_index += 1;
            let flat = &self.flat_steps[self.global_step_index];
            if flat.frame as *const Frame == start_frame
                && (flat.is_frame_end || flat.step_index != start_step_index)
            {
                break;
            }
        }
    }

    /// Whether the cursor is nested inside at least one call/create frame.
    pub fn can_step_out(&self) -> bool {
        self.current().call_stack.len() > 1
    }

    /// Advance until the cursor returns to a shallower call stack depth
    /// than the current one; if already at the top level, jumps to the
    /// end.
    pub fn step_out(&mut self) {
        if !self.can_step_out() {
            self.jump_to_end();
            return;
        }
        let depth = self.current().call_stack.len();
        let last = self.flat_steps.len() - 1;
        while self.global_step_index < last {
            self.global_step_index += 1;
            if self.flat_steps[self.global_step_index].call_stack.len() < depth {
                break;
            }
        }
    }

    /// Register a new breakpoint and return it.
    pub fn add_breakpoint(&mut self, condition: BreakpointCondition) -> Breakpoint {
        let id = self.next_breakpoint_id;
        self.next_breakpoint_id += 1;
        let breakpoint = Breakpoint { id, condition };
        self.breakpoints.push(breakpoint.clone());
        breakpoint
    }

    /// Remove a previously-registered breakpoint.
    pub fn remove_breakpoint(&mut self, id: BreakpointId) {
        self.breakpoints.retain(|b| b.id != id);
    }

    /// All currently active breakpoints.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    fn matches_any_breakpoint(&self, flat_index: usize) -> bool {
        let flat = &self.flat_steps[flat_index];
        if flat.is_frame_end {
            return false;
        }
        let step = &flat.frame.steps[flat.step_index];
        self.breakpoints.iter().any(|b| b.condition.matches(flat_index, step))
    }

    /// Scan forward from the cursor for the first step matching any active
    /// breakpoint; lands on the last index if none matches. Returns
    /// whether a breakpoint was hit.
    pub fn continue_forward(&mut self) -> bool {
        let last = self.flat_steps.len() - 1;
        let mut i = self.global_step_index;
        while i < last {
            i += 1;
            if self.matches_any_breakpoint(i) {
                self.global_step_index = i;
                return true;
            }
        }
        self.global_step_index = last;
        false
    }

    /// Scan backward from the cursor for the first step matching any
    /// active breakpoint; lands on index 0 if none matches. Returns
    /// whether a breakpoint was hit.
    pub fn continue_backward(&mut self) -> bool {
        let mut i = self.global_step_index;
        while i > 0 {
            i -= 1;
            if self.matches_any_breakpoint(i) {
                self.global_step_index = i;
                return true;
            }
        }
        self.global_step_index = 0;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec_trace::{
        ChildFrame, ExecutionMode, FrameExitReason, FrameResult, FrameType, StepMemory,
        TraceMetadata,
    };
    use eth_types::{Address, Bytes};

    fn step(pc: usize, opcode: u8) -> Step {
        Step {
            pc,
            opcode,
            mnemonic: "OP".to_string(),
            gas_remaining: 0,
            gas_cost: 0,
            depth: 0,
            stack: vec![],
            memory: StepMemory::default(),
            storage_changes: vec![],
            transient_storage_changes: vec![],
            storage: None,
            stack_after: None,
            memory_after: None,
        }
    }

    fn leaf_frame(id: &str) -> Frame {
        Frame {
            id: id.to_string(),
            frame_type: FrameType::Root,
            code_address: Address::zero(),
            code: Bytes::default(),
            input: Bytes::default(),
            value: Word::zero(),
            caller: Address::zero(),
            gas: 0,
            steps: (0..5).map(|i| step(i, 0x01)).collect(),
            children: vec![],
            result: FrameResult { exit_reason: FrameExitReason::Success, return_data: Bytes::default(), gas_used: 0, deployed_address: None },
        }
    }

    fn trace_with_five_steps() -> Trace {
        let root = leaf_frame("root");
        Trace {
            root,
            metadata: TraceMetadata {
                mode: ExecutionMode::Call,
                success: true,
                return_data: Bytes::default(),
                gas_used: 0,
                deployed_address: None,
                appended_stop: false,
                exec_bytecode: Bytes::default(),
            },
        }
    }

    #[test]
    fn jump_to_end_lands_on_frame_end_marker() {
        let trace = trace_with_five_steps();
        let mut session = DebugSession::new(&trace);
        session.jump_to_end();
        assert_eq!(session.global_step_index(), 5);
        assert!(session.is_at_frame_end());
        assert!(session.current_step().is_none());
    }

    #[test]
    fn bounds_are_saturating() {
        let trace = trace_with_five_steps();
        let mut session = DebugSession::new(&trace);
        session.step_backward();
        assert_eq!(session.global_step_index(), 0);
        session.jump_to_end();
        session.step_forward();
        assert_eq!(session.global_step_index(), 5);
    }

    #[test]
    fn step_over_on_non_frame_creating_opcode_is_step_forward() {
        let trace = trace_with_five_steps();
        let mut session = DebugSession::new(&trace);
        assert!(!session.can_step_over());
        session.step_over();
        assert_eq!(session.global_step_index(), 1);
    }

    #[test]
    fn step_over_skips_nested_call_frame() {
        let mut root = leaf_frame("root");
        root.steps = vec![step(0, OpcodeId::CALL.as_u8()), step(1, 0x00)];
        let mut child = leaf_frame("frame-0");
        child.frame_type = FrameType::Call;
        child.steps = vec![step(0, 0x01), step(1, 0x01)];
        root.children.push(ChildFrame { step_index: 0, frame: child });

        let trace = Trace {
            root,
            metadata: TraceMetadata {
                mode: ExecutionMode::Call,
                success: true,
                return_data: Bytes::default(),
                gas_used: 0,
                deployed_address: None,
                appended_stop: false,
                exec_bytecode: Bytes::default(),
            },
        };

        let mut session = DebugSession::new(&trace);
        assert!(session.can_step_over());
        session.step_over();
        assert_eq!(session.current_frame().id, "root");
        assert_eq!(session.current_step_index(), Some(1));
    }

    #[test]
    fn breakpoint_on_pc_is_hit_scanning_forward() {
        let trace = trace_with_five_steps();
        let mut session = DebugSession::new(&trace);
        session.add_breakpoint(BreakpointCondition { pc: Some(3), ..Default::default() });
        assert!(session.continue_forward());
        assert_eq!(session.global_step_index(), 3);
    }

    #[test]
    fn breakpoint_never_matches_frame_end_marker() {
        let trace = trace_with_five_steps();
        let mut session = DebugSession::new(&trace);
        session.add_breakpoint(BreakpointCondition {
            global_step_index: Some(5),
            ..Default::default()
        });
        assert!(!session.continue_forward());
        assert_eq!(session.global_step_index(), 5);
    }
}
