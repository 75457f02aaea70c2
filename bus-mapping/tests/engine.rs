//! End-to-end tests driving `Engine::execute` through `revm`, covering the
//! literal scenarios from the execution-trace design.

use bus_mapping::exec_trace::engine::{Engine, ExecutionParams};
use bus_mapping::exec_trace::FrameExitReason;
use eth_types::{Bytes, Word};
use std::str::FromStr;

#[test]
fn push1_stop_produces_two_steps() {
    let bytecode = Bytes::from_str("0x604200").unwrap();
    let mut engine = Engine::new();
    let trace = engine.execute(ExecutionParams::call(bytecode)).unwrap();

    assert!(trace.metadata.success);
    assert_eq!(trace.root.steps.len(), 2);

    let push1 = &trace.root.steps[0];
    assert_eq!(push1.mnemonic, "PUSH1");
    assert_eq!(push1.pc, 0);
    assert!(push1.stack.is_empty());

    let stop = &trace.root.steps[1];
    assert_eq!(stop.mnemonic, "STOP");
    assert_eq!(stop.pc, 2);
    assert_eq!(stop.stack, vec![Word::from_str("0x42").unwrap()]);
}

#[test]
fn add_accumulates_operands_top_first() {
    // PUSH1 0x03 PUSH1 0x05 ADD POP STOP
    let bytecode = Bytes::from_str("0x600360050100").unwrap();
    let mut engine = Engine::new();
    let trace = engine.execute(ExecutionParams::call(bytecode)).unwrap();

    assert!(trace.metadata.success);
    let add_step = &trace.root.steps[2];
    assert_eq!(add_step.mnemonic, "ADD");
    assert_eq!(
        add_step.stack,
        vec![Word::from_str("0x5").unwrap(), Word::from_str("0x3").unwrap()]
    );

    let stop_step = trace.root.steps.last().unwrap();
    assert_eq!(stop_step.mnemonic, "STOP");
    assert_eq!(stop_step.stack, vec![Word::from_str("0x8").unwrap()]);
}

#[test]
fn revert_is_recorded_as_data_not_an_error() {
    // PUSH1 0x00 PUSH1 0x00 REVERT
    let bytecode = Bytes::from_str("0x60006000fd").unwrap();
    let mut engine = Engine::new();
    let trace = engine.execute(ExecutionParams::call(bytecode)).unwrap();

    assert!(!trace.metadata.success);
    assert_eq!(trace.root.result.exit_reason, FrameExitReason::Revert);
}

#[test]
fn sstore_records_storage_change_and_snapshot() {
    // PUSH1 0x42 PUSH1 0x01 SSTORE STOP, run in deploy mode as initcode so
    // the storage write lands against a fresh account.
    let bytecode = Bytes::from_str("0x6042600155").unwrap();
    let mut engine = Engine::new();
    let trace = engine.execute(ExecutionParams::deploy(bytecode)).unwrap();

    let sstore_step = trace
        .root
        .steps
        .iter()
        .find(|s| s.mnemonic == "SSTORE")
        .expect("bytecode contains an SSTORE");
    assert_eq!(sstore_step.storage_changes.len(), 1);
    let change = &sstore_step.storage_changes[0];
    assert_eq!(change.slot, Word::from_str("0x1").unwrap());
    assert_eq!(change.before, Word::zero());
    assert_eq!(change.after, Word::from_str("0x42").unwrap());
    assert!(sstore_step.storage.is_none());
}

#[test]
fn engine_reuses_world_state_across_calls_until_reset() {
    let mut engine = Engine::new();
    let bytecode = Bytes::from_str("0x604200").unwrap();
    engine.execute(ExecutionParams::call(bytecode.clone())).unwrap();
    // A second call against a fresh default callee must still succeed: the
    // engine must not leave the interpreter in a broken state.
    let trace = engine.execute(ExecutionParams::call(bytecode)).unwrap();
    assert!(trace.metadata.success);

    engine.reset_state();
    let trace = engine.execute(ExecutionParams::call(Bytes::from_str("0x00").unwrap())).unwrap();
    assert!(trace.metadata.success);
}
