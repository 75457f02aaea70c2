//! The static opcode table: one row per defined EVM opcode, carrying its
//! code, mnemonic, the named stack items it pops/pushes (top-of-stack
//! first) and its inline immediate width.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Opcode enum. One-to-one corresponding to a `u8` value.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct OpcodeId(pub u8);

// Core opcodes.
impl OpcodeId {
    /// `STOP`
    pub const STOP: OpcodeId = OpcodeId(0x00);
    /// `ADD`
    pub const ADD: OpcodeId = OpcodeId(0x01);
    /// `MUL`
    pub const MUL: OpcodeId = OpcodeId(0x02);
    /// `SUB`
    pub const SUB: OpcodeId = OpcodeId(0x03);
    /// `DIV`
    pub const DIV: OpcodeId = OpcodeId(0x04);
    /// `SDIV`
    pub const SDIV: OpcodeId = OpcodeId(0x05);
    /// `MOD`
    pub const MOD: OpcodeId = OpcodeId(0x06);
    /// `SMOD`
    pub const SMOD: OpcodeId = OpcodeId(0x07);
    /// `ADDMOD`
    pub const ADDMOD: OpcodeId = OpcodeId(0x08);
    /// `MULMOD`
    pub const MULMOD: OpcodeId = OpcodeId(0x09);
    /// `EXP`
    pub const EXP: OpcodeId = OpcodeId(0x0a);
    /// `SIGNEXTEND`
    pub const SIGNEXTEND: OpcodeId = OpcodeId(0x0b);

    /// `LT`
    pub const LT: OpcodeId = OpcodeId(0x10);
    /// `GT`
    pub const GT: OpcodeId = OpcodeId(0x11);
    /// `SLT`
    pub const SLT: OpcodeId = OpcodeId(0x12);
    /// `SGT`
    pub const SGT: OpcodeId = OpcodeId(0x13);
    /// `EQ`
    pub const EQ: OpcodeId = OpcodeId(0x14);
    /// `ISZERO`
    pub const ISZERO: OpcodeId = OpcodeId(0x15);
    /// `AND`
    pub const AND: OpcodeId = OpcodeId(0x16);
    /// `OR`
    pub const OR: OpcodeId = OpcodeId(0x17);
    /// `XOR`
    pub const XOR: OpcodeId = OpcodeId(0x18);
    /// `NOT`
    pub const NOT: OpcodeId = OpcodeId(0x19);
    /// `BYTE`
    pub const BYTE: OpcodeId = OpcodeId(0x1a);
    /// `SHL`
    pub const SHL: OpcodeId = OpcodeId(0x1b);
    /// `SHR`
    pub const SHR: OpcodeId = OpcodeId(0x1c);
    /// `SAR`
    pub const SAR: OpcodeId = OpcodeId(0x1d);

    /// `KECCAK256`
    pub const KECCAK256: OpcodeId = OpcodeId(0x20);

    /// `ADDRESS`
    pub const ADDRESS: OpcodeId = OpcodeId(0x30);
    /// `BALANCE`
    pub const BALANCE: OpcodeId = OpcodeId(0x31);
    /// `ORIGIN`
    pub const ORIGIN: OpcodeId = OpcodeId(0x32);
    /// `CALLER`
    pub const CALLER: OpcodeId = OpcodeId(0x33);
    /// `CALLVALUE`
    pub const CALLVALUE: OpcodeId = OpcodeId(0x34);
    /// `CALLDATALOAD`
    pub const CALLDATALOAD: OpcodeId = OpcodeId(0x35);
    /// `CALLDATASIZE`
    pub const CALLDATASIZE: OpcodeId = OpcodeId(0x36);
    /// `CALLDATACOPY`
    pub const CALLDATACOPY: OpcodeId = OpcodeId(0x37);
    /// `CODESIZE`
    pub const CODESIZE: OpcodeId = OpcodeId(0x38);
    /// `CODECOPY`
    pub const CODECOPY: OpcodeId = OpcodeId(0x39);
    /// `GASPRICE`
    pub const GASPRICE: OpcodeId = OpcodeId(0x3a);
    /// `EXTCODESIZE`
    pub const EXTCODESIZE: OpcodeId = OpcodeId(0x3b);
    /// `EXTCODECOPY`
    pub const EXTCODECOPY: OpcodeId = OpcodeId(0x3c);
    /// `RETURNDATASIZE`
    pub const RETURNDATASIZE: OpcodeId = OpcodeId(0x3d);
    /// `RETURNDATACOPY`
    pub const RETURNDATACOPY: OpcodeId = OpcodeId(0x3e);
    /// `EXTCODEHASH`
    pub const EXTCODEHASH: OpcodeId = OpcodeId(0x3f);

    /// `BLOCKHASH`
    pub const BLOCKHASH: OpcodeId = OpcodeId(0x40);
    /// `COINBASE`
    pub const COINBASE: OpcodeId = OpcodeId(0x41);
    /// `TIMESTAMP`
    pub const TIMESTAMP: OpcodeId = OpcodeId(0x42);
    /// `NUMBER`
    pub const NUMBER: OpcodeId = OpcodeId(0x43);
    /// `DIFFICULTY` (aka `PREVRANDAO` post-merge)
    pub const DIFFICULTY: OpcodeId = OpcodeId(0x44);
    /// `GASLIMIT`
    pub const GASLIMIT: OpcodeId = OpcodeId(0x45);
    /// `CHAINID`
    pub const CHAINID: OpcodeId = OpcodeId(0x46);
    /// `SELFBALANCE`
    pub const SELFBALANCE: OpcodeId = OpcodeId(0x47);
    /// `BASEFEE`
    pub const BASEFEE: OpcodeId = OpcodeId(0x48);

    /// `POP`
    pub const POP: OpcodeId = OpcodeId(0x50);
    /// `MLOAD`
    pub const MLOAD: OpcodeId = OpcodeId(0x51);
    /// `MSTORE`
    pub const MSTORE: OpcodeId = OpcodeId(0x52);
    /// `MSTORE8`
    pub const MSTORE8: OpcodeId = OpcodeId(0x53);
    /// `SLOAD`
    pub const SLOAD: OpcodeId = OpcodeId(0x54);
    /// `SSTORE`
    pub const SSTORE: OpcodeId = OpcodeId(0x55);
    /// `JUMP`
    pub const JUMP: OpcodeId = OpcodeId(0x56);
    /// `JUMPI`
    pub const JUMPI: OpcodeId = OpcodeId(0x57);
    /// `PC`
    pub const PC: OpcodeId = OpcodeId(0x58);
    /// `MSIZE`
    pub const MSIZE: OpcodeId = OpcodeId(0x59);
    /// `GAS`
    pub const GAS: OpcodeId = OpcodeId(0x5a);
    /// `JUMPDEST`
    pub const JUMPDEST: OpcodeId = OpcodeId(0x5b);
    /// `TLOAD`
    pub const TLOAD: OpcodeId = OpcodeId(0x5c);
    /// `TSTORE`
    pub const TSTORE: OpcodeId = OpcodeId(0x5d);
    /// `MCOPY`
    pub const MCOPY: OpcodeId = OpcodeId(0x5e);
    /// `PUSH0`
    pub const PUSH0: OpcodeId = OpcodeId(0x5f);

    /// `PUSHn`
    pub const PUSH1: OpcodeId = OpcodeId(0x60);
    /// `PUSH2`
    pub const PUSH2: OpcodeId = OpcodeId(0x61);
    /// `PUSH3`
    pub const PUSH3: OpcodeId = OpcodeId(0x62);
    /// `PUSH4`
    pub const PUSH4: OpcodeId = OpcodeId(0x63);
    /// `PUSH5`
    pub const PUSH5: OpcodeId = OpcodeId(0x64);
    /// `PUSH6`
    pub const PUSH6: OpcodeId = OpcodeId(0x65);
    /// `PUSH7`
    pub const PUSH7: OpcodeId = OpcodeId(0x66);
    /// `PUSH8`
    pub const PUSH8: OpcodeId = OpcodeId(0x67);
    /// `PUSH9`
    pub const PUSH9: OpcodeId = OpcodeId(0x68);
    /// `PUSH10`
    pub const PUSH10: OpcodeId = OpcodeId(0x69);
    /// `PUSH11`
    pub const PUSH11: OpcodeId = OpcodeId(0x6a);
    /// `PUSH12`
    pub const PUSH12: OpcodeId = OpcodeId(0x6b);
    /// `PUSH13`
    pub const PUSH13: OpcodeId = OpcodeId(0x6c);
    /// `PUSH14`
    pub const PUSH14: OpcodeId = OpcodeId(0x6d);
    /// `PUSH15`
    pub const PUSH15: OpcodeId = OpcodeId(0x6e);
    /// `PUSH16`
    pub const PUSH16: OpcodeId = OpcodeId(0x6f);
    /// `PUSH17`
    pub const PUSH17: OpcodeId = OpcodeId(0x70);
    /// `PUSH18`
    pub const PUSH18: OpcodeId = OpcodeId(0x71);
    /// `PUSH19`
    pub const PUSH19: OpcodeId = OpcodeId(0x72);
    /// `PUSH20`
    pub const PUSH20: OpcodeId = OpcodeId(0x73);
    /// `PUSH21`
    pub const PUSH21: OpcodeId = OpcodeId(0x74);
    /// `PUSH22`
    pub const PUSH22: OpcodeId = OpcodeId(0x75);
    /// `PUSH23`
    pub const PUSH23: OpcodeId = OpcodeId(0x76);
    /// `PUSH24`
    pub const PUSH24: OpcodeId = OpcodeId(0x77);
    /// `PUSH25`
    pub const PUSH25: OpcodeId = OpcodeId(0x78);
    /// `PUSH26`
    pub const PUSH26: OpcodeId = OpcodeId(0x79);
    /// `PUSH27`
    pub const PUSH27: OpcodeId = OpcodeId(0x7a);
    /// `PUSH28`
    pub const PUSH28: OpcodeId = OpcodeId(0x7b);
    /// `PUSH29`
    pub const PUSH29: OpcodeId = OpcodeId(0x7c);
    /// `PUSH30`
    pub const PUSH30: OpcodeId = OpcodeId(0x7d);
    /// `PUSH31`
    pub const PUSH31: OpcodeId = OpcodeId(0x7e);
    /// `PUSH32`
    pub const PUSH32: OpcodeId = OpcodeId(0x7f);

    /// `DUPn`
    pub const DUP1: OpcodeId = OpcodeId(0x80);
    /// `DUP2`
    pub const DUP2: OpcodeId = OpcodeId(0x81);
    /// `DUP3`
    pub const DUP3: OpcodeId = OpcodeId(0x82);
    /// `DUP4`
    pub const DUP4: OpcodeId = OpcodeId(0x83);
    /// `DUP5`
    pub const DUP5: OpcodeId = OpcodeId(0x84);
    /// `DUP6`
    pub const DUP6: OpcodeId = OpcodeId(0x85);
    /// `DUP7`
    pub const DUP7: OpcodeId = OpcodeId(0x86);
    /// `DUP8`
    pub const DUP8: OpcodeId = OpcodeId(0x87);
    /// `DUP9`
    pub const DUP9: OpcodeId = OpcodeId(0x88);
    /// `DUP10`
    pub const DUP10: OpcodeId = OpcodeId(0x89);
    /// `DUP11`
    pub const DUP11: OpcodeId = OpcodeId(0x8a);
    /// `DUP12`
    pub const DUP12: OpcodeId = OpcodeId(0x8b);
    /// `DUP13`
    pub const DUP13: OpcodeId = OpcodeId(0x8c);
    /// `DUP14`
    pub const DUP14: OpcodeId = OpcodeId(0x8d);
    /// `DUP15`
    pub const DUP15: OpcodeId = OpcodeId(0x8e);
    /// `DUP16`
    pub const DUP16: OpcodeId = OpcodeId(0x8f);

    /// `SWAPn`
    pub const SWAP1: OpcodeId = OpcodeId(0x90);
    /// `SWAP2`
    pub const SWAP2: OpcodeId = OpcodeId(0x91);
    /// `SWAP3`
    pub const SWAP3: OpcodeId = OpcodeId(0x92);
    /// `SWAP4`
    pub const SWAP4: OpcodeId = OpcodeId(0x93);
    /// `SWAP5`
    pub const SWAP5: OpcodeId = OpcodeId(0x94);
    /// `SWAP6`
    pub const SWAP6: OpcodeId = OpcodeId(0x95);
    /// `SWAP7`
    pub const SWAP7: OpcodeId = OpcodeId(0x96);
    /// `SWAP8`
    pub const SWAP8: OpcodeId = OpcodeId(0x97);
    /// `SWAP9`
    pub const SWAP9: OpcodeId = OpcodeId(0x98);
    /// `SWAP10`
    pub const SWAP10: OpcodeId = OpcodeId(0x99);
    /// `SWAP11`
    pub const SWAP11: OpcodeId = OpcodeId(0x9a);
    /// `SWAP12`
    pub const SWAP12: OpcodeId = OpcodeId(0x9b);
    /// `SWAP13`
    pub const SWAP13: OpcodeId = OpcodeId(0x9c);
    /// `SWAP14`
    pub const SWAP14: OpcodeId = OpcodeId(0x9d);
    /// `SWAP15`
    pub const SWAP15: OpcodeId = OpcodeId(0x9e);
    /// `SWAP16`
    pub const SWAP16: OpcodeId = OpcodeId(0x9f);

    /// `LOGn`
    pub const LOG0: OpcodeId = OpcodeId(0xa0);
    /// `LOG1`
    pub const LOG1: OpcodeId = OpcodeId(0xa1);
    /// `LOG2`
    pub const LOG2: OpcodeId = OpcodeId(0xa2);
    /// `LOG3`
    pub const LOG3: OpcodeId = OpcodeId(0xa3);
    /// `LOG4`
    pub const LOG4: OpcodeId = OpcodeId(0xa4);

    /// `CREATE`
    pub const CREATE: OpcodeId = OpcodeId(0xf0);
    /// `CALL`
    pub const CALL: OpcodeId = OpcodeId(0xf1);
    /// `CALLCODE`
    pub const CALLCODE: OpcodeId = OpcodeId(0xf2);
    /// `RETURN`
    pub const RETURN: OpcodeId = OpcodeId(0xf3);
    /// `DELEGATECALL`
    pub const DELEGATECALL: OpcodeId = OpcodeId(0xf4);
    /// `CREATE2`
    pub const CREATE2: OpcodeId = OpcodeId(0xf5);
    /// `STATICCALL`
    pub const STATICCALL: OpcodeId = OpcodeId(0xfa);
    /// `REVERT`
    pub const REVERT: OpcodeId = OpcodeId(0xfd);
    /// `INVALID`
    pub const INVALID: OpcodeId = OpcodeId(0xfe);
    /// `SELFDESTRUCT`
    pub const SELFDESTRUCT: OpcodeId = OpcodeId(0xff);
}

impl OpcodeId {
    /// Opcodes that open a new call/create frame; the only ones a
    /// `DebugSession` may step over.
    pub const FRAME_CREATING: [OpcodeId; 6] = [
        OpcodeId::CREATE,
        OpcodeId::CALL,
        OpcodeId::CALLCODE,
        OpcodeId::DELEGATECALL,
        OpcodeId::CREATE2,
        OpcodeId::STATICCALL,
    ];

    /// The raw opcode byte.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// The raw opcode byte as `usize`, for table indexing.
    #[inline]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }

    /// Whether this opcode opens a new call/create frame.
    pub fn is_frame_creating(&self) -> bool {
        Self::FRAME_CREATING.contains(self)
    }

    /// This opcode's row in the static table, or the `"no info"` sentinel
    /// if `self` is not a defined opcode.
    pub fn info(&self) -> OpcodeInfo {
        lookup_by_code(self.0)
    }
}

impl fmt::Debug for OpcodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info().mnemonic)
    }
}

impl fmt::Display for OpcodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info().mnemonic)
    }
}

impl FromStr for OpcodeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup_by_mnemonic(s).map(|info| OpcodeId(info.code)).ok_or(())
    }
}

/// One row of the static opcode table.
#[derive(Clone, Copy, Debug)]
pub struct OpcodeInfo {
    /// The opcode byte, `0..=255`.
    pub code: u8,
    /// Uppercase mnemonic.
    pub mnemonic: &'static str,
    /// Names of the stack items popped, top-of-stack first.
    pub input_names: &'static [&'static str],
    /// Names of the stack items pushed.
    pub output_names: &'static [&'static str],
    /// Bytes of inline immediate operand following the opcode.
    pub immediate_bytes: u8,
}

impl OpcodeInfo {
    /// Net stack height change this opcode causes: `outputs - inputs`.
    pub fn stack_delta(&self) -> i32 {
        self.output_names.len() as i32 - self.input_names.len() as i32
    }
}

/// Sentinel returned by [`lookup_by_code`] for an undefined opcode byte.
pub const NO_INFO: OpcodeInfo = OpcodeInfo {
    code: 0,
    mnemonic: "no info",
    input_names: &[],
    output_names: &[],
    immediate_bytes: 0,
};

macro_rules! op {
    ($code:expr, $mnemonic:expr, [$($in:expr),* $(,)?], [$($out:expr),* $(,)?], $imm:expr) => {
        OpcodeInfo {
            code: $code,
            mnemonic: $mnemonic,
            input_names: &[$($in),*],
            output_names: &[$($out),*],
            immediate_bytes: $imm,
        }
    };
}

macro_rules! push_ops {
    ($($n:literal => $code:expr),* $(,)?) => {
        [$(op!($code, concat!("PUSH", stringify!($n)), [], ["value"], $n)),*]
    };
}

macro_rules! dup_ops {
    ($($n:literal => $code:expr),* $(,)?) => {
        [$(op!($code, concat!("DUP", stringify!($n)), [], ["dup"], 0)),*]
    };
}

macro_rules! swap_ops {
    ($($n:literal => $code:expr),* $(,)?) => {
        [$(op!($code, concat!("SWAP", stringify!($n)), [], [], 0)),*]
    };
}

fn static_table() -> Vec<OpcodeInfo> {
    let mut v = vec![
        op!(0x00, "STOP", [], [], 0),
        op!(0x01, "ADD", ["a", "b"], ["sum"], 0),
        op!(0x02, "MUL", ["a", "b"], ["product"], 0),
        op!(0x03, "SUB", ["a", "b"], ["difference"], 0),
        op!(0x04, "DIV", ["a", "b"], ["quotient"], 0),
        op!(0x05, "SDIV", ["a", "b"], ["quotient"], 0),
        op!(0x06, "MOD", ["a", "b"], ["remainder"], 0),
        op!(0x07, "SMOD", ["a", "b"], ["remainder"], 0),
        op!(0x08, "ADDMOD", ["a", "b", "n"], ["result"], 0),
        op!(0x09, "MULMOD", ["a", "b", "n"], ["result"], 0),
        op!(0x0a, "EXP", ["a", "exponent"], ["result"], 0),
        op!(0x0b, "SIGNEXTEND", ["b", "x"], ["result"], 0),
        op!(0x10, "LT", ["a", "b"], ["result"], 0),
        op!(0x11, "GT", ["a", "b"], ["result"], 0),
        op!(0x12, "SLT", ["a", "b"], ["result"], 0),
        op!(0x13, "SGT", ["a", "b"], ["result"], 0),
        op!(0x14, "EQ", ["a", "b"], ["result"], 0),
        op!(0x15, "ISZERO", ["a"], ["result"], 0),
        op!(0x16, "AND", ["a", "b"], ["result"], 0),
        op!(0x17, "OR", ["a", "b"], ["result"], 0),
        op!(0x18, "XOR", ["a", "b"], ["result"], 0),
        op!(0x19, "NOT", ["a"], ["result"], 0),
        op!(0x1a, "BYTE", ["i", "x"], ["byte"], 0),
        op!(0x1b, "SHL", ["shift", "value"], ["result"], 0),
        op!(0x1c, "SHR", ["shift", "value"], ["result"], 0),
        op!(0x1d, "SAR", ["shift", "value"], ["result"], 0),
        op!(0x20, "KECCAK256", ["offset", "size"], ["hash"], 0),
        op!(0x30, "ADDRESS", [], ["address"], 0),
        op!(0x31, "BALANCE", ["address"], ["balance"], 0),
        op!(0x32, "ORIGIN", [], ["address"], 0),
        op!(0x33, "CALLER", [], ["address"], 0),
        op!(0x34, "CALLVALUE", [], ["value"], 0),
        op!(0x35, "CALLDATALOAD", ["offset"], ["data"], 0),
        op!(0x36, "CALLDATASIZE", [], ["size"], 0),
        op!(0x37, "CALLDATACOPY", ["destOffset", "offset", "size"], [], 0),
        op!(0x38, "CODESIZE", [], ["size"], 0),
        op!(0x39, "CODECOPY", ["destOffset", "offset", "size"], [], 0),
        op!(0x3a, "GASPRICE", [], ["price"], 0),
        op!(0x3b, "EXTCODESIZE", ["address"], ["size"], 0),
        op!(0x3c, "EXTCODECOPY", ["address", "destOffset", "offset", "size"], [], 0),
        op!(0x3d, "RETURNDATASIZE", [], ["size"], 0),
        op!(0x3e, "RETURNDATACOPY", ["destOffset", "offset", "size"], [], 0),
        op!(0x3f, "EXTCODEHASH", ["address"], ["hash"], 0),
        op!(0x40, "BLOCKHASH", ["blockNumber"], ["hash"], 0),
        op!(0x41, "COINBASE", [], ["address"], 0),
        op!(0x42, "TIMESTAMP", [], ["timestamp"], 0),
        op!(0x43, "NUMBER", [], ["blockNumber"], 0),
        op!(0x44, "DIFFICULTY", [], ["difficulty"], 0),
        op!(0x45, "GASLIMIT", [], ["gasLimit"], 0),
        op!(0x46, "CHAINID", [], ["chainId"], 0),
        op!(0x47, "SELFBALANCE", [], ["balance"], 0),
        op!(0x48, "BASEFEE", [], ["baseFee"], 0),
        op!(0x50, "POP", ["value"], [], 0),
        op!(0x51, "MLOAD", ["offset"], ["value"], 0),
        op!(0x52, "MSTORE", ["offset", "value"], [], 0),
        op!(0x53, "MSTORE8", ["offset", "value"], [], 0),
        op!(0x54, "SLOAD", ["key"], ["value"], 0),
        op!(0x55, "SSTORE", ["key", "value"], [], 0),
        op!(0x56, "JUMP", ["counter"], [], 0),
        op!(0x57, "JUMPI", ["counter", "b"], [], 0),
        op!(0x58, "PC", [], ["counter"], 0),
        op!(0x59, "MSIZE", [], ["size"], 0),
        op!(0x5a, "GAS", [], ["gas"], 0),
        op!(0x5b, "JUMPDEST", [], [], 0),
        op!(0x5c, "TLOAD", ["key"], ["value"], 0),
        op!(0x5d, "TSTORE", ["key", "value"], [], 0),
        op!(0x5e, "MCOPY", ["destOffset", "offset", "size"], [], 0),
        op!(0x5f, "PUSH0", [], ["value"], 0),
        op!(0xa0, "LOG0", ["offset", "size"], [], 0),
        op!(0xa1, "LOG1", ["offset", "size", "topic1"], [], 0),
        op!(0xa2, "LOG2", ["offset", "size", "topic1", "topic2"], [], 0),
        op!(0xa3, "LOG3", ["offset", "size", "topic1", "topic2", "topic3"], [], 0),
        op!(0xa4, "LOG4", ["offset", "size", "topic1", "topic2", "topic3", "topic4"], [], 0),
        op!(0xf0, "CREATE", ["value", "offset", "size"], ["address"], 0),
        op!(
            0xf1,
            "CALL",
            ["gas", "address", "value", "argsOffset", "argsSize", "retOffset", "retSize"],
            ["success"],
            0
        ),
        op!(
            0xf2,
            "CALLCODE",
            ["gas", "address", "value", "argsOffset", "argsSize", "retOffset", "retSize"],
            ["success"],
            0
        ),
        op!(0xf3, "RETURN", ["offset", "size"], [], 0),
        op!(
            0xf4,
            "DELEGATECALL",
            ["gas", "address", "argsOffset", "argsSize", "retOffset", "retSize"],
            ["success"],
            0
        ),
        op!(0xf5, "CREATE2", ["value", "offset", "size", "salt"], ["address"], 0),
        op!(
            0xfa,
            "STATICCALL",
            ["gas", "address", "argsOffset", "argsSize", "retOffset", "retSize"],
            ["success"],
            0
        ),
        op!(0xfd, "REVERT", ["offset", "size"], [], 0),
        op!(0xfe, "INVALID", [], [], 0),
        op!(0xff, "SELFDESTRUCT", ["address"], [], 0),
    ];
    v.extend(push_ops! {
        1 => 0x60, 2 => 0x61, 3 => 0x62, 4 => 0x63, 5 => 0x64, 6 => 0x65,
        7 => 0x66, 8 => 0x67, 9 => 0x68, 10 => 0x69, 11 => 0x6a, 12 => 0x6b,
        13 => 0x6c, 14 => 0x6d, 15 => 0x6e, 16 => 0x6f, 17 => 0x70, 18 => 0x71,
        19 => 0x72, 20 => 0x73, 21 => 0x74, 22 => 0x75, 23 => 0x76, 24 => 0x77,
        25 => 0x78, 26 => 0x79, 27 => 0x7a, 28 => 0x7b, 29 => 0x7c, 30 => 0x7d,
        31 => 0x7e, 32 => 0x7f,
    });
    v.extend(dup_ops! {
        1 => 0x80, 2 => 0x81, 3 => 0x82, 4 => 0x83, 5 => 0x84, 6 => 0x85,
        7 => 0x86, 8 => 0x87, 9 => 0x88, 10 => 0x89, 11 => 0x8a, 12 => 0x8b,
        13 => 0x8c, 14 => 0x8d, 15 => 0x8e, 16 => 0x8f,
    });
    v.extend(swap_ops! {
        1 => 0x90, 2 => 0x91, 3 => 0x92, 4 => 0x93, 5 => 0x94, 6 => 0x95,
        7 => 0x96, 8 => 0x97, 9 => 0x98, 10 => 0x99, 11 => 0x9a, 12 => 0x9b,
        13 => 0x9c, 14 => 0x9d, 15 => 0x9e, 16 => 0x9f,
    });
    v
}

lazy_static! {
    static ref BY_CODE: HashMap<u8, OpcodeInfo> =
        static_table().into_iter().map(|op| (op.code, op)).collect();
    static ref BY_MNEMONIC: HashMap<&'static str, OpcodeInfo> =
        static_table().into_iter().map(|op| (op.mnemonic, op)).collect();
}

/// Look up an opcode's table row by its byte. Returns [`NO_INFO`] for any
/// byte that is not a defined opcode.
pub fn lookup_by_code(code: u8) -> OpcodeInfo {
    BY_CODE.get(&code).copied().unwrap_or(NO_INFO)
}

/// Look up an opcode's table row by its (case-sensitive, uppercase)
/// mnemonic.
pub fn lookup_by_mnemonic(mnemonic: &str) -> Option<OpcodeInfo> {
    BY_MNEMONIC.get(mnemonic).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_immediate_widths() {
        assert_eq!(lookup_by_code(0x60).immediate_bytes, 1);
        assert_eq!(lookup_by_code(0x7f).immediate_bytes, 32);
        assert_eq!(lookup_by_code(0x5f).immediate_bytes, 0);
    }

    #[test]
    fn undefined_byte_is_sentinel() {
        assert_eq!(lookup_by_code(0x0c).mnemonic, "no info");
        assert_eq!(lookup_by_code(0x21).mnemonic, "no info");
    }

    #[test]
    fn mnemonic_lookup_is_case_sensitive_on_the_stored_key() {
        assert!(lookup_by_mnemonic("ADD").is_some());
        assert!(lookup_by_mnemonic("add").is_none());
    }

    #[test]
    fn frame_creating_set_matches_spec() {
        for op in OpcodeId::FRAME_CREATING {
            assert!(op.is_frame_creating());
        }
        assert!(!OpcodeId::ADD.is_frame_creating());
    }

    #[test]
    fn dup_and_swap_stack_delta() {
        assert_eq!(lookup_by_code(0x80).stack_delta(), 1); // DUP1
        assert_eq!(lookup_by_code(0x90).stack_delta(), 0); // SWAP1
    }
}
