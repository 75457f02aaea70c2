//! Assembler and disassembler for EVM mnemonic source.
//!
//! `assemble` turns one-instruction-per-line mnemonic text into a hex
//! bytecode string; `disassemble` reverses the mapping. Both are pure
//! functions over the static opcode table in [`crate::evm::opcodes`].

use crate::error::Error;
use crate::evm::opcodes::{lookup_by_code, lookup_by_mnemonic};
use ethers_core::types::U256;

/// Assemble mnemonic source into a `0x`-prefixed lowercase hex bytecode
/// string.
///
/// Comments (`// ...` to end of line, `/* ... */` across lines) are
/// stripped before tokenization. Empty input yields `"0x"`.
pub fn assemble(source: &str) -> Result<String, Error> {
    let stripped = strip_comments(source);
    let mut bytecode = Vec::new();

    for (offset, raw_line) in stripped.lines().enumerate() {
        let line_no = offset + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let mnemonic = tokens.next().expect("non-empty line has a first token").to_uppercase();
        let info =
            lookup_by_mnemonic(&mnemonic).ok_or(Error::UnknownMnemonic { line: line_no })?;
        bytecode.push(info.code);

        if info.immediate_bytes > 0 {
            let n = info.immediate_bytes as usize;
            let imm_token = tokens
                .next()
                .ok_or(Error::MissingImmediate { line: line_no, bytes: n })?;
            bytecode.extend(parse_immediate(imm_token, n, line_no)?);
        }
    }

    Ok(format!("0x{}", hex::encode(bytecode)))
}

/// Disassemble a hex bytecode string back into mnemonic source, one
/// instruction per line.
///
/// Undefined opcodes are rendered as `INVALID(0xNN)`. An opcode whose
/// immediate runs past the end of the input is rendered with the partial
/// operand and a `// truncated` suffix.
pub fn disassemble(bytecode: &str) -> Result<String, Error> {
    let stripped = bytecode.strip_prefix("0x").or_else(|| bytecode.strip_prefix("0X")).unwrap_or(bytecode);
    if stripped.len() % 2 != 0 {
        return Err(Error::OddLengthHex);
    }
    let bytes = hex::decode(stripped).map_err(|_| Error::NonHexChar)?;

    let mut lines = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let code = bytes[i];
        i += 1;
        let info = lookup_by_code(code);
        if info.mnemonic == "no info" {
            lines.push(format!("INVALID(0x{code:02x})"));
            continue;
        }
        if info.immediate_bytes == 0 {
            lines.push(info.mnemonic.to_string());
            continue;
        }
        let n = info.immediate_bytes as usize;
        let available = bytes.len() - i;
        let take = available.min(n);
        let operand = &bytes[i..i + take];
        i += take;
        if take < n {
            lines.push(format!("{} 0x{} // truncated", info.mnemonic, hex::encode(operand)));
        } else {
            lines.push(format!("{} 0x{}", info.mnemonic, hex::encode(operand)));
        }
    }

    Ok(lines.join("\n"))
}

/// Strip `// ...` and `/* ... */` comments, preserving every newline so
/// line numbers reported in errors still match the caller's source text.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            chars.next();
            for nc in chars.by_ref() {
                if nc == '\n' {
                    out.push('\n');
                    break;
                }
            }
        } else if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            loop {
                match chars.next() {
                    None => break,
                    Some('*') if chars.peek() == Some(&'/') => {
                        chars.next();
                        break;
                    }
                    Some('\n') => out.push('\n'),
                    Some(_) => {}
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse an immediate operand token (hex `0x...`/`0X...` or decimal) into
/// exactly `n` big-endian bytes, zero-padded on the left.
fn parse_immediate(token: &str, n: usize, line: usize) -> Result<Vec<u8>, Error> {
    let value = if let Some(hex_digits) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        U256::from_str_radix(hex_digits, 16).map_err(|_| Error::MissingImmediate { line, bytes: n })?
    } else if token.starts_with('-') {
        return Err(Error::NegativeImmediate { line });
    } else {
        U256::from_dec_str(token).map_err(|_| Error::MissingImmediate { line, bytes: n })?
    };

    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    let significant_bits = 256 - value.leading_zeros() as usize;
    let significant_bytes = (significant_bits + 7) / 8;
    if significant_bytes > n {
        return Err(Error::ImmediateTooLarge { line, bytes: n });
    }
    Ok(buf[32 - n..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_push1_stop() {
        assert_eq!(assemble("PUSH1 0x42\nSTOP").unwrap(), "0x604200");
    }

    #[test]
    fn assembles_decimal_immediate() {
        assert_eq!(assemble("PUSH1 66").unwrap(), "0x6042");
    }

    #[test]
    fn assembles_zero_padded_push2() {
        assert_eq!(assemble("PUSH2 0x01").unwrap(), "0x610001");
    }

    #[test]
    fn disassembles_push1() {
        assert_eq!(disassemble("0x6042").unwrap(), "PUSH1 0x42");
    }

    #[test]
    fn disassembles_truncated_push2() {
        let out = disassemble("0x61ff").unwrap();
        assert!(out.contains("PUSH2"));
        assert!(out.contains("truncated"));
    }

    #[test]
    fn disassembles_undefined_byte() {
        assert_eq!(disassemble("0x0c").unwrap(), "INVALID(0x0c)");
    }

    #[test]
    fn empty_source_assembles_to_0x() {
        assert_eq!(assemble("").unwrap(), "0x");
        assert_eq!(assemble("   \n  \n").unwrap(), "0x");
    }

    #[test]
    fn strips_line_and_block_comments() {
        let source = "// a header comment\nPUSH1 0x01 // inline\n/* skip\nthis */STOP";
        assert_eq!(assemble(source).unwrap(), "0x600100");
    }

    #[test]
    fn unknown_mnemonic_reports_line() {
        let err = assemble("PUSH1 0x01\nNOTANOPCODE").unwrap_err();
        assert_eq!(err, Error::UnknownMnemonic { line: 2 });
    }

    #[test]
    fn missing_immediate_reports_line_and_width() {
        let err = assemble("PUSH2").unwrap_err();
        assert_eq!(err, Error::MissingImmediate { line: 1, bytes: 2 });
    }

    #[test]
    fn immediate_too_large_is_rejected() {
        let err = assemble("PUSH1 0x100").unwrap_err();
        assert_eq!(err, Error::ImmediateTooLarge { line: 1, bytes: 1 });
    }

    #[test]
    fn negative_decimal_immediate_is_rejected() {
        let err = assemble("PUSH1 -1").unwrap_err();
        assert_eq!(err, Error::NegativeImmediate { line: 1 });
    }

    #[test]
    fn disassemble_rejects_odd_length() {
        assert_eq!(disassemble("0x0").unwrap_err(), Error::OddLengthHex);
    }

    #[test]
    fn disassemble_rejects_non_hex() {
        assert_eq!(disassemble("0xzz").unwrap_err(), Error::NonHexChar);
    }

    #[test]
    fn round_trips_canonical_source() {
        let source = "PUSH1 0x42\nPUSH1 0x05\nADD\nSTOP";
        let bytecode = assemble(source).unwrap();
        assert_eq!(disassemble(&bytecode).unwrap(), source);
    }
}
