//! Assembles the test programs and checks them against their expected-value comments.
//!
//! A line may carry a comment starting with `;=`, followed by the hexadecimal bytes the line must assemble to. Lines
//! without such a comment are not checked. Files in `tests/errors` name the diagnostic code they must fail with in a
//! `; error:` comment on their first line.

use std::cmp::min;
use std::sync::Arc;

use miette::Diagnostic;

use crate::output::pretty_hex;
use crate::parser::{Statement, parse_program};
use crate::{AssemblyCode, run_assembler};

#[test]
fn opcodes() {
	test_file("tests/opcodes.titan");
}

#[test]
fn forward_references() {
	test_file("tests/forward.titan");
}

#[test]
fn data() {
	test_file("tests/data.titan");
}

#[test]
fn interleaved() {
	test_file("tests/interleaved.titan");
}

#[test]
fn crlf_line_endings() {
	test_file("tests/crlf.titan");
}

#[test]
fn errors() {
	let error_sources = std::fs::read_dir("tests/errors").unwrap();
	for error_source in error_sources {
		let error_source = error_source.unwrap().path();
		let error_source = &*error_source.to_string_lossy();
		let result = AssemblyCode::from_file_or_assembly_error(error_source).and_then(|code| run_assembler(&code));
		println!("running {error_source}...\n{result:?}");
		let error = result.unwrap_err();
		assert!(!error.is_internal(), "{error_source} caused an internal error: {error}");
		let expected_code = expected_error_code(error_source);
		assert_eq!(
			error.code().map(|code| code.to_string()).as_deref(),
			Some(expected_code.as_str()),
			"{error_source} failed with the wrong error: {error}"
		);
	}
}

/// Reads the diagnostic code an error test file must fail with, given on its first line as `; error: <code>`.
fn expected_error_code(file: &str) -> String {
	let text = std::fs::read_to_string(file).unwrap();
	text.lines()
		.next()
		.and_then(|line| line.strip_prefix("; error:"))
		.unwrap_or_else(|| panic!("{file} does not name its expected error"))
		.trim()
		.to_owned()
}

fn test_file(file: &str) {
	let code = AssemblyCode::from_file_or_assembly_error(file).unwrap();
	let assembled = run_assembler(&code).unwrap().image;
	let expected_binary = assemble_expected_binary(&code);
	assert_eq!(expected_binary.len(), assembled.len(), "Expected and actual assembly differ in length");
	for (byte, (expected, actual)) in expected_binary.iter().zip(assembled.iter()).enumerate() {
		if let Some(expected) = expected {
			assert_eq!(
				expected,
				actual,
				"Expected and actual assembly differ at byte {:04X}:\n\texpected: {:02X}\n\tactual:   {:02X}\nhint: the \
				 bytes around it are:\n{}",
				byte,
				expected,
				actual,
				pretty_hex(&assembled[byte.saturating_sub(4) .. min(assembled.len(), byte + 5)])
			);
		}
	}
}

/// Assembles the contents of the expected value comments, which is what the file should assemble to.
fn assemble_expected_binary(code: &Arc<AssemblyCode>) -> Vec<Option<u8>> {
	let statements = parse_program(code).unwrap();
	code.lines()
		.zip(statements)
		.flat_map(|((_, line), statement)| {
			let size = match statement {
				Statement::Instruction(instruction) => instruction.assembled_size(),
				Statement::Directive(directive) => directive.assembled_size(),
				Statement::Blank | Statement::LabelOnly(_) => 0,
			};
			line.split_once(";=").map_or_else(
				|| vec![None; size],
				|(_, expected)| {
					let bytes: Vec<_> = expected
						.split_whitespace()
						.map(|byte| Some(u8::from_str_radix(byte, 16).unwrap()))
						.collect();
					assert_eq!(bytes.len(), size, "wrong number of expected bytes in `{line}`");
					bytes
				},
			)
		})
		.collect()
}
