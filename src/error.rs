//! Assembler errors.
#![allow(clippy::module_name_repetitions)]

use std::num::ParseIntError;
use std::sync::Arc;

use flexstr::SharedStr;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::AssemblyCode;
use crate::instruction::Mnemonic;

/// All types of errors that the assembler can report to the user. Every error aborts the assembly run.
#[derive(Error, Debug, Diagnostic)]
#[allow(missing_docs)]
pub enum AssemblyError {
	//#region Input errors: detected before assembly starts
	#[error("File \"{file_name}\" was not found")]
	#[diagnostic(code(titanasm::file_not_found), severity(Error))]
	FileNotFound {
		#[source]
		os_error:  Arc<std::io::Error>,
		file_name: SharedStr,
		#[source_code]
		src:       Arc<AssemblyCode>,
		#[label("File was requested here")]
		location:  SourceSpan,
	},
	//#endregion

	//#region Syntax errors: detected while classifying lines
	#[error("Undefined instruction `{mnemonic}`")]
	#[diagnostic(
		code(titanasm::undefined_mnemonic),
		severity(Error),
		help("Instructions and directives are written in upper case, like `NOP` or `.BYTE`")
	)]
	UndefinedMnemonic {
		mnemonic: SharedStr,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Not a known instruction or directive")]
		location: SourceSpan,
	},

	#[error("Invalid number: {error}")]
	#[diagnostic(code(titanasm::syntax::invalid_number), severity(Error))]
	InvalidNumber {
		error:    ParseIntError,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("{error}")]
		location: SourceSpan,
	},

	#[error("Malformed operand")]
	#[diagnostic(
		code(titanasm::syntax::malformed_operand),
		severity(Error),
		help("Operands are separated by single commas, like `ADD R1,R2`")
	)]
	MalformedOperand {
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("This operand is empty or contains white space")]
		location: SourceSpan,
	},

	#[error("\"{name}\" is not a valid label name")]
	#[diagnostic(
		code(titanasm::syntax::invalid_label_name),
		severity(Error),
		help(
			"Label names start with a letter or `_`, continue with letters, digits or `_`, and must not be a \
			 register name"
		)
	)]
	InvalidLabelName {
		name:     SharedStr,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Invalid label")]
		location: SourceSpan,
	},

	#[error("String literal {text} is not enclosed in \"\" quotes")]
	#[diagnostic(code(titanasm::syntax::malformed_string_literal), severity(Error))]
	MalformedStringLiteral {
		text:     SharedStr,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Expected a string literal like \"text\"")]
		location: SourceSpan,
	},
	//#endregion

	//#region Semantic errors: detected while assembling
	#[error("Invalid register `{register}`")]
	#[diagnostic(code(titanasm::unknown_register), severity(Error), help("Use one of the registers R0-R9 and RA-RF"))]
	UnknownRegister {
		register: SharedStr,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Expected a register")]
		location: SourceSpan,
	},

	#[error("Expected a value, but found `{token}`")]
	#[diagnostic(code(titanasm::expected_value), severity(Error))]
	ExpectedValue {
		token:    SharedStr,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Expected a number here")]
		location: SourceSpan,
	},

	#[error("The value {value} does not fit into a byte")]
	#[diagnostic(code(titanasm::byte_range), severity(Error), help("Byte values must be between 0 and 255"))]
	ByteRange {
		value:    i64,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Value out of range")]
		location: SourceSpan,
	},

	#[error("Label '{label}' can not be resolved to a value")]
	#[diagnostic(
		code(titanasm::unresolved_label),
		severity(Error),
		help("Any symbolic label must be defined somewhere. Did you misspell the label's name?")
	)]
	UnresolvedLabel {
		label:    SharedStr,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Used here")]
		location: SourceSpan,
	},

	#[error("`{mnemonic}` takes {expected} operand(s), but only {actual} were given")]
	#[diagnostic(code(titanasm::missing_operand), severity(Error))]
	MissingOperand {
		mnemonic: SharedStr,
		expected: usize,
		actual:   usize,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Missing operand(s)")]
		location: SourceSpan,
	},

	#[error("`{mnemonic}` takes {expected} operand(s), but {actual} were given")]
	#[diagnostic(code(titanasm::too_many_operands), severity(Error), help("Remove the extra operands"))]
	TooManyOperands {
		mnemonic: SharedStr,
		expected: usize,
		actual:   usize,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("Too many operands")]
		location: SourceSpan,
	},

	#[error("Address {address:#06x} is outside of the 16-bit address space")]
	#[diagnostic(
		code(titanasm::address_overflow),
		severity(Error),
		help("The assembled program must fit into 65536 bytes")
	)]
	AddressOverflow {
		address:  usize,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("This does not fit")]
		location: SourceSpan,
	},
	//#endregion

	//#region Internal errors: assembler defects, never caused by user input
	#[error("Internal assembler error: expected {expected} bytes of output, but {actual} were produced")]
	#[diagnostic(
		code(titanasm::internal::invariant_violation),
		severity(Error),
		help("This is a bug in titanasm, please report it together with the input file")
	)]
	AssemblyInvariantViolation {
		expected: usize,
		actual:   usize,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("While assembling this")]
		location: SourceSpan,
	},

	#[error("Internal assembler error: `{mnemonic}` encoded to {actual} bytes instead of {expected}")]
	#[diagnostic(
		code(titanasm::internal::encoded_length_mismatch),
		severity(Error),
		help("This is a bug in titanasm, please report it together with the input file")
	)]
	EncodedLengthMismatch {
		mnemonic: Mnemonic,
		expected: usize,
		actual:   usize,
		#[source_code]
		src:      Arc<AssemblyCode>,
		#[label("For this instruction")]
		location: SourceSpan,
	},
	//#endregion
}

impl AssemblyError {
	/// Whether this error is caused by an assembler defect instead of invalid input.
	#[must_use]
	pub const fn is_internal(&self) -> bool {
		matches!(self, Self::AssemblyInvariantViolation { .. } | Self::EncodedLengthMismatch { .. })
	}

	/// The source location this error points at.
	#[must_use]
	pub const fn location(&self) -> SourceSpan {
		match self {
			Self::FileNotFound { location, .. }
			| Self::UndefinedMnemonic { location, .. }
			| Self::InvalidNumber { location, .. }
			| Self::MalformedOperand { location, .. }
			| Self::InvalidLabelName { location, .. }
			| Self::MalformedStringLiteral { location, .. }
			| Self::UnknownRegister { location, .. }
			| Self::ExpectedValue { location, .. }
			| Self::ByteRange { location, .. }
			| Self::UnresolvedLabel { location, .. }
			| Self::MissingOperand { location, .. }
			| Self::TooManyOperands { location, .. }
			| Self::AddressOverflow { location, .. }
			| Self::AssemblyInvariantViolation { location, .. }
			| Self::EncodedLengthMismatch { location, .. } => *location,
		}
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use flexstr::ToSharedStr;
	use miette::Diagnostic;

	use super::AssemblyError;
	use crate::AssemblyCode;
	use crate::instruction::Mnemonic;

	fn code_of(error: &AssemblyError) -> String {
		error.code().map(|code| code.to_string()).unwrap_or_default()
	}

	#[test]
	fn internal_errors() {
		let src = Arc::new(AssemblyCode::new("JMP 0", "<test>"));
		let internal = [
			AssemblyError::AssemblyInvariantViolation {
				expected: 3,
				actual:   2,
				src:      src.clone(),
				location: (0, 5).into(),
			},
			AssemblyError::EncodedLengthMismatch {
				mnemonic: Mnemonic::Jmp,
				expected: 3,
				actual:   4,
				src:      src.clone(),
				location: (0, 5).into(),
			},
		];
		for error in &internal {
			assert!(error.is_internal(), "{error}");
			assert!(code_of(error).starts_with("titanasm::internal::"), "{error}");
			assert!(error.help().is_some());
		}
		assert_eq!(code_of(&internal[0]), "titanasm::internal::invariant_violation");
		assert_eq!(code_of(&internal[1]), "titanasm::internal::encoded_length_mismatch");

		let user_error = AssemblyError::UnresolvedLabel { label: "nowhere".to_shared_str(), src, location: (4, 1).into() };
		assert!(!user_error.is_internal());
		assert!(!code_of(&user_error).contains("internal"));
	}
}
