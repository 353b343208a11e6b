//! Assembler/codegen
//!
//! Assembly runs in two passes over the classified statements. The first pass binds labels, emits directive data and
//! assigns every statement its address. The second pass encodes instructions with all labels known and places every
//! statement's bytes into a pre-sized memory image.

use std::sync::Arc;

use log::debug;
use miette::SourceSpan;

use crate::instruction::Instruction;
use crate::parser::parse_program;
use crate::{AssemblyCode, AssemblyError, SymbolTable};

mod directive;
mod encode;
pub mod memory;
mod resolve;

use self::memory::MemoryImage;

/// Size of the 16-bit address space. A program may fill it completely, but not exceed it.
pub const ADDRESS_SPACE: usize = 0x10000;

/// Result of a successful assembly run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledProgram {
	/// The program image, starting at address 0.
	pub image:         Vec<u8>,
	/// All labels with their resolved addresses.
	pub symbols:       SymbolTable,
	/// The size the first pass computed for the image.
	pub expected_size: usize,
}

/// A statement that occupies memory, with the address the first pass assigned to it.
#[derive(Clone, Debug)]
enum Placed<'a> {
	/// Directive data, already emitted in the first pass.
	Data { address: usize, bytes: Vec<u8>, span: SourceSpan },
	/// An instruction, encoded in the second pass.
	Instruction { address: usize, instruction: &'a Instruction },
}

/// State of one assembly run. Nothing outlives the run.
#[derive(Debug)]
struct AssemblerState {
	source:  Arc<AssemblyCode>,
	symbols: SymbolTable,
	/// The address counter.
	address: usize,
}

/// Assembles the source code into a program image.
///
/// # Errors
/// Any syntax or semantic error in the source code, as well as internal errors if the image does not come out as
/// expected.
pub fn assemble(source: &Arc<AssemblyCode>) -> Result<AssembledProgram, Box<AssemblyError>> {
	let statements = parse_program(source)?;
	debug!("classified {} lines of {}", statements.len(), source.file_name());

	let mut state = AssemblerState::new(source.clone());
	let placed = state.resolve_labels(&statements)?;
	let expected_size = state.address;
	debug!("first pass done: {} labels, {expected_size} bytes expected", state.symbols.len());

	let image = state.encode(&placed, expected_size)?;
	debug!("second pass done: {} bytes", image.len());
	Ok(AssembledProgram { image, symbols: state.symbols, expected_size })
}

impl AssemblerState {
	fn new(source: Arc<AssemblyCode>) -> Self {
		Self { source, symbols: SymbolTable::new(), address: 0 }
	}

	/// Second pass: encode all instructions and place every statement's bytes at its address.
	fn encode(&self, placed: &[Placed], expected_size: usize) -> Result<Vec<u8>, Box<AssemblyError>> {
		let mut image = MemoryImage::new(expected_size);
		for element in placed {
			match element {
				Placed::Data { address, bytes, span } => self.place(&mut image, *address, bytes, *span)?,
				Placed::Instruction { address, instruction } => {
					let bytes = self.assemble_instruction(instruction)?;
					self.place(&mut image, *address, &bytes, instruction.span)?;
				},
			}
		}
		image.finish().map_err(|written| {
			AssemblyError::AssemblyInvariantViolation {
				expected: expected_size,
				actual:   written,
				src:      self.source.clone(),
				location: (0, self.source.text.as_str().len()).into(),
			}
			.into()
		})
	}

	fn place(
		&self,
		image: &mut MemoryImage,
		address: usize,
		bytes: &[u8],
		span: SourceSpan,
	) -> Result<(), Box<AssemblyError>> {
		image.write(address, bytes).map_err(|actual| {
			AssemblyError::AssemblyInvariantViolation {
				expected: image.len(),
				actual,
				src: self.source.clone(),
				location: span,
			}
			.into()
		})
	}

	/// Appends a single byte, which must be in the range 0 to 255.
	fn emit_byte(&self, bytes: &mut Vec<u8>, value: i64, span: SourceSpan) -> Result<(), Box<AssemblyError>> {
		let byte = u8::try_from(value)
			.map_err(|_| AssemblyError::ByteRange { value, src: self.source.clone(), location: span })?;
		bytes.push(byte);
		Ok(())
	}

	/// Appends a 16-bit word, high byte first. Each half goes through [`Self::emit_byte`], so values outside of 0 to
	/// 65535 are rejected.
	fn emit_word(&self, bytes: &mut Vec<u8>, value: i64, span: SourceSpan) -> Result<(), Box<AssemblyError>> {
		self.emit_byte(bytes, value >> 8, span)?;
		self.emit_byte(bytes, value & 0xFF, span)
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use flexstr::ToSharedStr;
	use miette::SourceSpan;

	use super::{ADDRESS_SPACE, assemble};
	use crate::instruction::Mnemonic;
	use crate::{AssemblyCode, AssemblyError};

	fn run(lines: &[&str]) -> Result<super::AssembledProgram, Box<AssemblyError>> {
		assemble(&Arc::new(AssemblyCode::from_lines(lines, "<test>")))
	}

	fn image(lines: &[&str]) -> Vec<u8> {
		run(lines).unwrap().image
	}

	fn error(lines: &[&str]) -> AssemblyError {
		*run(lines).unwrap_err()
	}

	#[test]
	fn forward_reference() {
		let program = run(&["JMP TARGET", "NOP", "TARGET:", "HLT"]).unwrap();
		assert_eq!(program.image, [0xB0, 0x00, 0x04, 0x00, 0x01]);
		assert_eq!(program.symbols.resolve(&"TARGET".to_shared_str()), Some(4));
	}

	#[test]
	fn asciz() {
		assert_eq!(image(&[".ASCIZ GREET \"HI\""]), [0x48, 0x49, 0x00]);
		assert_eq!(image(&[".ASCIZ EMPTY \"\""]), [0x00]);
		assert!(matches!(error(&[".ASCIZ S \"a; b\""]), AssemblyError::MalformedStringLiteral { .. }));
		assert_eq!(image(&[".ASCIZ S \"a\rb\""]), [0x61, 0x0D, 0x62, 0x00]);
	}

	#[test]
	fn data_before_code() {
		let program = run(&[".BYTE X 0x10", "INC R0"]).unwrap();
		assert_eq!(program.image, [0x10, 0x18, 0x00]);
		assert_eq!(program.expected_size, 3);
		assert_eq!(program.symbols.resolve(&"X".to_shared_str()), Some(0));
	}

	#[test]
	fn interleaved_code_and_data_keep_source_order() {
		assert_eq!(image(&["NOP", ".BYTE A 7", "HLT", ".WORD B 0x1234", "JMP B"]), [
			0x00, 0x07, 0x01, 0x12, 0x34, 0xB0, 0x00, 0x03
		]);
	}

	#[test]
	fn directive_sizes() {
		assert_eq!(image(&[".BYTE A 255"]), [0xFF]);
		assert_eq!(image(&[".WORD A 0xBEEF"]), [0xBE, 0xEF]);
		assert_eq!(image(&[".DATA A 1 2, 3,4"]), [1, 2, 3, 4]);
		assert_eq!(image(&[".DATA A"]), [0u8; 0]);
		assert_eq!(image(&[".RAW 0 0b11 0o7"]), [0, 3, 7]);
		let program = run(&[".DATA A 1 2", "B:", ".RAW 3", "C:"]).unwrap();
		assert_eq!(program.symbols.resolve(&"B".to_shared_str()), Some(2));
		assert_eq!(program.symbols.resolve(&"C".to_shared_str()), Some(3));
	}

	#[test]
	fn every_mnemonic_encodes_to_its_length() {
		for mnemonic in Mnemonic::ALL {
			let line = format!("{mnemonic} {}", example_operands(mnemonic));
			let program = run(&[line.as_str(), "L:"]).unwrap();
			assert_eq!(program.image.len(), mnemonic.encoded_length(), "{line}");
			assert_eq!(program.expected_size, mnemonic.encoded_length(), "{line}");
		}
	}

	fn example_operands(mnemonic: Mnemonic) -> &'static str {
		use crate::instruction::OperandKind;
		match mnemonic.descriptor().operand_kind {
			OperandKind::None => "",
			OperandKind::Immediate => "3",
			OperandKind::RegisterPair => "R1,R2",
			OperandKind::UnaryRegister | OperandKind::PackedRegister => "RA",
			OperandKind::ImmediateRegister => "0x2A,R3",
			OperandKind::Absolute => "L",
			OperandKind::RegisterPairAbsolute => "R1,R2,L",
			OperandKind::LoadIndirect | OperandKind::StoreIndirect => "R1,R2,R3",
			OperandKind::LoadAbsolute => "L,R4",
			OperandKind::StoreAbsolute => "R4,L",
			OperandKind::LoadIndexed => "R1,R2,L,R3",
			OperandKind::StoreIndexed => "R1,R2,R3,L",
		}
	}

	#[test]
	fn assembling_twice_is_identical() {
		let lines = ["start:", "LDC 1,R0", "loop:", "DEC R0", "JMZ done", "JMP loop", "done:", ".ASCIZ MSG \"ok\"", "HLT"];
		assert_eq!(run(&lines).unwrap(), run(&lines).unwrap());
	}

	#[test]
	fn label_redefinition_keeps_the_last_definition() {
		let program = run(&["A:", "NOP", "A:", "JMP A"]).unwrap();
		assert_eq!(program.image, [0x00, 0xB0, 0x00, 0x01]);
		assert_eq!(program.symbols.resolve(&"A".to_shared_str()), Some(1));
		assert_eq!(program.symbols.len(), 1);
	}

	#[test]
	fn user_errors() {
		assert!(matches!(error(&["FOO BAR"]), AssemblyError::UndefinedMnemonic { .. }));
		assert!(matches!(error(&["PSH RG"]), AssemblyError::UnknownRegister { .. }));
		assert!(matches!(error(&["ADD R1,5"]), AssemblyError::UnknownRegister { .. }));
		assert!(matches!(error(&["INT R1"]), AssemblyError::ExpectedValue { .. }));
		assert!(matches!(error(&["JMP nowhere"]), AssemblyError::UnresolvedLabel { .. }));
		assert!(matches!(error(&["ADD R1"]), AssemblyError::MissingOperand { expected: 2, actual: 1, .. }));
		assert!(matches!(error(&["NOP R1"]), AssemblyError::TooManyOperands { expected: 0, actual: 1, .. }));
		assert!(matches!(error(&[".ASCIZ S HI"]), AssemblyError::MalformedStringLiteral { .. }));
	}

	#[test]
	fn byte_range() {
		for lines in [
			&[".BYTE A 256"][..],
			&[".BYTE A -1"],
			&[".WORD A 0x10000"],
			&[".WORD A -1"],
			&[".RAW 1 2 300"],
			&["INT 0x100"],
			&["LDC -5,R0"],
			&["JMP 70000"],
		] {
			assert!(matches!(error(lines), AssemblyError::ByteRange { .. }), "{lines:?}");
		}
		assert_eq!(image(&["JMP 0xFFFF"]), [0xB0, 0xFF, 0xFF]);
		assert_eq!(image(&[".ASCIZ S \"\u{e9}\""]), [0xE9, 0x00]);
		assert!(matches!(error(&[".ASCIZ S \"\u{263A}\""]), AssemblyError::ByteRange { value: 0x263A, .. }));
	}

	#[test]
	fn errors_abort_without_output() {
		assert!(run(&["NOP", "HLT", "FOO"]).is_err());
		let error = error(&["NOP", "JMP missing"]);
		assert!(!error.is_internal());
		assert_eq!(error.location(), SourceSpan::from((8, 7)));
	}

	#[test]
	fn address_space_may_be_filled_completely() {
		let filler = format!(".RAW {}", vec!["0"; ADDRESS_SPACE - 1].join(" "));
		let program = run(&[filler.as_str(), "last:", "HLT"]).unwrap();
		assert_eq!(program.image.len(), ADDRESS_SPACE);
		assert_eq!(program.symbols.resolve(&"last".to_shared_str()), Some(0xFFFF));
	}

	#[test]
	fn address_overflow() {
		let filler = format!(".RAW {}", vec!["0"; ADDRESS_SPACE - 1].join(" "));
		assert!(matches!(error(&[filler.as_str(), "JMP 0"]), AssemblyError::AddressOverflow { address: 0x10001, .. }));
		let filler = format!(".RAW {}", vec!["0"; ADDRESS_SPACE].join(" "));
		assert!(matches!(error(&[filler.as_str(), "end:"]), AssemblyError::AddressOverflow { address: 0x10000, .. }));
		assert!(matches!(error(&[filler.as_str(), "NOP"]), AssemblyError::AddressOverflow { address: 0x10000, .. }));
	}
}
