//! Second pass: instruction encoding.

use log::trace;

use super::AssemblerState;
use crate::AssemblyError;
use crate::instruction::{Instruction, Opcode, OperandKind};
use crate::parser::{NumericLiteral, Operand};
use crate::register::Register;

/// Packs two registers into one byte, the first one in the high nibble.
const fn pack(high: Register, low: Register) -> u8 {
	(high.index() << 4) | low.index()
}

impl AssemblerState {
	/// Encodes a single instruction. All labels must be bound already.
	pub(super) fn assemble_instruction(&self, instruction: &Instruction) -> Result<Vec<u8>, Box<AssemblyError>> {
		let descriptor = instruction.mnemonic.descriptor();
		self.check_operand_count(instruction, descriptor.operand_kind.operand_count())?;

		let operands = instruction.operands.as_slice();
		let opcode = match descriptor.opcode {
			Opcode::Byte(opcode) => opcode,
			Opcode::Nibble(opcode) => opcode << 4,
		};
		let mut bytes = Vec::with_capacity(descriptor.encoded_length);
		match descriptor.operand_kind {
			OperandKind::None => bytes.push(opcode),
			OperandKind::Immediate => {
				let value = self.value(&operands[0])?;
				bytes.push(opcode);
				self.emit_byte(&mut bytes, value.value, value.span)?;
			},
			OperandKind::RegisterPair =>
				bytes.extend([opcode, pack(self.register(&operands[0])?, self.register(&operands[1])?)]),
			OperandKind::UnaryRegister => bytes.extend([opcode, self.register(&operands[0])?.index() << 4]),
			OperandKind::PackedRegister => bytes.push(opcode | self.register(&operands[0])?.index()),
			OperandKind::ImmediateRegister => {
				let value = self.value(&operands[0])?;
				bytes.push(opcode | self.register(&operands[1])?.index());
				self.emit_byte(&mut bytes, value.value, value.span)?;
			},
			OperandKind::Absolute => {
				let address = self.value(&operands[0])?;
				bytes.push(opcode);
				self.emit_word(&mut bytes, address.value, address.span)?;
			},
			OperandKind::RegisterPairAbsolute => {
				let pair = pack(self.register(&operands[0])?, self.register(&operands[1])?);
				let address = self.value(&operands[2])?;
				bytes.extend([opcode, pair]);
				self.emit_word(&mut bytes, address.value, address.span)?;
			},
			OperandKind::LoadAbsolute => {
				let address = self.value(&operands[0])?;
				bytes.extend([opcode, self.register(&operands[1])?.index()]);
				self.emit_word(&mut bytes, address.value, address.span)?;
			},
			OperandKind::LoadIndirect => {
				let pair = pack(self.register(&operands[0])?, self.register(&operands[1])?);
				bytes.extend([opcode, self.register(&operands[2])?.index(), pair]);
			},
			OperandKind::LoadIndexed => {
				let pair = pack(self.register(&operands[0])?, self.register(&operands[1])?);
				let address = self.value(&operands[2])?;
				bytes.extend([opcode, self.register(&operands[3])?.index(), pair]);
				self.emit_word(&mut bytes, address.value, address.span)?;
			},
			OperandKind::StoreAbsolute => {
				let source = self.register(&operands[0])?;
				let address = self.value(&operands[1])?;
				bytes.extend([opcode, source.index() << 4]);
				self.emit_word(&mut bytes, address.value, address.span)?;
			},
			OperandKind::StoreIndirect => {
				let source = self.register(&operands[0])?;
				let pair = pack(self.register(&operands[1])?, self.register(&operands[2])?);
				bytes.extend([opcode, source.index() << 4, pair]);
			},
			OperandKind::StoreIndexed => {
				let source = self.register(&operands[0])?;
				let pair = pack(self.register(&operands[1])?, self.register(&operands[2])?);
				let address = self.value(&operands[3])?;
				bytes.extend([opcode, source.index() << 4, pair]);
				self.emit_word(&mut bytes, address.value, address.span)?;
			},
		}

		if bytes.len() != descriptor.encoded_length {
			return Err(AssemblyError::EncodedLengthMismatch {
				mnemonic: instruction.mnemonic,
				expected: descriptor.encoded_length,
				actual:   bytes.len(),
				src:      self.source.clone(),
				location: instruction.span,
			}
			.into());
		}
		trace!("{instruction} => {bytes:02X?}");
		Ok(bytes)
	}

	fn check_operand_count(&self, instruction: &Instruction, expected: usize) -> Result<(), Box<AssemblyError>> {
		let actual = instruction.operands.len();
		if actual < expected {
			Err(AssemblyError::MissingOperand {
				mnemonic: instruction.mnemonic.to_string().into(),
				expected,
				actual,
				src: self.source.clone(),
				location: instruction.span,
			}
			.into())
		} else if actual > expected {
			Err(AssemblyError::TooManyOperands {
				mnemonic: instruction.mnemonic.to_string().into(),
				expected,
				actual,
				src: self.source.clone(),
				location: instruction.span,
			}
			.into())
		} else {
			Ok(())
		}
	}

	fn register(&self, operand: &Operand) -> Result<Register, Box<AssemblyError>> {
		match operand {
			Operand::Register(register, _) => Ok(*register),
			Operand::Literal(_) | Operand::Label(..) => Err(AssemblyError::UnknownRegister {
				register: operand.to_string().into(),
				src:      self.source.clone(),
				location: operand.span(),
			}
			.into()),
		}
	}

	/// Resolves a value operand, looking up labels in the symbol table.
	fn value(&self, operand: &Operand) -> Result<NumericLiteral, Box<AssemblyError>> {
		match operand {
			Operand::Literal(literal) => Ok(*literal),
			Operand::Label(name, span) => self
				.symbols
				.resolve(name)
				.map(|address| NumericLiteral { value: i64::from(address), span: *span })
				.ok_or_else(|| {
					AssemblyError::UnresolvedLabel { label: name.clone(), src: self.source.clone(), location: *span }
						.into()
				}),
			Operand::Register(register, span) => Err(AssemblyError::ExpectedValue {
				token:    register.to_string().into(),
				src:      self.source.clone(),
				location: *span,
			}
			.into()),
		}
	}
}
