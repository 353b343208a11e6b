//! The Titan instruction set: mnemonics, opcodes, operand kinds and encoded lengths.

use std::fmt::{Display, Formatter};

use miette::SourceSpan;
use titanasm_derive::{Parse, VariantName};

use crate::VariantName;
use crate::parser::Operand;

/// Instruction mnemonics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Parse, VariantName)]
pub enum Mnemonic {
	// CPU control
	/// No operation.
	Nop,
	/// Halt the processor.
	Hlt,
	// Interrupts
	/// Software interrupt.
	Int,
	/// Return from exception.
	Rte,
	// Arithmetic
	/// Add.
	Add,
	/// Add with carry.
	Adc,
	/// Subtract.
	Sub,
	/// Bitwise and.
	And,
	/// Bitwise inclusive or.
	Ior,
	/// Bitwise exclusive or.
	Xor,
	/// Bitwise not.
	Not,
	/// Shift right.
	Shr,
	/// Increment.
	Inc,
	/// Decrement.
	Dec,
	// Data stack
	/// Push onto the data stack.
	Psh,
	/// Pop from the data stack.
	Pop,
	/// Peek at the data stack.
	Pek,
	// Return stack
	/// Push onto the return stack.
	Psr,
	/// Pop from the return stack.
	Ppr,
	/// Peek at the return stack.
	Pkr,
	// Register operations
	/// Clear register.
	Clr,
	/// Move register.
	Mov,
	/// Load constant.
	Ldc,
	// Jumps
	/// Jump.
	Jmp,
	/// Jump if negative.
	Jmi,
	/// Jump to register pair.
	Jmr,
	/// Jump to register pair, absolute.
	Jra,
	/// Jump to register pair plus offset.
	Jmo,
	/// Jump if zero.
	Jmz,
	/// Jump if sign.
	Jms,
	/// Jump if carry.
	Jmc,
	/// Jump to subroutine.
	Jsr,
	/// Return from subroutine.
	Rsb,
	// Loads
	/// Load from memory.
	Ldm,
	/// Load from register pair address.
	Ldr,
	/// Load from register pair address, absolute.
	Lra,
	/// Load from register pair address plus offset.
	Lmo,
	// Stores
	/// Store to memory.
	Stm,
	/// Store to register pair address.
	Str,
	/// Store to register pair address, absolute.
	Sra,
	/// Store to register pair address plus offset.
	Smo,
}

impl Mnemonic {
	/// Every mnemonic of the instruction set, in opcode order.
	pub const ALL: [Self; 41] = [
		Self::Nop,
		Self::Hlt,
		Self::Int,
		Self::Rte,
		Self::Add,
		Self::Adc,
		Self::Sub,
		Self::And,
		Self::Ior,
		Self::Xor,
		Self::Not,
		Self::Shr,
		Self::Inc,
		Self::Dec,
		Self::Psh,
		Self::Pop,
		Self::Pek,
		Self::Psr,
		Self::Ppr,
		Self::Pkr,
		Self::Clr,
		Self::Mov,
		Self::Ldc,
		Self::Jmp,
		Self::Jmi,
		Self::Jmr,
		Self::Jra,
		Self::Jmo,
		Self::Jmz,
		Self::Jms,
		Self::Jmc,
		Self::Jsr,
		Self::Rsb,
		Self::Ldm,
		Self::Ldr,
		Self::Lra,
		Self::Lmo,
		Self::Stm,
		Self::Str,
		Self::Sra,
		Self::Smo,
	];

	/// Returns the instruction set table entry for this mnemonic.
	#[must_use]
	#[allow(clippy::too_many_lines)]
	pub const fn descriptor(self) -> MnemonicDescriptor {
		use Opcode::{Byte, Nibble};
		use OperandKind::{
			Absolute, Immediate, ImmediateRegister, LoadAbsolute, LoadIndexed, LoadIndirect, None, PackedRegister,
			RegisterPair, RegisterPairAbsolute, StoreAbsolute, StoreIndexed, StoreIndirect, UnaryRegister,
		};

		let (opcode, operand_kind) = match self {
			Self::Nop => (Byte(0x00), None),
			Self::Hlt => (Byte(0x01), None),
			Self::Int => (Byte(0x02), Immediate),
			Self::Rte => (Byte(0x03), None),

			Self::Add => (Byte(0x10), RegisterPair),
			Self::Adc => (Byte(0x11), RegisterPair),
			Self::Sub => (Byte(0x12), RegisterPair),
			Self::And => (Byte(0x13), RegisterPair),
			Self::Ior => (Byte(0x14), RegisterPair),
			Self::Xor => (Byte(0x15), RegisterPair),
			Self::Not => (Byte(0x16), UnaryRegister),
			Self::Shr => (Byte(0x17), UnaryRegister),
			Self::Inc => (Byte(0x18), UnaryRegister),
			Self::Dec => (Byte(0x19), UnaryRegister),

			Self::Psh => (Nibble(0x2), PackedRegister),
			Self::Pop => (Nibble(0x3), PackedRegister),
			Self::Pek => (Nibble(0x4), PackedRegister),
			Self::Psr => (Nibble(0x5), PackedRegister),
			Self::Ppr => (Nibble(0x6), PackedRegister),
			Self::Pkr => (Nibble(0x7), PackedRegister),

			Self::Clr => (Nibble(0x8), PackedRegister),
			Self::Mov => (Byte(0x90), RegisterPair),
			Self::Ldc => (Nibble(0xA), ImmediateRegister),

			Self::Jmp => (Byte(0xB0), Absolute),
			Self::Jmi => (Byte(0xB1), Absolute),
			Self::Jmr => (Byte(0xB2), RegisterPair),
			Self::Jra => (Byte(0xB3), RegisterPair),
			Self::Jmo => (Byte(0xB4), RegisterPairAbsolute),
			Self::Jmz => (Byte(0xB5), Absolute),
			Self::Jms => (Byte(0xB6), Absolute),
			Self::Jmc => (Byte(0xB7), Absolute),
			Self::Jsr => (Byte(0xB8), Absolute),
			Self::Rsb => (Byte(0xB9), None),

			Self::Ldm => (Byte(0xC0), LoadAbsolute),
			Self::Ldr => (Byte(0xC1), LoadIndirect),
			Self::Lra => (Byte(0xC2), LoadIndirect),
			Self::Lmo => (Byte(0xC3), LoadIndexed),

			Self::Stm => (Byte(0xD0), StoreAbsolute),
			Self::Str => (Byte(0xD1), StoreIndirect),
			Self::Sra => (Byte(0xD2), StoreIndirect),
			Self::Smo => (Byte(0xD3), StoreIndexed),
		};
		MnemonicDescriptor { mnemonic: self, opcode, operand_kind, encoded_length: operand_kind.encoded_length() }
	}

	/// Returns the assembled size of this mnemonic's instructions, which never depends on the operands.
	#[must_use]
	pub const fn encoded_length(self) -> usize {
		self.descriptor().encoded_length
	}
}

impl Display for Mnemonic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.pad(self.variant_name())
	}
}

/// An opcode, which either occupies a full byte or only the high nibble of the first byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Opcode {
	/// The opcode is the entire first byte.
	Byte(u8),
	/// The opcode is the high nibble of the first byte; the low nibble holds a register index.
	Nibble(u8),
}

/// The operand shapes of the instruction set. Each kind has a fixed operand order and byte layout; `op` is the opcode
/// byte, `hi` and `lo` are the big-endian halves of an address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperandKind {
	/// `op`
	None,
	/// `INT value`: `op, value`
	Immediate,
	/// `ADD rs,rd`: `op, rs|rd`
	RegisterPair,
	/// `INC rs`: `op, rs|0`
	UnaryRegister,
	/// `PSH r`: `op|r`
	PackedRegister,
	/// `LDC value,rd`: `op|rd, value`
	ImmediateRegister,
	/// `JMP address`: `op, hi, lo`
	Absolute,
	/// `JMO rh,rl,address`: `op, rh|rl, hi, lo`
	RegisterPairAbsolute,
	/// `LDM address,rd`: `op, 0|rd, hi, lo`
	LoadAbsolute,
	/// `LDR rh,rl,rd`: `op, 0|rd, rh|rl`
	LoadIndirect,
	/// `LMO rh,rl,address,rd`: `op, 0|rd, rh|rl, hi, lo`
	LoadIndexed,
	/// `STM rs,address`: `op, rs|0, hi, lo`
	StoreAbsolute,
	/// `STR rs,rh,rl`: `op, rs|0, rh|rl`
	StoreIndirect,
	/// `SMO rs,rh,rl,address`: `op, rs|0, rh|rl, hi, lo`
	StoreIndexed,
}

impl OperandKind {
	/// Number of bytes an instruction of this kind occupies.
	#[must_use]
	pub const fn encoded_length(self) -> usize {
		match self {
			Self::None | Self::PackedRegister => 1,
			Self::Immediate | Self::RegisterPair | Self::UnaryRegister | Self::ImmediateRegister => 2,
			Self::Absolute | Self::LoadIndirect | Self::StoreIndirect => 3,
			Self::RegisterPairAbsolute | Self::LoadAbsolute | Self::StoreAbsolute => 4,
			Self::LoadIndexed | Self::StoreIndexed => 5,
		}
	}

	/// Number of operands an instruction of this kind takes.
	#[must_use]
	pub const fn operand_count(self) -> usize {
		match self {
			Self::None => 0,
			Self::Immediate | Self::UnaryRegister | Self::PackedRegister | Self::Absolute => 1,
			Self::RegisterPair | Self::ImmediateRegister | Self::LoadAbsolute | Self::StoreAbsolute => 2,
			Self::RegisterPairAbsolute | Self::LoadIndirect | Self::StoreIndirect => 3,
			Self::LoadIndexed | Self::StoreIndexed => 4,
		}
	}
}

/// One entry of the instruction set table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MnemonicDescriptor {
	/// The mnemonic described.
	pub mnemonic:       Mnemonic,
	/// The opcode bits.
	pub opcode:         Opcode,
	/// The operand shape, which determines the byte layout.
	pub operand_kind:   OperandKind,
	/// Number of bytes every instruction with this mnemonic assembles to.
	pub encoded_length: usize,
}

/// One CPU instruction, as classified from a source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
	/// Instruction mnemonic.
	pub mnemonic:  Mnemonic,
	/// Operands in source order.
	pub operands:  Vec<Operand>,
	pub(crate) span: SourceSpan,
}

impl Instruction {
	/// Returns the assembled size of this instruction.
	#[must_use]
	pub const fn assembled_size(&self) -> usize {
		self.mnemonic.encoded_length()
	}
}

impl Display for Instruction {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.mnemonic)?;
		for (index, operand) in self.operands.iter().enumerate() {
			write!(f, "{}{}", if index == 0 { " " } else { "," }, operand)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use rstest::rstest;

	use super::{Mnemonic, Opcode, OperandKind};
	use crate::VariantName;
	use crate::parser::Parse;

	#[test]
	fn every_mnemonic_parses_from_its_name() {
		for mnemonic in Mnemonic::ALL {
			assert_eq!(Mnemonic::parse(mnemonic.variant_name()), Some(mnemonic));
		}
		assert_eq!(Mnemonic::parse("nop"), None);
		assert_eq!(Mnemonic::parse("FOO"), None);
	}

	#[test]
	fn opcodes_are_unique() {
		let mut first_bytes: Vec<u8> = Mnemonic::ALL
			.iter()
			.flat_map(|mnemonic| match mnemonic.descriptor().opcode {
				Opcode::Byte(byte) => vec![byte],
				Opcode::Nibble(nibble) => (0 ..= 0xF).map(|register| (nibble << 4) | register).collect(),
			})
			.collect();
		let count = first_bytes.len();
		first_bytes.sort_unstable();
		first_bytes.dedup();
		assert_eq!(first_bytes.len(), count);
	}

	#[rstest]
	#[case(Mnemonic::Nop, 1)]
	#[case(Mnemonic::Int, 2)]
	#[case(Mnemonic::Add, 2)]
	#[case(Mnemonic::Not, 2)]
	#[case(Mnemonic::Psh, 1)]
	#[case(Mnemonic::Ldc, 2)]
	#[case(Mnemonic::Jmp, 3)]
	#[case(Mnemonic::Jmr, 2)]
	#[case(Mnemonic::Jmo, 4)]
	#[case(Mnemonic::Rsb, 1)]
	#[case(Mnemonic::Ldm, 4)]
	#[case(Mnemonic::Ldr, 3)]
	#[case(Mnemonic::Lmo, 5)]
	#[case(Mnemonic::Stm, 4)]
	#[case(Mnemonic::Sra, 3)]
	#[case(Mnemonic::Smo, 5)]
	fn encoded_lengths(#[case] mnemonic: Mnemonic, #[case] length: usize) {
		assert_eq!(mnemonic.encoded_length(), length);
	}

	#[test]
	fn nibble_opcodes_pack_a_register() {
		for mnemonic in Mnemonic::ALL {
			let descriptor = mnemonic.descriptor();
			let is_nibble = matches!(descriptor.opcode, Opcode::Nibble(_));
			let packs_register =
				matches!(descriptor.operand_kind, OperandKind::PackedRegister | OperandKind::ImmediateRegister);
			assert_eq!(is_nibble, packs_register, "{mnemonic}");
		}
	}
}
