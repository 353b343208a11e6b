//! The Register struct.
// this is a bug, see <https://github.com/rust-lang/rust-clippy/issues/6902>
#![allow(clippy::use_self)]

use std::fmt::Display;

use titanasm_derive::{Parse, VariantName};

use crate::VariantName;

/// The 16 general-purpose registers. The discriminant is the 4-bit register index used in encodings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Parse, VariantName)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
	R0 = 0x0,
	R1 = 0x1,
	R2 = 0x2,
	R3 = 0x3,
	R4 = 0x4,
	R5 = 0x5,
	R6 = 0x6,
	R7 = 0x7,
	R8 = 0x8,
	R9 = 0x9,
	RA = 0xA,
	RB = 0xB,
	RC = 0xC,
	RD = 0xD,
	RE = 0xE,
	RF = 0xF,
}

impl Register {
	/// The 4-bit index of this register.
	#[must_use]
	pub const fn index(self) -> u8 {
		self as u8
	}
}

impl Display for Register {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
		write!(f, "{}", self.variant_name())
	}
}
