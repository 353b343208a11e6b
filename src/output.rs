//! Output formats for the assembled program.

use std::cmp::min;
use std::fmt::Write;

/// The ways an assembled program can be written out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "binaries", derive(clap::ValueEnum))]
#[repr(u8)]
pub enum OutputFormat {
	/// A list of decimal byte values, like `[176, 0, 4]`.
	#[default]
	List,
	/// Every byte as the character with that code point, written as one raw byte.
	Chars,
	/// Every byte as eight binary digits, one byte per line.
	Bits,
	/// Hexadecimal representation in a pretty format like in a hex editor.
	#[cfg_attr(feature = "binaries", value(name = "hexdump"))]
	HexDump,
	/// Just the binary data.
	Plain,
}

impl OutputFormat {
	/// Renders the program in this format.
	#[must_use]
	pub fn render(self, bytes: &[u8]) -> Vec<u8> {
		match self {
			Self::List => as_list(bytes).into_bytes(),
			Self::Chars | Self::Plain => bytes.to_vec(),
			Self::Bits => as_bits(bytes).into_bytes(),
			Self::HexDump => pretty_hex(bytes).into_bytes(),
		}
	}

	/// Whether the rendered output is text that should end with a line break on a terminal.
	#[must_use]
	pub const fn is_text(self) -> bool {
		!matches!(self, Self::Plain | Self::HexDump)
	}
}

/// Formats the bytes as a list of decimal numbers.
#[must_use]
pub fn as_list(bytes: &[u8]) -> String {
	format!("{bytes:?}")
}

/// Formats every byte as eight binary digits, one byte per line.
#[must_use]
pub fn as_bits(bytes: &[u8]) -> String {
	bytes.iter().map(|byte| format!("{byte:08b}")).collect::<Vec<_>>().join("\n")
}

/// Pretty-print byte data as hexadecimal, similar to hex editors.
#[must_use]
pub fn pretty_hex(bytes: &[u8]) -> String {
	let mut string = String::new();
	// need approximately high nibble + low nibble + ' ' per byte
	string.reserve(bytes.len() * 3);
	let mut index = 0;
	while index * 16 < bytes.len() {
		let section = &bytes[index * 16 .. min((index + 1) * 16, bytes.len())];
		let _ = write!(string, "{:04X}:", index * 16);
		for byte in section {
			let _ = write!(string, " {byte:02X}");
		}
		string.push('\n');
		index += 1;
	}
	string
}

#[cfg(test)]
mod test {
	use super::{OutputFormat, as_bits, as_list, pretty_hex};
	use crate::assemble;

	#[test]
	fn list() {
		assert_eq!(as_list(&[176, 0, 4]), "[176, 0, 4]");
		assert_eq!(as_list(&[]), "[]");
	}

	#[test]
	fn chars_are_single_bytes() {
		assert_eq!(OutputFormat::Chars.render(&[0x48, 0x49, 0x00]), b"HI\0");
		let image = assemble(&["JMP 0", "LDM 0x0102,R3"]).unwrap();
		let rendered = OutputFormat::Chars.render(&image);
		assert_eq!(rendered.len(), image.len());
		assert_eq!(rendered, [0xB0, 0x00, 0x00, 0xC0, 0x03, 0x01, 0x02]);
		assert!(OutputFormat::Chars.is_text());
	}

	#[test]
	fn bits() {
		assert_eq!(as_bits(&[0x10, 0x18, 0x00]), "00010000\n00011000\n00000000");
		assert_eq!(as_bits(&[]), "");
	}

	#[test]
	fn hex_dump() {
		let bytes: Vec<u8> = (0 ..= 16).collect();
		assert_eq!(
			pretty_hex(&bytes),
			"0000: 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F\n0010: 10\n"
		);
		assert_eq!(pretty_hex(&[]), "");
	}

	#[test]
	fn plain_is_unchanged() {
		assert_eq!(OutputFormat::Plain.render(&[1, 2, 255]), [1, 2, 255]);
		assert_eq!(OutputFormat::default().render(&[1, 2]), b"[1, 2]");
		assert!(!OutputFormat::Plain.is_text());
		assert!(OutputFormat::Bits.is_text());
	}
}
