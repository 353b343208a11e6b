//! Assembly directives, which place literal data into the program.
#![allow(clippy::module_name_repetitions)]

use std::fmt::Display;

use flexstr::SharedStr;
use miette::SourceSpan;
use titanasm_derive::{Parse, VariantName};

use crate::VariantName;
use crate::parser::{Label, NumericLiteral};

/// An assembly directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
	/// Which directive this is.
	pub symbol:      DirectiveSymbol,
	/// Label bound to the first byte of the directive's data. Only `.RAW` has none.
	pub label:       Option<Label>,
	/// Actual data of the directive.
	pub value:       DirectiveValue,
	pub(crate) span: SourceSpan,
}

impl Directive {
	/// Number of bytes this directive places into the program.
	#[must_use]
	pub fn assembled_size(&self) -> usize {
		self.value.assembled_size()
	}
}

/// Directive symbols. The source name is the variant name in upper case, preceded by a `.`.
#[derive(Debug, Clone, Copy, Parse, VariantName, Eq, PartialEq, Hash)]
pub enum DirectiveSymbol {
	/// `.BYTE label value`: one byte.
	Byte,
	/// `.WORD label value`: one big-endian 16-bit word.
	Word,
	/// `.DATA label value...`: a sequence of bytes.
	Data,
	/// `.RAW value...`: a sequence of bytes without a label.
	Raw,
	/// `.ASCIZ label "text"`: a zero-terminated string.
	Asciz,
}

impl Display for DirectiveSymbol {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.pad(&format!(".{}", self.variant_name()))
	}
}

/// The data of a directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveValue {
	/// A single byte.
	Byte(NumericLiteral),
	/// A 16-bit word, emitted high byte first.
	Word(NumericLiteral),
	/// Any number of bytes.
	Data(Vec<NumericLiteral>),
	/// A string without its quotes. A zero terminator is appended on assembly.
	String {
		/// The text between the quotes.
		text: SharedStr,
		/// Location of the quoted string in the source.
		span: SourceSpan,
	},
}

impl DirectiveValue {
	/// Number of bytes this value occupies in the program.
	#[must_use]
	pub fn assembled_size(&self) -> usize {
		match self {
			Self::Byte(_) => 1,
			Self::Word(_) => 2,
			Self::Data(values) => values.len(),
			Self::String { text, .. } => text.as_str().chars().count() + 1,
		}
	}
}
