//! Directive assembly functions.

use super::AssemblerState;
use crate::AssemblyError;
use crate::directive::{Directive, DirectiveValue};

impl AssemblerState {
	/// Emits the literal bytes of a directive. Directives never reference labels, so this happens in the first pass.
	pub(super) fn assemble_directive(&self, directive: &Directive) -> Result<Vec<u8>, Box<AssemblyError>> {
		let mut bytes = Vec::with_capacity(directive.assembled_size());
		match &directive.value {
			DirectiveValue::Byte(literal) => self.emit_byte(&mut bytes, literal.value, literal.span)?,
			DirectiveValue::Word(literal) => self.emit_word(&mut bytes, literal.value, literal.span)?,
			DirectiveValue::Data(values) =>
				for literal in values {
					self.emit_byte(&mut bytes, literal.value, literal.span)?;
				},
			DirectiveValue::String { text, span } => {
				for chr in text.as_str().chars() {
					self.emit_byte(&mut bytes, i64::from(u32::from(chr)), *span)?;
				}
				self.emit_byte(&mut bytes, 0, *span)?;
			},
		}
		Ok(bytes)
	}
}
