//! First pass: label binding and address assignment.

use log::debug;
use miette::SourceSpan;

use super::{ADDRESS_SPACE, AssemblerState, Placed};
use crate::AssemblyError;
use crate::parser::{Label, Statement};

impl AssemblerState {
	/// Walks all statements with the address counter, binding labels and emitting directive data. Instruction operands
	/// are not inspected, only the instruction's fixed length counts.
	pub(super) fn resolve_labels<'a>(
		&mut self,
		statements: &'a [Statement],
	) -> Result<Vec<Placed<'a>>, Box<AssemblyError>> {
		let mut placed = Vec::new();
		for statement in statements {
			match statement {
				Statement::Blank => {},
				Statement::LabelOnly(label) => self.bind_label(label)?,
				Statement::Directive(directive) => {
					if let Some(label) = &directive.label {
						self.bind_label(label)?;
					}
					let bytes = self.assemble_directive(directive)?;
					let length = bytes.len();
					placed.push(Placed::Data { address: self.address, bytes, span: directive.span });
					self.advance(length, directive.span)?;
				},
				Statement::Instruction(instruction) => {
					placed.push(Placed::Instruction { address: self.address, instruction });
					self.advance(instruction.assembled_size(), instruction.span)?;
				},
			}
		}
		Ok(placed)
	}

	fn bind_label(&mut self, label: &Label) -> Result<(), Box<AssemblyError>> {
		let address = u16::try_from(self.address).map_err(|_| AssemblyError::AddressOverflow {
			address:  self.address,
			src:      self.source.clone(),
			location: label.span,
		})?;
		match self.symbols.define(label.name.clone(), address) {
			Some(previous) => debug!("label {} redefined: {previous:04X} -> {address:04X}", label.name),
			None => debug!("label {} = {address:04X}", label.name),
		}
		Ok(())
	}

	fn advance(&mut self, length: usize, span: SourceSpan) -> Result<(), Box<AssemblyError>> {
		let end = self.address + length;
		if end > ADDRESS_SPACE {
			return Err(AssemblyError::AddressOverflow { address: end - 1, src: self.source.clone(), location: span }
				.into());
		}
		self.address = end;
		Ok(())
	}
}
