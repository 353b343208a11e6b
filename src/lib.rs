//! Titan assembler.
//!
//! Turns Titan assembly source into a flat program image in two passes: the first pass binds labels and places
//! directive data, the second pass encodes instructions once every label is known.
//!
//! ```
//! let image = titanasm::assemble(&["JMP TARGET", "NOP", "TARGET:", "HLT"]).unwrap();
//! assert_eq!(image, [0xB0, 0x00, 0x04, 0x00, 0x01]);
//! ```

use std::sync::Arc;

pub mod assembler;
#[cfg(feature = "binaries")]
pub mod cli;
pub mod directive;
mod error;
pub mod instruction;
pub mod output;
pub mod parser;
pub mod register;
mod source;
mod symbols;
#[cfg(test)]
mod test;

pub use assembler::AssembledProgram;
pub use error::AssemblyError;
pub use source::AssemblyCode;
pub use symbols::SymbolTable;

/// Provides a name for enum variants.
pub trait VariantName {
	/// Returns the name of this variant, as written in assembly source.
	fn variant_name(&self) -> &'static str;
}

/// Assembles an ordered sequence of source lines into a program image.
///
/// # Errors
/// The first error in the source code. No partial output is produced.
pub fn assemble<S: AsRef<str>>(lines: &[S]) -> Result<Vec<u8>, Box<AssemblyError>> {
	let source = Arc::new(AssemblyCode::from_lines(lines, "<input>"));
	run_assembler(&source).map(|program| program.image)
}

/// Run the assembler on a single source, keeping the symbol table.
///
/// # Errors
/// Any assembler errors are propagated to the caller.
pub fn run_assembler(source: &Arc<AssemblyCode>) -> Result<AssembledProgram, Box<AssemblyError>> {
	let program = assembler::assemble(source)?;
	if program.image.len() != program.expected_size {
		return Err(AssemblyError::AssemblyInvariantViolation {
			expected: program.expected_size,
			actual:   program.image.len(),
			src:      source.clone(),
			location: (0, source.text.as_str().len()).into(),
		}
		.into());
	}
	Ok(program)
}
