//! Source code infrastructure for error reporting.

use std::path::PathBuf;
use std::sync::Arc;

use flexstr::SharedStr;
use miette::{MietteError, MietteSpanContents, SourceCode, SourceSpan, SpanContents};

use crate::AssemblyError;

/// The source code of one assembly run: an ordered sequence of lines plus a (possibly fake) name.
#[derive(Debug, Clone, Default)]
pub struct AssemblyCode {
	/// The text content of the assembly code, lines joined by `\n`.
	pub text:    SharedStr,
	/// Name of the source, usually the file it was read from.
	pub name:    PathBuf,
	/// Byte offset into `text` at which each line starts.
	line_starts: Vec<usize>,
}

impl AssemblyCode {
	/// Create a new source code struct by loading a file's contents.
	///
	/// # Errors
	/// If reading the file fails (doesn't exist, permissions wrong, I/O error etc.)
	pub fn from_file(filename: &str) -> Result<Arc<Self>, std::io::Error> {
		let path = PathBuf::from(filename);
		let mut text = std::fs::read_to_string(&path)?;
		// Files may use CRLF line endings.
		text = text.chars().filter(|c| c != &'\r').collect();
		Ok(Arc::new(Self::new_from_path(&text, path)))
	}

	/// Create a new source code struct by loading a file's contents, and immediately create an assembler error if that
	/// fails.
	///
	/// # Errors
	/// If reading the file fails (doesn't exist, permissions wrong, I/O error etc.)
	pub fn from_file_or_assembly_error(file_name: &str) -> Result<Arc<Self>, Box<AssemblyError>> {
		Self::from_file(file_name).map_err(|os_error| {
			AssemblyError::FileNotFound {
				os_error:  Arc::new(os_error),
				file_name: file_name.to_string().into(),
				src:       Arc::new(Self::new(file_name, "<<arguments>>")),
				location:  (0, file_name.len()).into(),
			}
			.into()
		})
	}

	/// Create a new source code struct from source code text and a (possibly fake) name.
	#[must_use]
	pub fn new(text: &str, name: &str) -> Self {
		Self::new_from_path(text, PathBuf::from(name))
	}

	/// Create a new source code struct from an ordered sequence of lines.
	#[must_use]
	pub fn from_lines<S: AsRef<str>>(lines: &[S], name: &str) -> Self {
		let text = lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
		Self::new(&text, name)
	}

	fn new_from_path(text: &str, name: PathBuf) -> Self {
		let line_starts = std::iter::once(0)
			.chain(text.char_indices().filter(|(_, chr)| *chr == '\n').map(|(index, _)| index + 1))
			.collect();
		Self { text: text.to_string().into(), name, line_starts }
	}

	/// Iterates over all lines together with the byte offset at which they start.
	pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
		self.line_starts.iter().copied().zip(self.text.as_str().split('\n'))
	}

	/// Returns the file name of this source code.
	#[must_use]
	pub fn file_name(&self) -> SharedStr {
		self.name.as_os_str().to_string_lossy().to_string().into()
	}
}

impl SourceCode for AssemblyCode {
	fn read_span<'a>(
		&'a self,
		span: &SourceSpan,
		context_lines_before: usize,
		context_lines_after: usize,
	) -> Result<Box<dyn SpanContents<'a> + 'a>, MietteError> {
		let result = self.text.as_str().read_span(span, context_lines_before, context_lines_after)?;
		let retval = Box::new(MietteSpanContents::new_named(
			self.file_name().as_str().to_owned(),
			result.data(),
			*result.span(),
			result.line(),
			result.column(),
			result.line_count(),
		));
		Ok(retval)
	}
}
