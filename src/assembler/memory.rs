//! The program image under construction.

use log::trace;

/// A fixed-size, address-indexed program image. Every cell must be written exactly once.
#[derive(Clone, Debug)]
pub struct MemoryImage {
	cells:   Vec<Option<u8>>,
	/// Number of cells written so far.
	written: usize,
}

impl MemoryImage {
	/// Creates an image of `size` unwritten cells.
	#[must_use]
	pub fn new(size: usize) -> Self {
		Self { cells: vec![None; size], written: 0 }
	}

	/// Size of the image.
	#[must_use]
	pub const fn len(&self) -> usize {
		self.cells.len()
	}

	/// Whether the image has no cells at all.
	#[must_use]
	pub const fn is_empty(&self) -> bool {
		self.cells.is_empty()
	}

	/// Writes the bytes starting at `address`.
	///
	/// # Errors
	/// If the bytes do not fit into the image or a cell was already written, the number of bytes the image would have
	/// to hold is returned. Nothing is written in that case.
	pub fn write(&mut self, address: usize, bytes: &[u8]) -> Result<(), usize> {
		let end = address + bytes.len();
		let Some(cells) = self.cells.get_mut(address .. end) else {
			return Err(end);
		};
		if cells.iter().any(Option::is_some) {
			return Err(self.written + bytes.len());
		}
		for (offset, (cell, byte)) in cells.iter_mut().zip(bytes).enumerate() {
			trace!("{:04X}: {byte:02X}", address + offset);
			*cell = Some(*byte);
		}
		self.written += bytes.len();
		Ok(())
	}

	/// Returns the finished image.
	///
	/// # Errors
	/// If any cell was never written, the number of written cells is returned.
	pub fn finish(self) -> Result<Vec<u8>, usize> {
		let written = self.written;
		self.cells.into_iter().collect::<Option<Vec<u8>>>().ok_or(written)
	}
}
