//! The symbol table, mapping label names to absolute addresses.

use std::collections::HashMap;
use std::fmt::Display;

use flexstr::SharedStr;

/// Label name to address mapping of one assembly run. Populated by the first pass, read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
	labels: HashMap<SharedStr, u16>,
}

impl SymbolTable {
	/// Creates an empty symbol table.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds the label to the address, replacing and returning any previous binding.
	pub fn define(&mut self, name: SharedStr, address: u16) -> Option<u16> {
		self.labels.insert(name, address)
	}

	/// Looks up the address of a label.
	#[must_use]
	pub fn resolve(&self, name: &SharedStr) -> Option<u16> {
		self.labels.get(name).copied()
	}

	/// Number of defined labels.
	#[must_use]
	pub fn len(&self) -> usize {
		self.labels.len()
	}

	/// Whether no label is defined.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}

	/// All labels with their addresses, ordered by address and then by name.
	#[must_use]
	pub fn sorted(&self) -> Vec<(&SharedStr, u16)> {
		let mut labels: Vec<_> = self.labels.iter().map(|(name, address)| (name, *address)).collect();
		labels.sort_by(|(a_name, a_address), (b_name, b_address)| {
			a_address.cmp(b_address).then_with(|| a_name.as_str().cmp(b_name.as_str()))
		});
		labels
	}
}

impl Display for SymbolTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (name, address) in self.sorted() {
			writeln!(f, "{address:04X} {name}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use flexstr::ToSharedStr;

	use super::SymbolTable;

	#[test]
	fn redefinition_replaces() {
		let mut symbols = SymbolTable::new();
		assert!(symbols.is_empty());
		assert_eq!(symbols.define("LOOP".to_shared_str(), 4), None);
		assert_eq!(symbols.define("LOOP".to_shared_str(), 9), Some(4));
		assert_eq!(symbols.resolve(&"LOOP".to_shared_str()), Some(9));
		assert_eq!(symbols.resolve(&"loop".to_shared_str()), None);
		assert_eq!(symbols.len(), 1);
	}

	#[test]
	fn listing_is_sorted_by_address() {
		let mut symbols = SymbolTable::new();
		symbols.define("end".to_shared_str(), 0x10);
		symbols.define("start".to_shared_str(), 0);
		symbols.define("also_start".to_shared_str(), 0);
		assert_eq!(symbols.to_string(), "0000 also_start\n0000 start\n0010 end\n");
	}
}
