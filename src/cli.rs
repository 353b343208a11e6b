//! Command-line interface related structures.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::output::OutputFormat;

/// Titan assembler.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about=None)]
pub struct TitanasmCli {
	/// Assembly file to assemble.
	#[clap(value_parser)]
	pub input:         PathBuf,
	/// Output file. Use `-` or leave out for standard output.
	#[clap(value_parser, long, short = 'o')]
	pub output:        Option<PathBuf>,
	/// Format to output to.
	///
	/// - list: Decimal byte values, like `[176, 0, 4]`.
	///
	/// - chars: Every byte as the character with that code point.
	///
	/// - bits: Every byte as eight binary digits, one per line.
	///
	/// - hexdump: Dump hexadecimal representation in a pretty format like in a hex editor.
	///
	/// - plain: Output just the binary data.
	#[clap(value_parser, default_value = "list", long, short = 'f')]
	pub output_format: OutputFormat,
	/// Raise the log level. Use twice for trace output.
	#[clap(long, short = 'd', action = clap::ArgAction::Count)]
	pub debug:         u8,
	/// Print the symbol table to standard error after assembly.
	#[clap(long)]
	pub dump_symbols:  bool,
}

impl TitanasmCli {
	/// The log level requested with the `-d` flags.
	#[must_use]
	pub const fn log_level(&self) -> LevelFilter {
		match self.debug {
			0 => LevelFilter::Warn,
			1 => LevelFilter::Debug,
			2 .. => LevelFilter::Trace,
		}
	}

	/// Whether the output should go to standard output.
	#[must_use]
	pub fn writes_to_stdout(&self) -> bool {
		self.output.as_ref().is_none_or(|output| output.as_os_str() == "-")
	}
}
