//! Line classification: turns raw source lines into typed statements.
//!
//! Every line is classified exactly once. Operands are resolved into [`Operand`] here, so later passes never inspect
//! raw text again.

use std::fmt::Display;
use std::num::ParseIntError;
use std::sync::Arc;

use flexstr::{SharedStr, ToSharedStr};
use miette::SourceSpan;

use crate::directive::{Directive, DirectiveSymbol, DirectiveValue};
use crate::instruction::{Instruction, Mnemonic};
use crate::register::Register;
use crate::{AssemblyCode, AssemblyError};

/// Parse an enum from the exact name used in assembly source. Usually derived.
pub trait Parse: Sized {
	/// Returns the variant with the given name, if there is one.
	fn parse(value: &str) -> Option<Self>;
}

/// The character that starts a comment extending to the end of the line.
pub const COMMENT_CHARACTER: char = ';';

/// One classified source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
	/// Empty or comment-only line.
	Blank,
	/// A label declaration on its own line, like `loop:`.
	LabelOnly(Label),
	/// An assembler directive emitting literal data.
	Directive(Directive),
	/// A CPU instruction.
	Instruction(Instruction),
}

/// A label definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
	/// Name of the label.
	pub name: SharedStr,
	/// Location of the name in the source.
	pub span: SourceSpan,
}

/// A numeric literal together with its location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumericLiteral {
	/// The parsed value. Range checks happen when the value is emitted.
	pub value: i64,
	/// Location of the literal in the source.
	pub span:  SourceSpan,
}

/// An instruction operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
	/// A number, like `42` or `0x2A`.
	Literal(NumericLiteral),
	/// One of the 16 registers.
	Register(Register, SourceSpan),
	/// Any other token, which must name a label.
	Label(SharedStr, SourceSpan),
}

impl Operand {
	/// Location of the operand in the source.
	#[must_use]
	pub const fn span(&self) -> SourceSpan {
		match self {
			Self::Literal(NumericLiteral { span, .. }) | Self::Register(_, span) | Self::Label(_, span) => *span,
		}
	}
}

impl Display for Operand {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Literal(literal) => write!(f, "{}", literal.value),
			Self::Register(register, _) => write!(f, "{register}"),
			Self::Label(name, _) => write!(f, "{name}"),
		}
	}
}

/// A whitespace-separated token of a line, with its absolute location.
#[derive(Clone, Copy, Debug)]
struct Token<'a> {
	text:  &'a str,
	/// Offset of the token relative to the start of the line.
	start: usize,
	span:  SourceSpan,
}

impl Token<'_> {
	const fn end(&self) -> usize {
		self.start + self.text.len()
	}
}

/// Splits `text` on `separator` predicate matches, keeping the position of each non-empty piece.
fn split_with_offsets(text: &str, line_offset: usize, is_separator: impl Fn(char) -> bool) -> Vec<Token<'_>> {
	let mut tokens = Vec::new();
	let mut token_start = None;
	for (index, chr) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
		match (token_start, is_separator(chr) || index == text.len()) {
			(None, false) => token_start = Some(index),
			(Some(start), true) => {
				tokens.push(Token {
					text: &text[start .. index],
					start,
					span: (line_offset + start, index - start).into(),
				});
				token_start = None;
			},
			_ => {},
		}
	}
	tokens
}

/// Classify every line of the source code.
///
/// # Errors
/// The first classification error of any line.
pub fn parse_program(source: &Arc<AssemblyCode>) -> Result<Vec<Statement>, Box<AssemblyError>> {
	source.lines().map(|(line_offset, line)| classify_line(line, line_offset, source)).collect()
}

/// Classify a single line of source code which starts at `line_offset` within `source`.
///
/// # Errors
/// Unknown mnemonics and directives, malformed operands, invalid label names and invalid numbers.
pub fn classify_line(
	line: &str,
	line_offset: usize,
	source: &Arc<AssemblyCode>,
) -> Result<Statement, Box<AssemblyError>> {
	let code = line.split(COMMENT_CHARACTER).next().unwrap_or_default();
	let tokens = split_with_offsets(code, line_offset, char::is_whitespace);

	let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
		return Ok(Statement::Blank);
	};
	let statement_span: SourceSpan = (line_offset + first.start, last.end() - first.start).into();

	if tokens.len() == 1
		&& let Some(name) = first.text.strip_suffix(':')
	{
		let name_span = (line_offset + first.start, name.len()).into();
		return Ok(Statement::LabelOnly(parse_label(name, name_span, source)?));
	}

	if let Some(directive_name) = first.text.strip_prefix('.') {
		let symbol = DirectiveSymbol::parse(directive_name).ok_or_else(|| undefined_mnemonic(first, source))?;
		return classify_directive(symbol, &tokens, code, line_offset, statement_span, source)
			.map(Statement::Directive);
	}

	let mnemonic = Mnemonic::parse(first.text).ok_or_else(|| undefined_mnemonic(first, source))?;
	let operand_text = &code[first.end() ..];
	let operands = if operand_text.trim().is_empty() {
		Vec::new()
	} else {
		classify_operands(operand_text, line_offset + first.end(), source)?
	};
	Ok(Statement::Instruction(Instruction { mnemonic, operands, span: statement_span }))
}

fn undefined_mnemonic(token: &Token, source: &Arc<AssemblyCode>) -> Box<AssemblyError> {
	AssemblyError::UndefinedMnemonic {
		mnemonic: token.text.to_shared_str(),
		src:      source.clone(),
		location: token.span,
	}
	.into()
}

/// Splits the text after the mnemonic on commas. Every operand must be a single non-empty token.
fn classify_operands(
	operand_text: &str,
	text_offset: usize,
	source: &Arc<AssemblyCode>,
) -> Result<Vec<Operand>, Box<AssemblyError>> {
	let mut operands = Vec::new();
	let mut piece_start = 0;
	for piece in operand_text.split(',') {
		let pieces = split_with_offsets(piece, text_offset + piece_start, char::is_whitespace);
		let span = pieces.first().zip(pieces.last()).map_or_else(
			|| SourceSpan::from((text_offset + piece_start, piece.len())),
			|(first, last)| (text_offset + piece_start + first.start, last.end() - first.start).into(),
		);
		match pieces.as_slice() {
			[token] => operands.push(classify_operand(token.text, token.span, source)?),
			_ => return Err(AssemblyError::MalformedOperand { src: source.clone(), location: span }.into()),
		}
		piece_start += piece.len() + 1;
	}
	Ok(operands)
}

/// Classify a single operand token: numbers first, then registers; anything else is a label reference.
fn classify_operand(text: &str, span: SourceSpan, source: &Arc<AssemblyCode>) -> Result<Operand, Box<AssemblyError>> {
	if let Some(number) = parse_number(text) {
		let value = number.map_err(|error| AssemblyError::InvalidNumber { error, src: source.clone(), location: span })?;
		Ok(Operand::Literal(NumericLiteral { value, span }))
	} else if let Some(register) = Register::parse(text) {
		Ok(Operand::Register(register, span))
	} else {
		Ok(Operand::Label(text.to_shared_str(), span))
	}
}

/// Parses a numeric literal. Returns `None` if the text does not look like a number at all, i.e. does not start with a
/// digit after an optional sign.
///
/// Accepted forms are decimal, `0x` hexadecimal, `0b` binary and `0o` octal, each optionally preceded by `-` or `+`.
#[must_use]
pub fn parse_number(text: &str) -> Option<Result<i64, ParseIntError>> {
	let (is_negative, unsigned) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1 ..]),
		Some(b'+') => (false, &text[1 ..]),
		_ => (false, text),
	};
	if !unsigned.starts_with(|chr: char| chr.is_ascii_digit()) {
		return None;
	}
	let (radix, digits) = match unsigned.get(.. 2) {
		Some("0x" | "0X") => (16, &unsigned[2 ..]),
		Some("0b" | "0B") => (2, &unsigned[2 ..]),
		Some("0o" | "0O") => (8, &unsigned[2 ..]),
		_ => (10, unsigned),
	};
	// from_str_radix accepts its own sign, which must not follow a radix prefix.
	// HACK: We can't create an invalid digit error manually, so let a lone sign produce one.
	if digits.starts_with(['+', '-']) {
		return Some("-".parse());
	}
	Some(i64::from_str_radix(digits, radix).map(|value| if is_negative { -value } else { value }))
}

/// Whether the name can be used as a label: an identifier that is not also a register name.
fn is_valid_label_name(name: &str) -> bool {
	name.starts_with(|chr: char| chr.is_ascii_alphabetic() || chr == '_')
		&& name.chars().all(|chr| chr.is_ascii_alphanumeric() || chr == '_')
		&& Register::parse(name).is_none()
}

fn parse_label(name: &str, span: SourceSpan, source: &Arc<AssemblyCode>) -> Result<Label, Box<AssemblyError>> {
	if is_valid_label_name(name) {
		Ok(Label { name: name.to_shared_str(), span })
	} else {
		Err(AssemblyError::InvalidLabelName { name: name.to_shared_str(), src: source.clone(), location: span }.into())
	}
}

/// Parses a directive argument, which must be a numeric literal.
fn parse_directive_value(token: &Token, source: &Arc<AssemblyCode>) -> Result<NumericLiteral, Box<AssemblyError>> {
	match parse_number(token.text) {
		Some(Ok(value)) => Ok(NumericLiteral { value, span: token.span }),
		Some(Err(error)) => Err(AssemblyError::InvalidNumber { error, src: source.clone(), location: token.span }.into()),
		None => Err(AssemblyError::ExpectedValue {
			token:    token.text.to_shared_str(),
			src:      source.clone(),
			location: token.span,
		}
		.into()),
	}
}

/// Parses a list of directive arguments, which may be separated by commas as well as white space. Every comma must
/// separate two values.
fn parse_directive_values(
	arguments: &[Token],
	code: &str,
	line_offset: usize,
	source: &Arc<AssemblyCode>,
) -> Result<Vec<NumericLiteral>, Box<AssemblyError>> {
	let (Some(first), Some(last)) = (arguments.first(), arguments.last()) else {
		return Ok(Vec::new());
	};
	let text_offset = line_offset + first.start;
	let mut values = Vec::new();
	let mut piece_start = 0;
	for piece in code[first.start .. last.end()].split(',') {
		let tokens = split_with_offsets(piece, text_offset + piece_start, char::is_whitespace);
		if tokens.is_empty() {
			return Err(AssemblyError::MalformedOperand {
				src:      source.clone(),
				location: (text_offset + piece_start, piece.len()).into(),
			}
			.into());
		}
		for token in &tokens {
			values.push(parse_directive_value(token, source)?);
		}
		piece_start += piece.len() + 1;
	}
	Ok(values)
}

fn classify_directive(
	symbol: DirectiveSymbol,
	tokens: &[Token],
	code: &str,
	line_offset: usize,
	span: SourceSpan,
	source: &Arc<AssemblyCode>,
) -> Result<Directive, Box<AssemblyError>> {
	let arguments = &tokens[1 ..];
	let check_count = |minimum: usize, maximum: Option<usize>| -> Result<(), Box<AssemblyError>> {
		if arguments.len() < minimum {
			Err(AssemblyError::MissingOperand {
				mnemonic: symbol.to_string().into(),
				expected: minimum,
				actual:   arguments.len(),
				src:      source.clone(),
				location: span,
			}
			.into())
		} else if let Some(maximum) = maximum
			&& arguments.len() > maximum
		{
			Err(AssemblyError::TooManyOperands {
				mnemonic: symbol.to_string().into(),
				expected: maximum,
				actual:   arguments.len(),
				src:      source.clone(),
				location: span,
			}
			.into())
		} else {
			Ok(())
		}
	};

	let (label, value) = match symbol {
		DirectiveSymbol::Byte | DirectiveSymbol::Word => {
			check_count(2, Some(2))?;
			let label = parse_label(arguments[0].text, arguments[0].span, source)?;
			let value = parse_directive_value(&arguments[1], source)?;
			(Some(label), if symbol == DirectiveSymbol::Byte { DirectiveValue::Byte(value) } else {
				DirectiveValue::Word(value)
			})
		},
		DirectiveSymbol::Data => {
			check_count(1, None)?;
			let label = parse_label(arguments[0].text, arguments[0].span, source)?;
			(Some(label), DirectiveValue::Data(parse_directive_values(&arguments[1 ..], code, line_offset, source)?))
		},
		DirectiveSymbol::Raw =>
			(None, DirectiveValue::Data(parse_directive_values(arguments, code, line_offset, source)?)),
		DirectiveSymbol::Asciz => {
			check_count(1, None)?;
			let label = parse_label(arguments[0].text, arguments[0].span, source)?;
			let text_start = arguments[0].end();
			let raw_text = &code[text_start ..];
			let text = raw_text.trim();
			let text_span = SourceSpan::from((
				line_offset + text_start + (raw_text.len() - raw_text.trim_start().len()),
				text.len(),
			));
			let unquoted = text
				.strip_prefix('"')
				.and_then(|text| text.strip_suffix('"'))
				.ok_or_else(|| AssemblyError::MalformedStringLiteral {
					text:     text.to_shared_str(),
					src:      source.clone(),
					location: text_span,
				})?;
			(Some(label), DirectiveValue::String { text: unquoted.to_shared_str(), span: text_span })
		},
	};
	Ok(Directive { symbol, label, value, span })
}
