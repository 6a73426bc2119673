use std::collections::BTreeSet;

use crate::config::FlushStrategy;
use crate::config::NormalizeOptions;

/// The frontmatter delimiter line.
pub const DELIMITER: &str = "---";

/// Block scalar indicators accepted after `<key>: `. The chomping variants
/// (`|-`, `|+`) are literal block scalars too.
const BLOCK_SCALAR_INDICATORS: [&str; 3] = ["|", "|-", "|+"];

/// Position of the normalizer within a document.
///
/// A document without an opening delimiter moves straight from
/// [`State::Scanning`] to [`State::AfterFrontmatter`] and is passed through
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
	/// Before the first line has been classified.
	Scanning,
	/// Inside the frontmatter, outside any block scalar.
	InFrontmatter,
	/// Buffering the body of a block scalar.
	InBlockScalar,
	/// Frontmatter closed (or never opened). Every line is passed through.
	AfterFrontmatter,
}

/// Returns true when the line is a frontmatter delimiter (`---`, ignoring
/// trailing whitespace).
pub fn is_delimiter(line: &str) -> bool {
	line.trim_end() == DELIMITER
}

/// Returns true when the line introduces a key at the outermost mapping level:
/// it is not blank, does not start with a space, and contains a `:`.
pub fn is_top_level_key(line: &str) -> bool {
	!line.trim().is_empty() && !line.starts_with(' ') && line.contains(':')
}

/// Returns the key name when the line opens a literal block scalar for one of
/// the configured keys, e.g. `license: |`.
///
/// Only trailing whitespace is trimmed. A tab-led line is still a top-level
/// key, but its key name keeps the tab and so never matches a configured key.
pub fn block_scalar_key<'a>(line: &'a str, keys: &BTreeSet<String>) -> Option<&'a str> {
	if !is_top_level_key(line) {
		return None;
	}

	let (key, indicator) = line.trim_end().split_once(':')?;
	let indicator = indicator.strip_prefix(' ')?;

	if BLOCK_SCALAR_INDICATORS.contains(&indicator) && keys.contains(key) {
		Some(key)
	} else {
		None
	}
}

/// Streaming form of the frontmatter block normalizer.
///
/// Lines are fed one at a time and ready output is appended to the caller's
/// buffer. Block scalar bodies are held back until the line that terminates
/// them arrives (or [`Normalizer::finish`] is called), so output order always
/// matches input order.
///
/// ```rust
/// use fmindent_core::NormalizeOptions;
/// use fmindent_core::Normalizer;
///
/// let options = NormalizeOptions::default();
/// let mut normalizer = Normalizer::new(&options);
/// let mut out = Vec::new();
///
/// for line in ["---", "license: |", "      MIT", "---"] {
/// 	normalizer.feed(line, &mut out);
/// }
/// normalizer.finish(&mut out);
///
/// assert_eq!(out, ["---", "license: |", "  MIT", "---"]);
/// ```
#[derive(Debug)]
pub struct Normalizer<'a> {
	options: &'a NormalizeOptions,
	state: State,
	buffer: Vec<String>,
	block_scalars: usize,
}

impl<'a> Normalizer<'a> {
	pub fn new(options: &'a NormalizeOptions) -> Self {
		Self {
			options,
			state: State::Scanning,
			buffer: Vec::new(),
			block_scalars: 0,
		}
	}

	pub fn state(&self) -> State {
		self.state
	}

	/// Number of configured block scalars opened so far.
	pub fn block_scalars(&self) -> usize {
		self.block_scalars
	}

	/// Classify one logical line (terminator already removed).
	pub fn feed(&mut self, line: &str, out: &mut Vec<String>) {
		match self.state {
			State::Scanning => {
				out.push(line.to_string());
				if is_delimiter(line) {
					self.transition(State::InFrontmatter);
				} else {
					self.transition(State::AfterFrontmatter);
				}
			}
			State::InFrontmatter => {
				out.push(line.to_string());
				if is_delimiter(line) {
					self.transition(State::AfterFrontmatter);
				} else if block_scalar_key(line, &self.options.block_scalar_keys).is_some() {
					self.block_scalars += 1;
					self.transition(State::InBlockScalar);
				}
			}
			State::InBlockScalar => {
				if is_delimiter(line) {
					self.flush(out);
					out.push(line.to_string());
					self.transition(State::AfterFrontmatter);
				} else if is_top_level_key(line) {
					self.flush(out);
					out.push(line.to_string());
					// A configured key may follow another block scalar directly.
					if block_scalar_key(line, &self.options.block_scalar_keys).is_some() {
						self.block_scalars += 1;
					} else {
						self.transition(State::InFrontmatter);
					}
				} else {
					self.buffer.push(line.to_string());
				}
			}
			State::AfterFrontmatter => out.push(line.to_string()),
		}
	}

	/// Flush any block scalar left open at the end of the document. No closing
	/// delimiter is synthesized.
	pub fn finish(&mut self, out: &mut Vec<String>) {
		if self.state == State::InBlockScalar {
			tracing::trace!(
				lines = self.buffer.len(),
				"document ended inside a block scalar"
			);
			self.flush(out);
		}
	}

	fn transition(&mut self, next: State) {
		if self.state != next {
			tracing::trace!(from = ?self.state, to = ?next, "normalizer transition");
			self.state = next;
		}
	}

	fn flush(&mut self, out: &mut Vec<String>) {
		let lines = std::mem::take(&mut self.buffer);
		let indent = " ".repeat(self.options.indent_width);

		match self.options.strategy {
			FlushStrategy::Flatten => out.extend(flatten(&lines, &indent)),
			FlushStrategy::Dedent => out.extend(dedent(&lines, &indent)),
		}
	}
}

fn flatten<'l>(lines: &'l [String], indent: &'l str) -> impl Iterator<Item = String> + 'l {
	lines.iter().map(move |line| {
		let content = line.trim();
		if content.is_empty() {
			String::new()
		} else {
			format!("{indent}{content}")
		}
	})
}

fn dedent<'l>(lines: &'l [String], indent: &'l str) -> impl Iterator<Item = String> + 'l {
	let margin = common_margin(lines);

	lines.iter().map(move |line| {
		if line.trim().is_empty() {
			String::new()
		} else {
			format!("{indent}{}", line[margin..].trim_end())
		}
	})
}

/// Byte length of the leading whitespace shared by every non-blank line.
fn common_margin(lines: &[String]) -> usize {
	let mut margin: Option<&str> = None;

	for line in lines.iter().filter(|line| !line.trim().is_empty()) {
		let leading = &line[..line.len() - line.trim_start().len()];
		margin = Some(match margin {
			None => leading,
			Some(current) => {
				let shared = current
					.char_indices()
					.zip(leading.chars())
					.find(|((_, a), b)| a != b)
					.map_or(current.len().min(leading.len()), |((index, _), _)| index);
				&current[..shared]
			}
		});
	}

	margin.map_or(0, str::len)
}

/// Normalize a sequence of logical lines (terminators already removed).
///
/// The output always has the same length as the input. Documents that do not
/// start with a `---` line are returned unchanged.
pub fn normalize<L: AsRef<str>>(lines: &[L], options: &NormalizeOptions) -> Vec<String> {
	let mut normalizer = Normalizer::new(options);
	let mut out = Vec::with_capacity(lines.len());

	for line in lines {
		normalizer.feed(line.as_ref(), &mut out);
	}
	normalizer.finish(&mut out);

	out
}

/// The outcome of normalizing a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
	/// The normalized document text.
	pub content: String,
	/// Number of configured block scalars found in the frontmatter.
	pub block_scalars: usize,
	/// Number of lines whose content changed.
	pub changed_lines: usize,
}

impl NormalizeReport {
	pub fn is_changed(&self) -> bool {
		self.changed_lines > 0
	}
}

/// Normalize a document body, keeping each line's original terminator.
///
/// Lines are split on `\n`; a preceding `\r` stays part of the terminator, so
/// CRLF documents keep their line endings and a missing final newline stays
/// missing.
pub fn normalize_document(content: &str, options: &NormalizeOptions) -> String {
	normalize_document_with_report(content, options).content
}

/// Same as [`normalize_document`], also reporting what changed.
pub fn normalize_document_with_report(
	content: &str,
	options: &NormalizeOptions,
) -> NormalizeReport {
	let (lines, terminators): (Vec<&str>, Vec<&str>) =
		content.split_inclusive('\n').map(split_terminator).unzip();

	let mut normalizer = Normalizer::new(options);
	let mut normalized = Vec::with_capacity(lines.len());
	for line in &lines {
		normalizer.feed(line, &mut normalized);
	}
	normalizer.finish(&mut normalized);

	let mut output = String::with_capacity(content.len());
	let mut changed_lines = 0;
	for ((line, original), terminator) in normalized.iter().zip(&lines).zip(&terminators) {
		if line != original {
			changed_lines += 1;
		}
		output.push_str(line);
		output.push_str(terminator);
	}

	NormalizeReport {
		content: output,
		block_scalars: normalizer.block_scalars(),
		changed_lines,
	}
}

fn split_terminator(line: &str) -> (&str, &str) {
	if let Some(body) = line.strip_suffix("\r\n") {
		(body, &line[body.len()..])
	} else if let Some(body) = line.strip_suffix('\n') {
		(body, &line[body.len()..])
	} else {
		(line, "")
	}
}
