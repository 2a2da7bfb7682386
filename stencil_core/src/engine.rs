use std::io::BufWriter;
use std::io::Read;
use std::io::Write;

use crate::StencilError;
use crate::StencilResult;
use crate::cursor::StreamCursor;
use crate::tokens::TokenTrie;
use crate::variables::VariableCollection;
use crate::variables::VariableFormat;
use crate::variables::VariableSubstitution;

/// Working buffer size used by [`Processor::run`]. Tests drive the engine
/// with sizes down to a single byte; the output must be identical.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Immutable configuration shared by every run of a [`Processor`]:
/// the substitution variables and the token framing around their names.
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
	pub variables: VariableCollection,
	pub format: VariableFormat,
}

impl EngineConfig {
	pub fn new(variables: VariableCollection, format: VariableFormat) -> Self {
		Self { variables, format }
	}
}

/// The immutable definition of an operation. Providers hand the engine
/// their token set once at processor construction and mint a fresh
/// [`Operation`] for every run, so per-run state never leaks across runs.
pub trait OperationProvider {
	/// Byte sequences the engine must recognize for this operation. The
	/// position of a token in this list is the `token` index later passed to
	/// [`Operation::handle_match`].
	fn tokens(&self) -> Vec<Vec<u8>>;

	/// Mutable state for a single run.
	fn create_operation(&self) -> Box<dyn Operation>;
}

/// Per-run handler for one operation's tokens.
pub trait Operation {
	/// React to a confirmed token. The cursor has already been advanced past
	/// the matched bytes; the operation may consume further input and write
	/// replacement bytes through `state`.
	fn handle_match(
		&mut self,
		state: &mut RunState<'_>,
		token: usize,
		length: usize,
	) -> StencilResult<()>;
}

/// Output side of a run.
///
/// Plain bytes pass straight through to the (buffered) sink. A trailing run
/// of spaces, tabs, and carriage returns is held back so an operation can
/// still retract it when a marker calls for whitespace fixup; a line feed or
/// any other byte makes the held run permanent. The held run never crosses a
/// line break, which keeps retraction memory bounded by the longest
/// whitespace run on one line.
struct OutputSink<'a> {
	out: BufWriter<&'a mut dyn Write>,
	pending: Vec<u8>,
	line_has_content: bool,
}

impl<'a> OutputSink<'a> {
	fn new(out: &'a mut dyn Write) -> Self {
		Self {
			out: BufWriter::new(out),
			pending: Vec::new(),
			line_has_content: false,
		}
	}

	fn flush_pending(&mut self) -> StencilResult<()> {
		if !self.pending.is_empty() {
			self.out.write_all(&self.pending)?;
			self.pending.clear();
		}
		Ok(())
	}

	fn write_byte(&mut self, byte: u8) -> StencilResult<()> {
		match byte {
			b'\n' => {
				self.flush_pending()?;
				self.out.write_all(&[byte])?;
				self.line_has_content = false;
			}
			b' ' | b'\t' | b'\r' => self.pending.push(byte),
			_ => {
				self.flush_pending()?;
				self.out.write_all(&[byte])?;
				self.line_has_content = true;
			}
		}
		Ok(())
	}

	fn finish(&mut self) -> StencilResult<()> {
		self.flush_pending()?;
		self.out.flush()?;
		Ok(())
	}
}

/// The mutable state of a single `run`, handed to operations when one of
/// their tokens is confirmed. Wraps the input cursor and the output sink
/// with the handful of movements operations actually perform.
pub struct RunState<'a> {
	cursor: StreamCursor<&'a mut dyn Read>,
	sink: OutputSink<'a>,
	changed: bool,
}

impl<'a> RunState<'a> {
	fn new(input: &'a mut dyn Read, output: &'a mut dyn Write, buffer_size: usize) -> Self {
		Self {
			cursor: StreamCursor::new(input, buffer_size),
			sink: OutputSink::new(output),
			changed: false,
		}
	}

	/// Absolute input offset of the next unconsumed byte.
	pub fn position(&self) -> u64 {
		self.cursor.position()
	}

	/// Write replacement bytes to the output.
	pub fn write(&mut self, bytes: &[u8]) -> StencilResult<()> {
		for &byte in bytes {
			self.sink.write_byte(byte)?;
		}
		Ok(())
	}

	/// Consume `count` input bytes without emitting them.
	pub fn skip(&mut self, count: usize) -> StencilResult<()> {
		self.cursor.advance(count)
	}

	/// Consume input whitespace, including line breaks.
	pub fn skip_whitespace(&mut self) -> StencilResult<()> {
		while let Some(byte) = self.cursor.peek_at(0)? {
			if !matches!(byte, b' ' | b'\t' | b'\r' | b'\n') {
				break;
			}
			self.cursor.advance(1)?;
		}
		Ok(())
	}

	/// Consume input up to and including the next line feed. End of stream
	/// counts as a line end.
	pub fn skip_line_remainder(&mut self) -> StencilResult<()> {
		while let Some(byte) = self.cursor.peek_at(0)? {
			self.cursor.advance(1)?;
			if byte == b'\n' {
				break;
			}
		}
		Ok(())
	}

	/// True when nothing but whitespace has been written to the current
	/// output line.
	pub fn line_is_blank(&self) -> bool {
		!self.sink.line_has_content
	}

	/// Drop the not-yet-flushed trailing whitespace from the output. Never
	/// reaches past a line break.
	pub fn retract_trailing_whitespace(&mut self) {
		self.sink.pending.clear();
	}

	/// Consume input until `matcher` confirms a token, leaving the cursor at
	/// the token start, and return the match length. Returns `None` when the
	/// stream ends first, with everything up to the end consumed.
	pub(crate) fn skip_until(&mut self, matcher: &TokenTrie) -> StencilResult<Option<usize>> {
		loop {
			if self.cursor.at_end()? {
				return Ok(None);
			}
			if let Some(found) = matcher.try_match(&mut self.cursor)? {
				return Ok(Some(found.length));
			}
			self.cursor.advance(1)?;
		}
	}
}

/// Drives the scan loop: a token matching automaton over the union of all
/// registered tokens, dispatching each confirmed token to the operation
/// that owns it and copying everything else through untouched.
///
/// A processor is immutable after [`create`](Self::create) and may be
/// reused for any number of runs; each run gets fresh operation state from
/// the providers.
pub struct Processor {
	trie: TokenTrie,
	providers: Vec<Box<dyn OperationProvider>>,
}

impl Processor {
	/// Build a processor from the ordered provider list plus the built-in
	/// variable substitution derived from `config`. Registration order is
	/// the tie-break for tokens shared between operations, so the order of
	/// `providers` is meaningful.
	pub fn create(
		config: EngineConfig,
		mut providers: Vec<Box<dyn OperationProvider>>,
	) -> StencilResult<Self> {
		providers.push(Box::new(VariableSubstitution::new(
			&config.variables,
			&config.format,
		)));

		let mut trie = TokenTrie::new();
		for (index, provider) in providers.iter().enumerate() {
			for (token, bytes) in provider.tokens().into_iter().enumerate() {
				trie.register(&bytes, index, token)?;
			}
		}

		Ok(Self { trie, providers })
	}

	/// Length of the longest registered token; the upper bound on the
	/// look-back the engine retains for a token torn across buffer refills.
	pub fn max_token_length(&self) -> usize {
		self.trie.max_token_length()
	}

	/// Transform `input` into `output` with the default buffer size.
	/// Returns whether any operation altered the stream.
	pub fn run(&self, mut input: impl Read, mut output: impl Write) -> StencilResult<bool> {
		self.run_dyn(&mut input, &mut output, DEFAULT_BUFFER_SIZE)
	}

	/// Transform with an explicit working buffer size. The size changes how
	/// the input is chunked internally, exercising recognition of tokens
	/// torn across refills; it never changes the output bytes.
	pub fn run_with_buffer_size(
		&self,
		mut input: impl Read,
		mut output: impl Write,
		buffer_size: usize,
	) -> StencilResult<bool> {
		self.run_dyn(&mut input, &mut output, buffer_size)
	}

	fn run_dyn(
		&self,
		input: &mut dyn Read,
		output: &mut dyn Write,
		buffer_size: usize,
	) -> StencilResult<bool> {
		if buffer_size == 0 {
			return Err(StencilError::InvalidBufferSize);
		}

		let mut operations: Vec<Box<dyn Operation>> = self
			.providers
			.iter()
			.map(|provider| provider.create_operation())
			.collect();
		let mut state = RunState::new(input, output, buffer_size);

		loop {
			let Some(first) = state.cursor.peek_at(0)? else {
				break;
			};

			if !self.trie.may_start(first) {
				state.cursor.advance(1)?;
				state.sink.write_byte(first)?;
				continue;
			}

			match self.trie.try_match(&mut state.cursor)? {
				Some(found) => {
					state.cursor.advance(found.length)?;
					state.changed = true;
					operations[found.operation].handle_match(&mut state, found.token, found.length)?;
				}
				None => {
					state.cursor.advance(1)?;
					state.sink.write_byte(first)?;
				}
			}
		}

		state.sink.finish()?;
		Ok(state.changed)
	}
}
