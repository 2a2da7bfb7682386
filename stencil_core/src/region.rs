use crate::StencilResult;
use crate::engine::Operation;
use crate::engine::OperationProvider;
use crate::engine::RunState;
use crate::tokens::TokenTrie;

/// Local token index of the end marker (the start marker is 0).
const END: usize = 1;

/// A paired-marker region of the stream, either kept or dropped.
///
/// Text outside a region always passes through. With `include` set the
/// bytes between the markers are kept and only the markers are removed;
/// without it the markers and everything between them are dropped. When the
/// start and end markers are the same byte sequence the region is a toggle,
/// alternating on each occurrence.
///
/// `whole_line` extends removal of a marker to its entire line when the
/// marker is the first non-whitespace content on that line.
/// `trim_whitespace` trims the whitespace hugging a removed marker so
/// dropping it leaves no stray blanks behind.
#[derive(Clone, Debug)]
pub struct Region {
	start: Vec<u8>,
	end: Vec<u8>,
	include: bool,
	whole_line: bool,
	trim_whitespace: bool,
}

impl Region {
	pub fn new(
		start: impl AsRef<[u8]>,
		end: impl AsRef<[u8]>,
		include: bool,
		whole_line: bool,
		trim_whitespace: bool,
	) -> Self {
		Self {
			start: start.as_ref().to_vec(),
			end: end.as_ref().to_vec(),
			include,
			whole_line,
			trim_whitespace,
		}
	}
}

impl OperationProvider for Region {
	fn tokens(&self) -> Vec<Vec<u8>> {
		vec![self.start.clone(), self.end.clone()]
	}

	fn create_operation(&self) -> Box<dyn Operation> {
		Box::new(RegionOperation {
			toggle: self.start == self.end,
			include: self.include,
			whole_line: self.whole_line,
			trim_whitespace: self.trim_whitespace,
			end_matcher: TokenTrie::single(&self.end),
			active: false,
		})
	}
}

/// Per-run region state.
///
/// The state machine is deliberately lenient: an end marker with no open
/// region is consumed as a no-op, and a region still open at end of stream
/// treats the stream end as its closing marker. Marker mistakes in a
/// template degrade gracefully instead of aborting generation.
struct RegionOperation {
	toggle: bool,
	include: bool,
	whole_line: bool,
	trim_whitespace: bool,
	end_matcher: TokenTrie,
	active: bool,
}

impl Operation for RegionOperation {
	fn handle_match(
		&mut self,
		state: &mut RunState<'_>,
		token: usize,
		_length: usize,
	) -> StencilResult<()> {
		self.fix_surroundings(state)?;

		if !self.toggle && token == END {
			// Closing marker. A stray end with no open region is consumed
			// without touching the state.
			self.active = false;
			return Ok(());
		}

		if self.include {
			self.active = if self.toggle { !self.active } else { true };
			return Ok(());
		}

		// Exclude mode: drop everything through the closing marker. End of
		// stream closes the region implicitly.
		if let Some(length) = state.skip_until(&self.end_matcher)? {
			state.skip(length)?;
			self.fix_surroundings(state)?;
		}
		Ok(())
	}
}

impl RegionOperation {
	/// Whitespace fixup around a marker that has just been consumed.
	///
	/// When whole-line mode applies (the marker was the first non-whitespace
	/// content on its output line) the line's indentation and the rest of
	/// the marker's input line go with it, and trimming is skipped.
	/// Otherwise trimming, when enabled, retracts the whitespace written
	/// just before the marker and consumes the whitespace after it.
	fn fix_surroundings(&self, state: &mut RunState<'_>) -> StencilResult<()> {
		if self.whole_line && state.line_is_blank() {
			state.retract_trailing_whitespace();
			state.skip_line_remainder()?;
		} else if self.trim_whitespace {
			state.retract_trailing_whitespace();
			state.skip_whitespace()?;
		}
		Ok(())
	}
}
