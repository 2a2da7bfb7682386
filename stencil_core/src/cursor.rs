use std::io::ErrorKind;
use std::io::Read;

use crate::StencilResult;

/// A buffered cursor over a byte source.
///
/// The cursor owns the in-memory window of unread input and the absolute
/// offset of the next unconsumed byte. Bytes are made visible through
/// [`peek_at`](Self::peek_at) and consumed through
/// [`advance`](Self::advance); a byte that has been consumed is never
/// re-delivered, and a byte that has only been peeked is never lost, even
/// when a refill shifts the window.
///
/// The working buffer starts at the caller-chosen page size (down to a
/// single byte) and grows only when one peek needs more look-ahead than the
/// page holds, in practice the length of the longest registered token, so
/// memory for tokens torn across refills stays bounded regardless of stream
/// length.
pub(crate) struct StreamCursor<R> {
	source: R,
	buf: Vec<u8>,
	/// Index of the next unconsumed byte within `buf`.
	head: usize,
	/// One past the last valid byte within `buf`.
	tail: usize,
	/// Absolute stream offset of `buf[head]`.
	offset: u64,
	eof: bool,
}

impl<R: Read> StreamCursor<R> {
	pub(crate) fn new(source: R, page_size: usize) -> Self {
		Self {
			source,
			buf: vec![0; page_size.max(1)],
			head: 0,
			tail: 0,
			offset: 0,
			eof: false,
		}
	}

	/// Absolute offset of the next unconsumed byte.
	pub(crate) fn position(&self) -> u64 {
		self.offset
	}

	fn buffered(&self) -> usize {
		self.tail - self.head
	}

	/// Refill until at least `needed` bytes are buffered or the source is
	/// exhausted. Returns the number of bytes actually available.
	fn ensure(&mut self, needed: usize) -> StencilResult<usize> {
		while self.buffered() < needed && !self.eof {
			if self.head > 0 {
				self.buf.copy_within(self.head..self.tail, 0);
				self.tail -= self.head;
				self.head = 0;
			}

			if needed > self.buf.len() {
				self.buf.resize(needed, 0);
			}

			match self.source.read(&mut self.buf[self.tail..]) {
				Ok(0) => self.eof = true,
				Ok(read) => self.tail += read,
				Err(error) if error.kind() == ErrorKind::Interrupted => {}
				Err(error) => return Err(error.into()),
			}
		}

		Ok(self.buffered())
	}

	/// Look at the byte `ahead` positions past the cursor without consuming
	/// anything. Returns `None` when the stream ends first.
	pub(crate) fn peek_at(&mut self, ahead: usize) -> StencilResult<Option<u8>> {
		if self.ensure(ahead + 1)? > ahead {
			Ok(Some(self.buf[self.head + ahead]))
		} else {
			Ok(None)
		}
	}

	/// True once every byte has been consumed and the source is exhausted.
	pub(crate) fn at_end(&mut self) -> StencilResult<bool> {
		Ok(self.ensure(1)? == 0)
	}

	/// Consume `count` bytes. Consuming past the end of the stream stops at
	/// the last available byte.
	pub(crate) fn advance(&mut self, count: usize) -> StencilResult<()> {
		let available = self.ensure(count)?;
		let consumed = count.min(available);
		self.head += consumed;
		self.offset += consumed as u64;
		Ok(())
	}
}
