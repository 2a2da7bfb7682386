use std::collections::HashMap;
use std::io::Read;

use crate::StencilError;
use crate::StencilResult;
use crate::cursor::StreamCursor;

/// A confirmed token at the cursor position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TokenMatch {
	/// Index of the operation that registered the token.
	pub(crate) operation: usize,
	/// Index of the token within that operation's own token list.
	pub(crate) token: usize,
	/// Length of the matched token in bytes.
	pub(crate) length: usize,
}

#[derive(Default)]
struct TrieNode {
	children: HashMap<u8, TrieNode>,
	/// `(operation, token)` when this node completes a registered token.
	/// First registration wins, so overlapping registrations resolve to the
	/// earliest producer.
	terminal: Option<(usize, usize)>,
}

/// Multi-pattern token matcher built once per processor from every
/// registered token.
///
/// Matching walks byte-by-byte from the cursor position, pulling more input
/// through the cursor as needed, so a token split across any number of
/// buffer refills is still recognized exactly once. The deepest terminal
/// node reached wins (longest match); among tokens of equal length the
/// earliest registration wins.
pub(crate) struct TokenTrie {
	root: TrieNode,
	/// First-byte membership table consulted before walking the trie.
	starts: [bool; 256],
	max_token_length: usize,
}

impl TokenTrie {
	pub(crate) fn new() -> Self {
		Self {
			root: TrieNode::default(),
			starts: [false; 256],
			max_token_length: 0,
		}
	}

	/// A matcher for a single byte sequence, used by operations that scan
	/// ahead for their own closing marker.
	pub(crate) fn single(bytes: &[u8]) -> Self {
		let mut trie = Self::new();
		if !bytes.is_empty() {
			trie.insert(bytes, 0, 0);
		}
		trie
	}

	/// Register a token owned by `operation` at local index `token`.
	/// Empty tokens are a configuration error.
	pub(crate) fn register(
		&mut self,
		bytes: &[u8],
		operation: usize,
		token: usize,
	) -> StencilResult<()> {
		if bytes.is_empty() {
			return Err(StencilError::EmptyToken);
		}
		self.insert(bytes, operation, token);
		Ok(())
	}

	fn insert(&mut self, bytes: &[u8], operation: usize, token: usize) {
		let mut node = &mut self.root;
		for &byte in bytes {
			node = node.children.entry(byte).or_default();
		}
		if node.terminal.is_none() {
			node.terminal = Some((operation, token));
		}
		self.starts[usize::from(bytes[0])] = true;
		self.max_token_length = self.max_token_length.max(bytes.len());
	}

	/// Cheap rejection test: could any registered token start with `byte`?
	pub(crate) fn may_start(&self, byte: u8) -> bool {
		self.starts[usize::from(byte)]
	}

	pub(crate) fn max_token_length(&self) -> usize {
		self.max_token_length
	}

	/// Attempt a match at the cursor position without consuming anything.
	///
	/// The walk keeps going while a longer token is still possible, peeking
	/// further into the stream (which may refill the cursor several times for
	/// a torn token), and reports the longest confirmed token, if any.
	pub(crate) fn try_match<R: Read>(
		&self,
		cursor: &mut StreamCursor<R>,
	) -> StencilResult<Option<TokenMatch>> {
		let mut node = &self.root;
		let mut best = None;
		let mut depth = 0;

		loop {
			let Some(byte) = cursor.peek_at(depth)? else {
				break;
			};
			let Some(next) = node.children.get(&byte) else {
				break;
			};
			node = next;
			depth += 1;
			if let Some((operation, token)) = node.terminal {
				best = Some(TokenMatch {
					operation,
					token,
					length: depth,
				});
			}
		}

		Ok(best)
	}
}
