/*!
# Feed buffer

The owned byte buffer which sits between [`Lexer::feed`](crate::Lexer::feed)
and the state machine.
*/
use bytes::{Buf, BytesMut};

use crate::position::{Position, PositionTracker};

/**
# Append-and-consume byte buffer

Holds exactly the unconsumed suffix of everything which has been pushed so
far. Data is appended at the back and dropped from the front once the lexer
has handed it to its listener; bytes are never re-read after they have been
consumed.

Consuming is cheap: [`BytesMut`] only moves its start pointer, and the
space is reclaimed the next time the buffer needs to grow.
*/
pub struct FeedBuffer {
	buf: BytesMut,
	tracker: PositionTracker,
}

impl FeedBuffer {
	pub fn new() -> FeedBuffer {
		FeedBuffer{
			buf: BytesMut::new(),
			tracker: PositionTracker::new(),
		}
	}

	/// Append bytes at the back of the buffer.
	pub fn push(&mut self, data: &[u8]) {
		self.buf.extend_from_slice(data);
	}

	/// Reserve room for at least `additional` more bytes.
	pub fn reserve(&mut self, additional: usize) {
		self.buf.reserve(additional);
	}

	/// Mutable access to the backing buffer for appending, e.g. by an
	/// encoder.
	///
	/// Callers must only append.
	pub(crate) fn tail_mut(&mut self) -> &mut BytesMut {
		&mut self.buf
	}

	/// Drop `n` bytes from the front.
	///
	/// # Panics
	///
	/// If `n` exceeds [`FeedBuffer::len()`].
	pub fn consume(&mut self, n: usize) {
		assert!(n <= self.buf.len(), "attempt to consume beyond end of buffer");
		self.tracker.advance(&self.buf[..n]);
		self.buf.advance(n);
	}

	/// The unconsumed bytes.
	pub fn as_slice(&self) -> &[u8] {
		&self.buf[..]
	}

	/// Number of unconsumed bytes.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Total number of bytes consumed over the lifetime of the buffer.
	pub fn consumed(&self) -> usize {
		self.tracker.offset()
	}

	/// Position of the first unconsumed byte.
	pub fn position(&self) -> Position {
		self.tracker.position()
	}

	/// Release unused capacity.
	pub fn release_temporaries(&mut self) {
		if self.buf.is_empty() {
			self.buf = BytesMut::new();
		}
	}
}

impl Default for FeedBuffer {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn feedbuffer_len_grows_with_pushes() {
		let mut fb = FeedBuffer::new();
		assert_eq!(fb.len(), 0);
		assert!(fb.is_empty());
		fb.push(b"foo");
		assert_eq!(fb.len(), 3);
		fb.push(b"bar");
		assert_eq!(fb.len(), 6);
		fb.push(b"2342");
		assert_eq!(fb.len(), 10);
		assert_eq!(fb.as_slice(), b"foobar2342");
	}

	#[test]
	fn feedbuffer_consume_drops_prefix() {
		let mut fb = FeedBuffer::new();
		fb.push(b"foo");
		fb.push(b"bar");
		fb.consume(4);
		assert_eq!(fb.as_slice(), b"ar");
		assert_eq!(fb.consumed(), 4);
		fb.push(b"baz");
		assert_eq!(fb.as_slice(), b"arbaz");
		fb.consume(5);
		assert!(fb.is_empty());
		assert_eq!(fb.consumed(), 9);
	}

	#[test]
	fn feedbuffer_tracks_position_of_front() {
		let mut fb = FeedBuffer::new();
		fb.push(b"ab\ncd[x");
		fb.consume(5);
		assert_eq!(fb.position(), Position::new(5, 2, 2));
	}

	#[test]
	#[should_panic(expected = "attempt to consume beyond end of buffer")]
	fn feedbuffer_rejects_overconsumption() {
		let mut fb = FeedBuffer::new();
		fb.push(b"ab");
		fb.consume(3);
	}
}
