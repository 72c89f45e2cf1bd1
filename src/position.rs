/*!
# Stream positions

Mapping of consumed byte counts to line/column pairs for diagnostics.
*/
use std::fmt;

use memchr::{memchr_iter, memrchr};

/// Location of a byte in the input stream.
///
/// Lines are 1-based, columns are 0-based byte columns which restart after
/// each `\n`. A `\r` is counted as an ordinary byte.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
	offset: usize,
	line: usize,
	column: usize,
}

impl Position {
	/// The position of the very first byte of a stream.
	pub const START: Position = Position{
		offset: 0,
		line: 1,
		column: 0,
	};

	pub const fn new(offset: usize, line: usize, column: usize) -> Position {
		Position{offset, line, column}
	}

	/// Number of bytes preceding this position in the stream.
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// 1-based line number.
	pub fn line(&self) -> usize {
		self.line
	}

	/// 0-based byte column within the line.
	pub fn column(&self) -> usize {
		self.column
	}
}

impl Default for Position {
	fn default() -> Self {
		Self::START
	}
}

impl fmt::Display for Position {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "line {}, column {} (byte {})", self.line, self.column, self.offset)
	}
}

/// Running position of the front of a buffer which is drained from the
/// front.
///
/// Drained bytes are gone once the lexer dropped them, so the tracker folds
/// every drained prefix in as it goes. Only line breaks are counted; the
/// actual [`Position`] is only built when somebody asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionTracker {
	offset: usize,
	lines: usize,
	line_start: usize,
}

impl PositionTracker {
	pub fn new() -> PositionTracker {
		PositionTracker{
			offset: 0,
			lines: 0,
			line_start: 0,
		}
	}

	/// Account for `consumed`, which directly follows all bytes passed to
	/// previous calls.
	pub fn advance(&mut self, consumed: &[u8]) {
		if let Some(last) = memrchr(b'\n', consumed) {
			self.lines += memchr_iter(b'\n', consumed).count();
			self.line_start = self.offset + last + 1;
		}
		self.offset += consumed.len();
	}

	/// Total number of bytes accounted for.
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Position of the next (not yet consumed) byte.
	pub fn position(&self) -> Position {
		Position{
			offset: self.offset,
			line: self.lines + 1,
			column: self.offset - self.line_start,
		}
	}
}

impl Default for PositionTracker {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tracker_starts_at_line_one_column_zero() {
		let t = PositionTracker::new();
		assert_eq!(t.position(), Position::START);
	}

	#[test]
	fn tracker_counts_columns_within_a_line() {
		let mut t = PositionTracker::new();
		t.advance(b"hello");
		assert_eq!(t.position(), Position::new(5, 1, 5));
	}

	#[test]
	fn tracker_restarts_column_after_newline() {
		let mut t = PositionTracker::new();
		t.advance(b"foo\nba");
		assert_eq!(t.position(), Position::new(6, 2, 2));
	}

	#[test]
	fn tracker_is_independent_of_chunking() {
		let data = b"a\nbc\n\nd\r\nef";
		let mut whole = PositionTracker::new();
		whole.advance(&data[..]);
		let mut bytewise = PositionTracker::new();
		for b in data.chunks(1) {
			bytewise.advance(b);
		}
		assert_eq!(whole.position(), bytewise.position());
		assert_eq!(whole.position(), Position::new(11, 5, 2));
	}

	#[test]
	fn tracker_handles_trailing_newline() {
		let mut t = PositionTracker::new();
		t.advance(b"xy\n");
		assert_eq!(t.position(), Position::new(3, 2, 0));
	}

	#[test]
	fn position_display() {
		assert_eq!(Position::new(12, 3, 4).to_string(), "line 3, column 4 (byte 12)");
	}
}
