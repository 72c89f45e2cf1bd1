/*!
# Byte scanners

The byte-level searches the lexer states are built on. There are two
implementations which must agree on every input: a reference one which
walks the grammar byte by byte, and a native one built on [`memchr`].
*/
use memchr::{memchr, memchr2, memchr3, memmem};

use crate::attr::quoted_end;

/// Byte searches needed by the lexer states.
///
/// All searches return `None` if the buffer does not (yet) contain a match.
pub trait Scan {
	/// Index of the first `needle` in `hay`.
	fn find_byte(&self, hay: &[u8], needle: u8) -> Option<usize>;

	/// Index of the first `first` at or after `from` which is directly
	/// followed by `second`.
	fn find_pair(&self, hay: &[u8], from: usize, first: u8, second: u8) -> Option<usize>;

	/// Index of the `]` which terminates a start tag interior beginning at
	/// `from`.
	///
	/// Quoted strings (`"..."`, `'...'`, with backslash escapes) are
	/// skipped. Outside of them, a `\` or `[` before the `]` means that the
	/// interior can never be terminated; this returns `None` for those, too.
	fn tag_interior_end(&self, hay: &[u8], from: usize) -> Option<usize>;
}

/// Which [`Scan`] implementation a lexer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Implementation {
	/// Portable byte-at-a-time scanning.
	Reference,
	/// `memchr`-accelerated scanning.
	Native,
}

impl Implementation {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Reference => "reference",
			Self::Native => "native",
		}
	}

	pub(crate) fn scanner(&self) -> &'static dyn Scan {
		match self {
			Self::Reference => &REFERENCE,
			Self::Native => &NATIVE,
		}
	}
}

impl Default for Implementation {
	fn default() -> Self {
		Self::Native
	}
}

static REFERENCE: ReferenceScan = ReferenceScan;
static NATIVE: NativeScan = NativeScan;

pub struct ReferenceScan;

impl Scan for ReferenceScan {
	fn find_byte(&self, hay: &[u8], needle: u8) -> Option<usize> {
		hay.iter().position(|b| *b == needle)
	}

	fn find_pair(&self, hay: &[u8], from: usize, first: u8, second: u8) -> Option<usize> {
		let mut i = from;
		while i + 1 < hay.len() {
			if hay[i] == first && hay[i + 1] == second {
				return Some(i)
			}
			i += 1;
		}
		None
	}

	fn tag_interior_end(&self, hay: &[u8], from: usize) -> Option<usize> {
		let mut i = from;
		while i < hay.len() {
			match hay[i] {
				b']' => return Some(i),
				b'\\' | b'[' => return None,
				b'"' | b'\'' => i = quoted_end(hay, i)?,
				_ => i += 1,
			}
		}
		None
	}
}

pub struct NativeScan;

impl NativeScan {
	fn quoted_end(hay: &[u8], at: usize) -> Option<usize> {
		let quote = hay[at];
		let mut i = at + 1;
		loop {
			let off = memchr2(quote, b'\\', hay.get(i..)?)?;
			let found = i + off;
			if hay[found] == quote {
				return Some(found + 1)
			}
			i = found + 2;
		}
	}
}

impl Scan for NativeScan {
	fn find_byte(&self, hay: &[u8], needle: u8) -> Option<usize> {
		memchr(needle, hay)
	}

	fn find_pair(&self, hay: &[u8], from: usize, first: u8, second: u8) -> Option<usize> {
		let tail = hay.get(from..)?;
		memmem::find(tail, &[first, second]).map(|off| from + off)
	}

	fn tag_interior_end(&self, hay: &[u8], from: usize) -> Option<usize> {
		let mut i = from;
		loop {
			let rest = hay.get(i..)?;
			let off = memchr3(b']', b'"', b'\'', rest)?;
			if memchr2(b'[', b'\\', &rest[..off]).is_some() {
				return None
			}
			let at = i + off;
			if hay[at] == b']' {
				return Some(at)
			}
			i = Self::quoted_end(hay, at)?;
		}
	}
}
