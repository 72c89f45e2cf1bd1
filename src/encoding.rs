/*!
# Text encodings

Conversion of text chunks into the bytes the lexer operates on. Byte chunks
bypass this entirely.
*/
use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};

/// A text encoding which can be used to feed text into a lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
	/// UTF-8. Every `&str` is already valid UTF-8, so this is a plain copy.
	Utf8,
	/// 7-bit US-ASCII.
	Ascii,
	/// ISO-8859-1, i.e. the first 256 Unicode code points.
	Latin1,
}

impl Encoding {
	/// Resolve an encoding label.
	///
	/// Matching is ASCII case-insensitive and ignores surrounding
	/// whitespace.
	///
	/// # Example
	///
	/// ```
	/// use squarelex::Encoding;
	/// assert_eq!(Encoding::for_label("ISO-8859-1").unwrap(), Encoding::Latin1);
	/// assert!(Encoding::for_label("klingon").is_err());
	/// ```
	pub fn for_label(label: &str) -> Result<Encoding> {
		let norm = label.trim().to_ascii_lowercase();
		match norm.as_str() {
			"utf-8" | "utf8" | "unicode-1-1-utf-8" => Ok(Encoding::Utf8),
			"ascii" | "us-ascii" | "ansi_x3.4-1968" => Ok(Encoding::Ascii),
			"latin-1" | "latin1" | "l1" | "iso-8859-1" | "iso8859-1" | "iso_8859-1" => Ok(Encoding::Latin1),
			_ => Err(Error::UnknownEncoding(label.into())),
		}
	}

	/// Canonical name of the encoding.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Utf8 => "utf-8",
			Self::Ascii => "us-ascii",
			Self::Latin1 => "iso-8859-1",
		}
	}

	fn limit(&self) -> u32 {
		match self {
			Self::Utf8 => 0x10ffff,
			Self::Ascii => 0x7f,
			Self::Latin1 => 0xff,
		}
	}

	/// Encode `text` and append the result to `into`.
	///
	/// Either the whole text is appended or, if it contains a character
	/// which cannot be represented, nothing is.
	pub fn encode_into(&self, text: &str, into: &mut BytesMut) -> Result<()> {
		match self {
			Self::Utf8 => {
				into.extend_from_slice(text.as_bytes());
				Ok(())
			},
			Self::Ascii | Self::Latin1 => {
				let limit = self.limit();
				if let Some(ch) = text.chars().find(|ch| *ch as u32 > limit) {
					return Err(Error::Unencodable{
						encoding: self.name(),
						ch,
					})
				}
				into.reserve(text.len());
				for ch in text.chars() {
					into.put_u8(ch as u32 as u8);
				}
				Ok(())
			},
		}
	}
}

impl Default for Encoding {
	fn default() -> Self {
		Self::Utf8
	}
}

impl fmt::Display for Encoding {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}
