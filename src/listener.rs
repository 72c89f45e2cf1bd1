/*!
# Event listeners

The [`Listener`] trait is the contract between the [`Lexer`](crate::Lexer)
and whatever consumes its events, usually a template tree builder.

Events carry slices borrowed from the lexer's buffer; a listener which needs
to keep the data must copy it. [`Token`] and [`TokenCollector`] provide an
owned representation for that purpose.
*/
use std::fmt;

use bytes::{Bytes, BytesMut};

pub use crate::error::BoxError;

/// Result type of all listener callbacks.
///
/// A failure is passed on verbatim to the caller of
/// [`Lexer::feed()`](crate::Lexer::feed) or
/// [`Lexer::finalize()`](crate::Lexer::finalize), wrapped in
/// [`Error::Listener`](crate::Error::Listener).
pub type ListenerResult = Result<(), BoxError>;

/// A single attribute of a start tag, as found in the raw markup.
///
/// Quotes around the value are kept; unquoting and unescaping is the job of
/// a decoder.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Attribute<'a> {
	name: &'a [u8],
	value: Option<&'a [u8]>,
}

impl<'a> Attribute<'a> {
	pub fn new(name: &'a [u8], value: Option<&'a [u8]>) -> Attribute<'a> {
		Attribute{name, value}
	}

	pub fn name(&self) -> &'a [u8] {
		self.name
	}

	/// The raw value, or `None` if the attribute was given without `=`.
	pub fn value(&self) -> Option<&'a [u8]> {
		self.value
	}
}

impl fmt::Debug for Attribute<'_> {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.debug_tuple("Attribute")
			.field(&Bytes::copy_from_slice(self.name))
			.field(&self.value.map(Bytes::copy_from_slice))
			.finish()
	}
}

/**
# Receiver of lexer events

Each callback corresponds to one recognized token. The `data` argument
always holds the exact raw byte span of the token, so concatenating the
`data` of all events yields the original input.

Callbacks are invoked synchronously from within
[`Lexer::feed()`](crate::Lexer::feed) and
[`Lexer::finalize()`](crate::Lexer::finalize).
*/
pub trait Listener {
	/// Handle a run of literal text.
	fn handle_text(&mut self, data: &[u8]) -> ListenerResult;

	/// Handle an escape sequence (`[]`).
	///
	/// `escaped` is the escaped byte (not unescaped, despite the name),
	/// `data` the full escape sequence.
	fn handle_escape(&mut self, escaped: u8, data: &[u8]) -> ListenerResult;

	/// Handle a start tag (`[name ...]`).
	///
	/// `name` is empty for nameless tags. `closed` is true for self-closing
	/// tags (`[[name ...]]`) which need no end tag.
	fn handle_starttag(&mut self, name: &[u8], attrs: &[Attribute<'_>], closed: bool, data: &[u8]) -> ListenerResult;

	/// Handle an end tag (`[/name]`).
	///
	/// `name` has surrounding whitespace removed and may be empty.
	fn handle_endtag(&mut self, name: &[u8], data: &[u8]) -> ListenerResult;

	/// Handle a comment (`[# ... #]`).
	fn handle_comment(&mut self, data: &[u8]) -> ListenerResult;

	/// Handle a processing instruction (`[? ... ?]`).
	fn handle_pi(&mut self, data: &[u8]) -> ListenerResult;
}

impl<L: Listener + ?Sized> Listener for &mut L {
	fn handle_text(&mut self, data: &[u8]) -> ListenerResult {
		(**self).handle_text(data)
	}

	fn handle_escape(&mut self, escaped: u8, data: &[u8]) -> ListenerResult {
		(**self).handle_escape(escaped, data)
	}

	fn handle_starttag(&mut self, name: &[u8], attrs: &[Attribute<'_>], closed: bool, data: &[u8]) -> ListenerResult {
		(**self).handle_starttag(name, attrs, closed, data)
	}

	fn handle_endtag(&mut self, name: &[u8], data: &[u8]) -> ListenerResult {
		(**self).handle_endtag(name, data)
	}

	fn handle_comment(&mut self, data: &[u8]) -> ListenerResult {
		(**self).handle_comment(data)
	}

	fn handle_pi(&mut self, data: &[u8]) -> ListenerResult {
		(**self).handle_pi(data)
	}
}

impl<L: Listener + ?Sized> Listener for Box<L> {
	fn handle_text(&mut self, data: &[u8]) -> ListenerResult {
		(**self).handle_text(data)
	}

	fn handle_escape(&mut self, escaped: u8, data: &[u8]) -> ListenerResult {
		(**self).handle_escape(escaped, data)
	}

	fn handle_starttag(&mut self, name: &[u8], attrs: &[Attribute<'_>], closed: bool, data: &[u8]) -> ListenerResult {
		(**self).handle_starttag(name, attrs, closed, data)
	}

	fn handle_endtag(&mut self, name: &[u8], data: &[u8]) -> ListenerResult {
		(**self).handle_endtag(name, data)
	}

	fn handle_comment(&mut self, data: &[u8]) -> ListenerResult {
		(**self).handle_comment(data)
	}

	fn handle_pi(&mut self, data: &[u8]) -> ListenerResult {
		(**self).handle_pi(data)
	}
}

/**
A single token, owned

Owned counterpart of the [`Listener`] callbacks. Every variant carries the
raw byte span it was derived from.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
	/// Literal text.
	Text(Bytes),

	/// An escape sequence.
	Escape{
		escaped: u8,
		raw: Bytes,
	},

	/// A start tag.
	///
	/// Attribute values are `None` for attributes given without `=`.
	StartTag{
		name: Bytes,
		attrs: Vec<(Bytes, Option<Bytes>)>,
		self_closing: bool,
		raw: Bytes,
	},

	/// An end tag.
	EndTag{
		name: Bytes,
		raw: Bytes,
	},

	/// A comment, including its delimiters.
	Comment(Bytes),

	/// A processing instruction, including its delimiters.
	ProcessingInstruction(Bytes),
}

impl Token {
	pub const NAME_TEXT: &'static str = "Text";
	pub const NAME_ESCAPE: &'static str = "Escape";
	pub const NAME_STARTTAG: &'static str = "StartTag";
	pub const NAME_ENDTAG: &'static str = "EndTag";
	pub const NAME_COMMENT: &'static str = "Comment";
	pub const NAME_PI: &'static str = "ProcessingInstruction";

	/// Return a static string describing the token type.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Text(..) => Self::NAME_TEXT,
			Self::Escape{..} => Self::NAME_ESCAPE,
			Self::StartTag{..} => Self::NAME_STARTTAG,
			Self::EndTag{..} => Self::NAME_ENDTAG,
			Self::Comment(..) => Self::NAME_COMMENT,
			Self::ProcessingInstruction(..) => Self::NAME_PI,
		}
	}

	/// The exact consumed byte span.
	pub fn raw(&self) -> &Bytes {
		match self {
			Self::Text(raw) => raw,
			Self::Escape{raw, ..} => raw,
			Self::StartTag{raw, ..} => raw,
			Self::EndTag{raw, ..} => raw,
			Self::Comment(raw) => raw,
			Self::ProcessingInstruction(raw) => raw,
		}
	}
}

/// Merge adjacent [`Token::Text`] entries.
///
/// How text is split into events depends on how the input was chunked;
/// everything else does not. Comparing merged token streams therefore
/// compares what was lexed, independent of the chunking.
pub fn merge_text<I: IntoIterator<Item = Token>>(tokens: I) -> Vec<Token> {
	let mut out: Vec<Token> = Vec::new();
	let mut pending: Option<BytesMut> = None;
	for tok in tokens {
		match tok {
			Token::Text(data) => match pending.as_mut() {
				Some(buf) => buf.extend_from_slice(&data),
				None => pending = Some(BytesMut::from(&data[..])),
			},
			other => {
				if let Some(buf) = pending.take() {
					out.push(Token::Text(buf.freeze()));
				}
				out.push(other);
			},
		}
	}
	if let Some(buf) = pending.take() {
		out.push(Token::Text(buf.freeze()));
	}
	out
}

/// Listener which records every event as a [`Token`].
#[derive(Debug, Clone, Default)]
pub struct TokenCollector {
	tokens: Vec<Token>,
}

impl TokenCollector {
	pub fn new() -> TokenCollector {
		TokenCollector{
			tokens: Vec::new(),
		}
	}

	pub fn tokens(&self) -> &[Token] {
		&self.tokens
	}

	pub fn into_tokens(self) -> Vec<Token> {
		self.tokens
	}
}

impl Listener for TokenCollector {
	fn handle_text(&mut self, data: &[u8]) -> ListenerResult {
		self.tokens.push(Token::Text(Bytes::copy_from_slice(data)));
		Ok(())
	}

	fn handle_escape(&mut self, escaped: u8, data: &[u8]) -> ListenerResult {
		self.tokens.push(Token::Escape{
			escaped,
			raw: Bytes::copy_from_slice(data),
		});
		Ok(())
	}

	fn handle_starttag(&mut self, name: &[u8], attrs: &[Attribute<'_>], closed: bool, data: &[u8]) -> ListenerResult {
		self.tokens.push(Token::StartTag{
			name: Bytes::copy_from_slice(name),
			attrs: attrs.iter().map(|attr| (
				Bytes::copy_from_slice(attr.name()),
				attr.value().map(Bytes::copy_from_slice),
			)).collect(),
			self_closing: closed,
			raw: Bytes::copy_from_slice(data),
		});
		Ok(())
	}

	fn handle_endtag(&mut self, name: &[u8], data: &[u8]) -> ListenerResult {
		self.tokens.push(Token::EndTag{
			name: Bytes::copy_from_slice(name),
			raw: Bytes::copy_from_slice(data),
		});
		Ok(())
	}

	fn handle_comment(&mut self, data: &[u8]) -> ListenerResult {
		self.tokens.push(Token::Comment(Bytes::copy_from_slice(data)));
		Ok(())
	}

	fn handle_pi(&mut self, data: &[u8]) -> ListenerResult {
		self.tokens.push(Token::ProcessingInstruction(Bytes::copy_from_slice(data)));
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn text(s: &'static [u8]) -> Token {
		Token::Text(Bytes::from_static(s))
	}

	#[test]
	fn merge_text_joins_adjacent_text() {
		let merged = merge_text(vec![
			text(b"ab"),
			text(b"cd"),
			Token::Comment(Bytes::from_static(b"[##]")),
			text(b"e"),
			text(b"f"),
		]);
		assert_eq!(merged, vec![
			text(b"abcd"),
			Token::Comment(Bytes::from_static(b"[##]")),
			text(b"ef"),
		]);
	}

	#[test]
	fn merge_text_keeps_non_text_untouched() {
		let toks = vec![
			Token::Escape{escaped: b'[', raw: Bytes::from_static(b"[]")},
			Token::Escape{escaped: b'[', raw: Bytes::from_static(b"[]")},
		];
		assert_eq!(merge_text(toks.clone()), toks);
	}

	#[test]
	fn collector_records_owned_tokens() {
		let mut c = TokenCollector::new();
		let attrs = [Attribute::new(b"a", Some(&b"'x'"[..])), Attribute::new(b"b", None)];
		c.handle_starttag(b"t", &attrs[..], false, b"[t a='x' b]").unwrap();
		c.handle_endtag(b"t", b"[/t]").unwrap();
		assert_eq!(c.tokens(), &[
			Token::StartTag{
				name: Bytes::from_static(b"t"),
				attrs: vec![
					(Bytes::from_static(b"a"), Some(Bytes::from_static(b"'x'"))),
					(Bytes::from_static(b"b"), None),
				],
				self_closing: false,
				raw: Bytes::from_static(b"[t a='x' b]"),
			},
			Token::EndTag{
				name: Bytes::from_static(b"t"),
				raw: Bytes::from_static(b"[/t]"),
			},
		][..]);
	}

	#[test]
	fn token_raw_returns_span() {
		let tok = Token::ProcessingInstruction(Bytes::from_static(b"[? x ?]"));
		assert_eq!(&tok.raw()[..], b"[? x ?]");
		assert_eq!(tok.name(), "ProcessingInstruction");
	}
}
