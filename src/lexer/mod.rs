/*!
# Incremental markup lexer

The [`Lexer`] turns a stream of arbitrarily split chunks into listener
events. It buffers only the yet unrecognized tail of the input; each
recognized token is passed to the listener as a slice of that buffer and
dropped afterwards.
*/
use std::fmt;

use bytes::Bytes;
use log::{debug, trace};
use smartstring::alias::String as SmartString;

use crate::attr;
use crate::buffer::FeedBuffer;
use crate::encoding::Encoding;
use crate::error::{EofError, Error, Result};
use crate::listener::{Attribute, Listener};
use crate::position::Position;

mod scan;

pub use scan::Implementation;
use scan::Scan;

const LOG_TARGET: &str = "squarelex::lexer";

/// State of the lexer automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
	/// Literal text; looking for the next `[`.
	Text,
	/// A `[` has been seen; the next byte decides what follows.
	Markup,
	/// Inside a start tag, `[name ...]` or `[[name ...]]`.
	StartTag,
	/// Inside an end tag, `[/name]`.
	EndTag,
	/// Inside a comment, `[# ... #]`.
	Comment,
	/// Inside a processing instruction, `[? ... ?]`.
	Pi,
	/// The lexer has been finalized.
	Final,
}

impl State {
	/// Diagnostic name of the state.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Text => "TEXT",
			Self::Markup => "MARKUP",
			Self::StartTag => "STARTTAG",
			Self::EndTag => "ENDTAG",
			Self::Comment => "COMMENT",
			Self::Pi => "PI",
			Self::Final => "FINAL",
		}
	}
}

impl fmt::Display for State {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Configuration of a [`Lexer`].
#[derive(Debug, Clone, PartialEq)]
pub struct LexerOptions {
	/// Label of the encoding used for text chunks.
	pub encoding: SmartString,
	/// Scanner implementation.
	pub implementation: Implementation,
}

impl LexerOptions {
	pub fn defaults() -> LexerOptions {
		LexerOptions{
			encoding: "utf-8".into(),
			implementation: Implementation::Native,
		}
	}

	pub fn encoding(mut self, label: &str) -> LexerOptions {
		self.encoding = label.into();
		self
	}

	pub fn implementation(mut self, v: Implementation) -> LexerOptions {
		self.implementation = v;
		self
	}
}

impl Default for LexerOptions {
	fn default() -> Self {
		Self::defaults()
	}
}

/// A piece of input for [`Lexer::feed()`].
///
/// Text is encoded using the lexer's encoding before it is buffered; bytes
/// are buffered as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
	Text(&'a str),
	Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for Chunk<'a> {
	fn from(other: &'a str) -> Self {
		Self::Text(other)
	}
}

impl<'a> From<&'a String> for Chunk<'a> {
	fn from(other: &'a String) -> Self {
		Self::Text(other.as_str())
	}
}

impl<'a> From<&'a [u8]> for Chunk<'a> {
	fn from(other: &'a [u8]) -> Self {
		Self::Bytes(other)
	}
}

impl<'a> From<&'a Vec<u8>> for Chunk<'a> {
	fn from(other: &'a Vec<u8>) -> Self {
		Self::Bytes(&other[..])
	}
}

impl<'a, const N: usize> From<&'a [u8; N]> for Chunk<'a> {
	fn from(other: &'a [u8; N]) -> Self {
		Self::Bytes(&other[..])
	}
}

impl<'a> From<&'a Bytes> for Chunk<'a> {
	fn from(other: &'a Bytes) -> Self {
		Self::Bytes(&other[..])
	}
}

/// Outcome of a single state handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
	/// A prefix was consumed or the state changed.
	Progressed,
	/// More input is needed; nothing was changed.
	Awaiting,
}

/// A start tag matched at the front of the buffer.
struct StartTagMatch {
	/// Length of the raw tag.
	len: usize,
	interior_start: usize,
	interior_end: usize,
	closed: bool,
}

fn match_start_tag(scan: &dyn Scan, data: &[u8]) -> Option<StartTagMatch> {
	if data.get(1) == Some(&b'[') {
		let end = scan.tag_interior_end(data, 2)?;
		if data.get(end + 1) != Some(&b']') {
			return None
		}
		Some(StartTagMatch{
			len: end + 2,
			interior_start: 2,
			interior_end: end,
			closed: true,
		})
	} else {
		let end = scan.tag_interior_end(data, 1)?;
		Some(StartTagMatch{
			len: end + 1,
			interior_start: 1,
			interior_end: end,
			closed: false,
		})
	}
}

/**
# Streaming lexer for bracket markup

Feed input with [`Lexer::feed()`] in chunks of any size; the lexer reports
tokens to its [`Listener`] as soon as they are complete. When the input is
over, [`Lexer::finalize()`] must be called: it flushes what is left and
reports an error if the input ended inside a token.

Text runs are flushed at the end of every chunk, so how text is split into
events depends on the chunking. All other events do not.

# Example

```
use squarelex::{Lexer, Token, TokenCollector};
let mut lexer = Lexer::new(TokenCollector::new());
lexer.feed("Hello [b]wor").unwrap();
lexer.feed("ld[/b][]").unwrap();
lexer.finalize().unwrap();
let tokens = lexer.into_listener().into_tokens();
assert_eq!(tokens.len(), 6);
assert_eq!(tokens[1].name(), Token::NAME_STARTTAG);
assert_eq!(tokens[5].name(), Token::NAME_ESCAPE);
```
*/
pub struct Lexer<L> {
	listener: L,
	state: State,
	buffer: FeedBuffer,
	encoding: Encoding,
	encoding_label: SmartString,
	implementation: Implementation,
	scan: &'static dyn Scan,
}

impl<L: Listener> Lexer<L> {
	/// Create a lexer with default options: UTF-8 text and the native
	/// scanner.
	pub fn new(listener: L) -> Lexer<L> {
		let opts = LexerOptions::defaults();
		Lexer::build(listener, Encoding::Utf8, opts)
	}

	/// Create a lexer with the given options.
	///
	/// Fails with [`Error::UnknownEncoding`] if the encoding label is not
	/// known.
	pub fn with_options(listener: L, opts: LexerOptions) -> Result<Lexer<L>> {
		let encoding = Encoding::for_label(&opts.encoding)?;
		Ok(Lexer::build(listener, encoding, opts))
	}

	fn build(listener: L, encoding: Encoding, opts: LexerOptions) -> Lexer<L> {
		debug!(
			target: LOG_TARGET,
			"new lexer: encoding {:?} ({}), {} scanner",
			opts.encoding.as_str(), encoding, opts.implementation.name(),
		);
		Lexer{
			listener,
			state: State::Text,
			buffer: FeedBuffer::new(),
			encoding,
			encoding_label: opts.encoding,
			implementation: opts.implementation,
			scan: opts.implementation.scanner(),
		}
	}

	/// Append a chunk of input and process as much of the buffered input as
	/// possible.
	///
	/// Errors from the listener are returned as [`Error::Listener`]; the
	/// token which caused the error stays in the buffer.
	pub fn feed<'c, C: Into<Chunk<'c>>>(&mut self, chunk: C) -> Result<()> {
		if self.state == State::Final {
			return Err(Error::Finalized)
		}
		match chunk.into() {
			Chunk::Text(text) => self.encoding.encode_into(text, self.buffer.tail_mut())?,
			Chunk::Bytes(data) => self.buffer.push(data),
		}
		self.drive()
	}

	/// Signal the end of input.
	///
	/// Processes the buffered input once more. If anything is left after
	/// that, the input ended inside a token and [`Error::Eof`] is returned;
	/// the lexer then stays usable, so the missing input can still be fed.
	/// Otherwise the lexer enters [`State::Final`] and rejects any further
	/// use.
	pub fn finalize(&mut self) -> Result<()> {
		if self.state == State::Final {
			return Err(Error::Finalized)
		}
		self.drive()?;
		if !self.buffer.is_empty() {
			let err = EofError::new(self.state, self.buffer.position());
			debug!(target: LOG_TARGET, "finalize failed: {}", err);
			return Err(err.into())
		}
		debug!(target: LOG_TARGET, "finalized after {} bytes", self.buffer.consumed());
		self.transition(State::Final);
		self.buffer.release_temporaries();
		Ok(())
	}

	fn drive(&mut self) -> Result<()> {
		while !self.buffer.is_empty() {
			if self.step()? == Step::Awaiting {
				break
			}
		}
		Ok(())
	}

	fn step(&mut self) -> Result<Step> {
		match self.state {
			State::Text => self.lex_text(),
			State::Markup => self.lex_markup(),
			State::StartTag => self.lex_starttag(),
			State::EndTag => self.lex_endtag(),
			State::Comment => self.lex_comment(),
			State::Pi => self.lex_pi(),
			State::Final => Err(Error::Finalized),
		}
	}

	fn transition(&mut self, next: State) {
		trace!(target: LOG_TARGET, "{} -> {}", self.state, next);
		self.state = next;
	}

	fn lex_text(&mut self) -> Result<Step> {
		let data = self.buffer.as_slice();
		let end = match self.scan.find_byte(data, b'[') {
			Some(0) => {
				self.transition(State::Markup);
				return Ok(Step::Progressed)
			},
			Some(pos) => pos,
			None => data.len(),
		};
		trace!(target: LOG_TARGET, "text: {} bytes", end);
		self.listener.handle_text(&data[..end]).map_err(Error::listener)?;
		let exhausted = end == data.len();
		self.buffer.consume(end);
		if !exhausted {
			self.transition(State::Markup);
		}
		Ok(Step::Progressed)
	}

	fn lex_markup(&mut self) -> Result<Step> {
		let data = self.buffer.as_slice();
		if data.len() < 2 {
			return Ok(Step::Awaiting)
		}
		let next = match data[1] {
			b'/' => State::EndTag,
			b'#' => State::Comment,
			b'?' => State::Pi,
			b']' => {
				trace!(target: LOG_TARGET, "escape");
				self.listener.handle_escape(data[0], &data[..2]).map_err(Error::listener)?;
				self.buffer.consume(2);
				State::Text
			},
			_ => State::StartTag,
		};
		self.transition(next);
		Ok(Step::Progressed)
	}

	fn lex_starttag(&mut self) -> Result<Step> {
		let data = self.buffer.as_slice();
		let tag = match match_start_tag(self.scan, data) {
			Some(tag) => tag,
			None => return Ok(Step::Awaiting),
		};
		let raw = &data[..tag.len];
		let interior = &data[tag.interior_start..tag.interior_end];
		match attr::split_interior(interior) {
			None => {
				trace!(target: LOG_TARGET, "blank start tag as text: {} bytes", raw.len());
				self.listener.handle_text(raw).map_err(Error::listener)?;
			},
			Some(head) => {
				let mut attrs: Vec<Attribute<'_>> = Vec::new();
				if let Some(material) = head.attributes {
					attr::tokenize_attributes(material, &mut attrs);
				}
				trace!(
					target: LOG_TARGET,
					"start tag: {} bytes, {} attributes, closed={}",
					raw.len(), attrs.len(), tag.closed,
				);
				self.listener.handle_starttag(head.name, &attrs, tag.closed, raw).map_err(Error::listener)?;
			},
		}
		self.buffer.consume(tag.len);
		self.transition(State::Text);
		Ok(Step::Progressed)
	}

	fn lex_endtag(&mut self) -> Result<Step> {
		let data = self.buffer.as_slice();
		let end = match self.scan.find_byte(data, b']') {
			Some(end) => end,
			None => return Ok(Step::Awaiting),
		};
		// the buffer starts with "[/", so the closing bracket is at 2 or later
		debug_assert!(end >= 2);
		trace!(target: LOG_TARGET, "end tag: {} bytes", end + 1);
		let name = attr::trim(&data[2..end]);
		self.listener.handle_endtag(name, &data[..end + 1]).map_err(Error::listener)?;
		self.buffer.consume(end + 1);
		self.transition(State::Text);
		Ok(Step::Progressed)
	}

	fn lex_comment(&mut self) -> Result<Step> {
		let data = self.buffer.as_slice();
		if data.len() < 4 {
			return Ok(Step::Awaiting)
		}
		let end = match self.scan.find_pair(data, 2, b'#', b']') {
			Some(pos) => pos + 2,
			None => return Ok(Step::Awaiting),
		};
		trace!(target: LOG_TARGET, "comment: {} bytes", end);
		self.listener.handle_comment(&data[..end]).map_err(Error::listener)?;
		self.buffer.consume(end);
		self.transition(State::Text);
		Ok(Step::Progressed)
	}

	fn lex_pi(&mut self) -> Result<Step> {
		let data = self.buffer.as_slice();
		let end = match self.scan.find_pair(data, 2, b'?', b']') {
			Some(pos) => pos + 2,
			None => return Ok(Step::Awaiting),
		};
		trace!(target: LOG_TARGET, "processing instruction: {} bytes", end);
		self.listener.handle_pi(&data[..end]).map_err(Error::listener)?;
		self.buffer.consume(end);
		self.transition(State::Text);
		Ok(Step::Progressed)
	}
}

impl<L> Lexer<L> {
	/// Current state.
	pub fn state(&self) -> State {
		self.state
	}

	/// Diagnostic name of the current state, e.g. `"STARTTAG"`.
	pub fn state_name(&self) -> &'static str {
		self.state.name()
	}

	/// The encoding label as configured.
	pub fn encoding(&self) -> &str {
		self.encoding_label.as_str()
	}

	/// The encoding the label resolved to.
	pub fn resolved_encoding(&self) -> Encoding {
		self.encoding
	}

	pub fn implementation(&self) -> Implementation {
		self.implementation
	}

	/// The buffered, not yet recognized input.
	pub fn buffered(&self) -> &[u8] {
		self.buffer.as_slice()
	}

	/// Position of the first buffered byte.
	pub fn position(&self) -> Position {
		self.buffer.position()
	}

	pub fn listener(&self) -> &L {
		&self.listener
	}

	pub fn listener_mut(&mut self) -> &mut L {
		&mut self.listener
	}

	pub fn into_listener(self) -> L {
		self.listener
	}
}

impl<L> fmt::Debug for Lexer<L> {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Lexer")
			.field("state", &self.state)
			.field("encoding", &self.encoding_label.as_str())
			.field("implementation", &self.implementation)
			.field("buffered", &self.buffer.len())
			.field("position", &self.buffer.position())
			.finish()
	}
}
