/*!
# Event filters

Filters sit between the [`Lexer`](crate::Lexer) and a builder. Each filter
is a link in a chain: it forwards every event to the next collaborator,
possibly acting on some of them on the way.
*/
use std::error;
use std::fmt;

use log::{debug, trace};

use crate::attr::{is_space, trim};
use crate::listener::{Attribute, BoxError, Listener, ListenerResult};

const LOG_TARGET: &str = "squarelex::filters";

/// A [`Listener`] which is also told about the document encoding.
pub trait BuildingListener: Listener {
	/// Handle an encoding declaration found in the document.
	fn handle_encoding(&mut self, encoding: &str) -> ListenerResult;
}

impl<B: BuildingListener + ?Sized> BuildingListener for &mut B {
	fn handle_encoding(&mut self, encoding: &str) -> ListenerResult {
		(**self).handle_encoding(encoding)
	}
}

/// An event reached a filter which has no builder to forward it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unbound;

impl fmt::Display for Unbound {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str("event filter is not bound to a builder")
	}
}

impl error::Error for Unbound {}

/**
# Forwarding filter link

Forwards every event unchanged to its builder. The builder can be replaced
or removed at any time; events arriving while no builder is bound fail
with [`Unbound`].
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter<B> {
	builder: Option<B>,
}

impl<B> EventFilter<B> {
	pub fn new(builder: B) -> EventFilter<B> {
		EventFilter{
			builder: Some(builder),
		}
	}

	/// Create a filter without a builder.
	pub fn unbound() -> EventFilter<B> {
		EventFilter{
			builder: None,
		}
	}

	pub fn builder(&self) -> Option<&B> {
		self.builder.as_ref()
	}

	pub fn builder_mut(&mut self) -> Option<&mut B> {
		self.builder.as_mut()
	}

	/// Bind a new builder and return the previous one.
	pub fn set_builder(&mut self, builder: B) -> Option<B> {
		self.builder.replace(builder)
	}

	/// Unbind the builder and return it.
	pub fn clear_builder(&mut self) -> Option<B> {
		self.builder.take()
	}

	pub fn into_builder(self) -> Option<B> {
		self.builder
	}

	fn next(&mut self) -> Result<&mut B, BoxError> {
		match self.builder.as_mut() {
			Some(b) => Ok(b),
			None => {
				debug!(target: LOG_TARGET, "event reached an unbound filter");
				Err(Box::new(Unbound))
			},
		}
	}
}

impl<B> Default for EventFilter<B> {
	fn default() -> Self {
		Self::unbound()
	}
}

impl<B: Listener> Listener for EventFilter<B> {
	fn handle_text(&mut self, data: &[u8]) -> ListenerResult {
		self.next()?.handle_text(data)
	}

	fn handle_escape(&mut self, escaped: u8, data: &[u8]) -> ListenerResult {
		self.next()?.handle_escape(escaped, data)
	}

	fn handle_starttag(&mut self, name: &[u8], attrs: &[Attribute<'_>], closed: bool, data: &[u8]) -> ListenerResult {
		self.next()?.handle_starttag(name, attrs, closed, data)
	}

	fn handle_endtag(&mut self, name: &[u8], data: &[u8]) -> ListenerResult {
		self.next()?.handle_endtag(name, data)
	}

	fn handle_comment(&mut self, data: &[u8]) -> ListenerResult {
		self.next()?.handle_comment(data)
	}

	fn handle_pi(&mut self, data: &[u8]) -> ListenerResult {
		self.next()?.handle_pi(data)
	}
}

impl<B: BuildingListener> BuildingListener for EventFilter<B> {
	fn handle_encoding(&mut self, encoding: &str) -> ListenerResult {
		self.next()?.handle_encoding(encoding)
	}
}

/// Extract the encoding name from an encoding declaration.
///
/// Accepts `[? encoding NAME ?]` and `[? encoding = NAME ?]`, with any
/// amount of whitespace around the parts.
pub fn detect_encoding(pi: &[u8]) -> Option<&str> {
	const KEYWORD: &[u8] = b"encoding";
	let inner = pi.strip_prefix(b"[?")?.strip_suffix(b"?]")?;
	let rest = trim(inner).strip_prefix(KEYWORD)?;
	let separated = match rest.first() {
		Some(b'=') => true,
		Some(b) => is_space(*b),
		None => false,
	};
	if !separated {
		return None
	}
	let mut rest = trim(rest);
	if let Some(after_eq) = rest.strip_prefix(b"=") {
		rest = trim(after_eq);
	}
	if rest.is_empty() || rest.iter().any(|b| is_space(*b)) {
		return None
	}
	std::str::from_utf8(rest).ok()
}

/**
# Encoding declaration filter

Watches processing instructions for encoding declarations
(`[? encoding NAME ?]`). For each one, the builder first receives
[`BuildingListener::handle_encoding()`] and then the processing
instruction itself. All other events pass unchanged.

# Example

```
use squarelex::Lexer;
use squarelex::filters::{BuildingListener, EncodingDetectFilter};
use squarelex::listener::{Attribute, Listener, ListenerResult};

#[derive(Default)]
struct Charset(Option<String>);

impl Listener for Charset {
	fn handle_text(&mut self, _: &[u8]) -> ListenerResult { Ok(()) }
	fn handle_escape(&mut self, _: u8, _: &[u8]) -> ListenerResult { Ok(()) }
	fn handle_starttag(&mut self, _: &[u8], _: &[Attribute<'_>], _: bool, _: &[u8]) -> ListenerResult { Ok(()) }
	fn handle_endtag(&mut self, _: &[u8], _: &[u8]) -> ListenerResult { Ok(()) }
	fn handle_comment(&mut self, _: &[u8]) -> ListenerResult { Ok(()) }
	fn handle_pi(&mut self, _: &[u8]) -> ListenerResult { Ok(()) }
}

impl BuildingListener for Charset {
	fn handle_encoding(&mut self, encoding: &str) -> ListenerResult {
		self.0 = Some(encoding.to_string());
		Ok(())
	}
}

let mut lexer = Lexer::new(EncodingDetectFilter::new(Charset::default()));
lexer.feed("[? encoding latin-1 ?]text").unwrap();
lexer.finalize().unwrap();
let charset = lexer.into_listener().into_builder().unwrap();
assert_eq!(charset.0.as_deref(), Some("latin-1"));
```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingDetectFilter<B> {
	link: EventFilter<B>,
}

impl<B> EncodingDetectFilter<B> {
	pub fn new(builder: B) -> EncodingDetectFilter<B> {
		EncodingDetectFilter{
			link: EventFilter::new(builder),
		}
	}

	/// The link to the builder, for rebinding.
	pub fn link(&self) -> &EventFilter<B> {
		&self.link
	}

	pub fn link_mut(&mut self) -> &mut EventFilter<B> {
		&mut self.link
	}

	pub fn builder(&self) -> Option<&B> {
		self.link.builder()
	}

	pub fn into_builder(self) -> Option<B> {
		self.link.into_builder()
	}
}

impl<B: BuildingListener> Listener for EncodingDetectFilter<B> {
	fn handle_text(&mut self, data: &[u8]) -> ListenerResult {
		self.link.handle_text(data)
	}

	fn handle_escape(&mut self, escaped: u8, data: &[u8]) -> ListenerResult {
		self.link.handle_escape(escaped, data)
	}

	fn handle_starttag(&mut self, name: &[u8], attrs: &[Attribute<'_>], closed: bool, data: &[u8]) -> ListenerResult {
		self.link.handle_starttag(name, attrs, closed, data)
	}

	fn handle_endtag(&mut self, name: &[u8], data: &[u8]) -> ListenerResult {
		self.link.handle_endtag(name, data)
	}

	fn handle_comment(&mut self, data: &[u8]) -> ListenerResult {
		self.link.handle_comment(data)
	}

	fn handle_pi(&mut self, data: &[u8]) -> ListenerResult {
		if let Some(encoding) = detect_encoding(data) {
			trace!(target: LOG_TARGET, "encoding declaration: {:?}", encoding);
			self.link.handle_encoding(encoding)?;
		}
		self.link.handle_pi(data)
	}
}

impl<B: BuildingListener> BuildingListener for EncodingDetectFilter<B> {
	fn handle_encoding(&mut self, encoding: &str) -> ListenerResult {
		self.link.handle_encoding(encoding)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::error::Error;
	use crate::lexer::Lexer;

	#[derive(Debug, Clone, PartialEq, Eq)]
	enum Call {
		Text(Vec<u8>),
		Escape(u8, Vec<u8>),
		StartTag(Vec<u8>, usize, bool),
		EndTag(Vec<u8>),
		Comment(Vec<u8>),
		Pi(Vec<u8>),
		Encoding(String),
	}

	#[derive(Debug, Default)]
	struct Recorder {
		calls: Vec<Call>,
	}

	impl Listener for Recorder {
		fn handle_text(&mut self, data: &[u8]) -> ListenerResult {
			self.calls.push(Call::Text(data.to_vec()));
			Ok(())
		}

		fn handle_escape(&mut self, escaped: u8, data: &[u8]) -> ListenerResult {
			self.calls.push(Call::Escape(escaped, data.to_vec()));
			Ok(())
		}

		fn handle_starttag(&mut self, name: &[u8], attrs: &[Attribute<'_>], closed: bool, _data: &[u8]) -> ListenerResult {
			self.calls.push(Call::StartTag(name.to_vec(), attrs.len(), closed));
			Ok(())
		}

		fn handle_endtag(&mut self, name: &[u8], _data: &[u8]) -> ListenerResult {
			self.calls.push(Call::EndTag(name.to_vec()));
			Ok(())
		}

		fn handle_comment(&mut self, data: &[u8]) -> ListenerResult {
			self.calls.push(Call::Comment(data.to_vec()));
			Ok(())
		}

		fn handle_pi(&mut self, data: &[u8]) -> ListenerResult {
			self.calls.push(Call::Pi(data.to_vec()));
			Ok(())
		}
	}

	impl BuildingListener for Recorder {
		fn handle_encoding(&mut self, encoding: &str) -> ListenerResult {
			self.calls.push(Call::Encoding(encoding.to_string()));
			Ok(())
		}
	}

	fn pi(s: &str) -> Call {
		Call::Pi(s.as_bytes().to_vec())
	}

	#[test]
	fn encoding_filter_starts_without_calls() {
		let f = EncodingDetectFilter::new(Recorder::default());
		assert!(f.builder().unwrap().calls.is_empty());
	}

	#[test]
	fn encoding_filter_reports_encoding_before_pi() {
		let mut f = EncodingDetectFilter::new(Recorder::default());
		f.handle_pi(b"doh").unwrap();
		f.handle_pi(b"[? encoding latin-1 ?]").unwrap();
		f.handle_pi(b"[? encoding = utf-8 ?]").unwrap();
		assert_eq!(f.builder().unwrap().calls, vec![
			pi("doh"),
			Call::Encoding("latin-1".to_string()),
			pi("[? encoding latin-1 ?]"),
			Call::Encoding("utf-8".to_string()),
			pi("[? encoding = utf-8 ?]"),
		]);
	}

	#[test]
	fn encoding_filter_forwards_everything_else() {
		let mut f = EncodingDetectFilter::new(Recorder::default());
		f.handle_text(b"t").unwrap();
		f.handle_escape(b'[', b"[]").unwrap();
		f.handle_starttag(b"a", &[Attribute::new(b"x", None)], true, b"[[a x]]").unwrap();
		f.handle_endtag(b"a", b"[/a]").unwrap();
		f.handle_comment(b"[##]").unwrap();
		assert_eq!(f.into_builder().unwrap().calls, vec![
			Call::Text(b"t".to_vec()),
			Call::Escape(b'[', b"[]".to_vec()),
			Call::StartTag(b"a".to_vec(), 1, true),
			Call::EndTag(b"a".to_vec()),
			Call::Comment(b"[##]".to_vec()),
		]);
	}

	#[test]
	fn detect_encoding_variants() {
		assert_eq!(detect_encoding(b"[? encoding latin-1 ?]"), Some("latin-1"));
		assert_eq!(detect_encoding(b"[?encoding=utf-8?]"), Some("utf-8"));
		assert_eq!(detect_encoding(b"[?\tencoding\n=\nus-ascii ?]"), Some("us-ascii"));
		assert_eq!(detect_encoding(b"[? encoding ?]"), None);
		assert_eq!(detect_encoding(b"[? encodingutf-8 ?]"), None);
		assert_eq!(detect_encoding(b"[? encoding utf 8 ?]"), None);
		assert_eq!(detect_encoding(b"[? version 1 ?]"), None);
		assert_eq!(detect_encoding(b"doh"), None);
		assert_eq!(detect_encoding(b"[? encoding \xff ?]"), None);
	}

	#[test]
	fn unbound_filter_fails() {
		let mut f: EventFilter<Recorder> = EventFilter::unbound();
		let err = f.handle_text(b"x").unwrap_err();
		assert!(err.downcast_ref::<Unbound>().is_some());
	}

	#[test]
	fn filter_can_be_rebound() {
		let mut f = EventFilter::new(Recorder::default());
		f.handle_text(b"a").unwrap();
		let first = f.clear_builder().unwrap();
		assert!(f.builder().is_none());
		assert!(f.handle_text(b"b").is_err());
		assert!(f.set_builder(Recorder::default()).is_none());
		f.handle_text(b"c").unwrap();
		assert_eq!(first.calls, vec![Call::Text(b"a".to_vec())]);
		assert_eq!(f.builder().unwrap().calls, vec![Call::Text(b"c".to_vec())]);
	}

	#[test]
	fn unbound_filter_error_leaves_lexer_token_buffered() {
		let mut filter = EncodingDetectFilter::new(Recorder::default());
		filter.link_mut().clear_builder();
		let mut lexer = Lexer::new(filter);
		match lexer.feed("[? encoding utf-8 ?]") {
			Err(Error::Listener(e)) => assert!(e.downcast_ref::<Unbound>().is_some()),
			other => panic!("unexpected result: {:?}", other),
		}
		assert_eq!(lexer.buffered(), b"[? encoding utf-8 ?]");
		lexer.listener_mut().link_mut().set_builder(Recorder::default());
		lexer.finalize().unwrap();
		assert_eq!(lexer.into_listener().into_builder().unwrap().calls, vec![
			Call::Encoding("utf-8".to_string()),
			pi("[? encoding utf-8 ?]"),
		]);
	}

	#[test]
	fn chained_filters_forward_through_every_link() {
		let inner = EncodingDetectFilter::new(Recorder::default());
		let mut lexer = Lexer::new(EventFilter::new(inner));
		lexer.feed("x[?encoding=latin-1?]").unwrap();
		lexer.finalize().unwrap();
		let recorder = lexer.into_listener().into_builder().unwrap().into_builder().unwrap();
		assert_eq!(recorder.calls, vec![
			Call::Text(b"x".to_vec()),
			Call::Encoding("latin-1".to_string()),
			pi("[?encoding=latin-1?]"),
		]);
	}
}
