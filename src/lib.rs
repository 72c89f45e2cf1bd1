/*!
# Streaming lexer for bracket template markup

This crate provides an incremental lexer for a bracket-delimited template
markup language:

| Construct | Example |
|---|---|
| start tag | `[tag attr="v" flag]` |
| self-closing start tag | `[[tag attr='v']]` |
| end tag | `[/tag]` |
| comment | `[# anything #]` |
| processing instruction | `[? encoding utf-8 ?]` |
| escape | `[]` |
| text | everything else |

## Features (some call them restrictions)

* Streamed lexing: input may be split anywhere, tokens are reported as soon
  as they are complete
* Events are borrowed slices of the lexer's buffer, no copying
* Every event carries its raw byte span; all spans together are the input
* No well-formedness checks: unbalanced tags are not detected
* No unquoting or unescaping of attribute values
* Two interchangeable scanner implementations, see [`Implementation`]
* Tokio-based asynchronicity supported via the `async` feature and
  [`future::lex_async_read()`].

## Example

```
use squarelex::{Lexer, Token, TokenCollector};
let mut lexer = Lexer::new(TokenCollector::new());
lexer.feed("[[img src=\"a.png\"]] and [b]bo").unwrap();
lexer.feed("ld[/b]").unwrap();
lexer.finalize().unwrap();
for tok in lexer.listener().tokens() {
	println!("got token: {:?}", tok);
}
match &lexer.listener().tokens()[0] {
	Token::StartTag{name, attrs, self_closing, ..} => {
		assert_eq!(&name[..], b"img");
		assert_eq!(attrs.len(), 1);
		assert!(*self_closing);
	},
	other => panic!("unexpected token: {:?}", other),
}
```

## High-level usage

### Push-based usage

Create a [`Lexer`] around a [`Listener`] and call [`Lexer::feed()`] with
pieces of input as they arrive. When there is no more input, call
[`Lexer::finalize()`].

### Pull-based usage

To lex everything a [`std::io::BufRead`] yields, use
[`driver::lex_read()`].

### Usage with Tokio

Tokio is supported with the `async` feature, which offers
[`future::lex_async_read()`] for [`tokio::io::AsyncBufRead`] sources.
*/
pub mod attr;
pub mod buffer;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod filters;
pub mod lexer;
pub mod listener;
pub mod position;
#[cfg(feature = "async")]
pub mod future;


#[doc(inline)]
pub use error::{EofError, Error, Result};
#[doc(inline)]
pub use lexer::{Chunk, Implementation, Lexer, LexerOptions, State};
#[doc(inline)]
pub use listener::{merge_text, Attribute, Listener, Token, TokenCollector};
pub use buffer::FeedBuffer;
pub use encoding::Encoding;
pub use position::Position;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
