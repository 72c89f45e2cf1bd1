/*!
# Blocking driver

Feed a [`Lexer`] from a [`std::io::BufRead`].
*/
use std::io;

use crate::error::Result;
use crate::lexer::Lexer;
use crate::listener::Listener;

/**
Feed everything `r` yields into `lexer`, then finalize it.

Each chunk returned by [`BufRead::fill_buf()`](io::BufRead::fill_buf) is
fed as bytes. Interrupted reads are retried; any other I/O error is
returned as [`Error::IO`](crate::Error::IO) and leaves the lexer
unfinalized.

# Example

```
use squarelex::{Lexer, TokenCollector};
use squarelex::driver::lex_read;
let mut lexer = Lexer::new(TokenCollector::new());
lex_read(&mut lexer, &b"[a]text[/a]"[..]).unwrap();
assert_eq!(lexer.listener().tokens().len(), 3);
```
*/
pub fn lex_read<L: Listener, R: io::BufRead>(lexer: &mut Lexer<L>, mut r: R) -> Result<()> {
	loop {
		let buf = match r.fill_buf() {
			Ok(buf) => buf,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e.into()),
		};
		if buf.is_empty() {
			break
		}
		let n = buf.len();
		lexer.feed(buf)?;
		r.consume(n);
	}
	lexer.finalize()
}
