/*!
# Asynchronous driver

Feed a [`Lexer`] from a [`tokio::io::AsyncBufRead`].
*/
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::Result;
use crate::lexer::Lexer;
use crate::listener::Listener;

/**
Feed everything `r` yields into `lexer`, then finalize it.

This is the asynchronous counterpart of
[`lex_read()`](crate::driver::lex_read): instead of blocking, the task
yields whenever `r` has no data available. Listener callbacks still run
synchronously within the task.

## Example

```
use squarelex::{Lexer, TokenCollector};
use squarelex::future::lex_async_read;
# tokio_test::block_on(async {
let mut lexer = Lexer::new(TokenCollector::new());
lex_async_read(&mut lexer, &b"[[br]] [? encoding utf-8 ?]"[..]).await.unwrap();
assert_eq!(lexer.listener().tokens().len(), 3);
# })
```
*/
pub async fn lex_async_read<L: Listener, R: AsyncBufRead + Unpin>(lexer: &mut Lexer<L>, mut r: R) -> Result<()> {
	loop {
		let buf = match r.fill_buf().await {
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
