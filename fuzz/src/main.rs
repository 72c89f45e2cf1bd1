#[macro_use]
extern crate afl;
extern crate squarelex;

use squarelex::{merge_text, Implementation, Lexer, LexerOptions, Token, TokenCollector};

fn lex_chunked(imp: Implementation, chunks: &[&[u8]]) -> (Vec<Token>, squarelex::Result<()>) {
	let mut lexer = Lexer::with_options(
		TokenCollector::new(),
		LexerOptions::default().implementation(imp),
	).unwrap();

	for chunk in chunks {
		if let Err(e) = lexer.feed(*chunk) {
			return (lexer.into_listener().into_tokens(), Err(e))
		}
	}

	let result = lexer.finalize();
	(lexer.into_listener().into_tokens(), result)
}

fn main() {
    fuzz!(|data: &[u8]| {
		// NUL bytes separate the chunks
		let chunks: Vec<&[u8]> = data.split(|b| *b == b'\0').collect();
		let buf = chunks.concat();

		let (whole, whole_result) = lex_chunked(Implementation::Native, &[&buf[..]]);
		let (native, native_result) = lex_chunked(Implementation::Native, &chunks);
		let (reference, reference_result) = lex_chunked(Implementation::Reference, &chunks);

		if native != reference || native_result != reference_result {
			panic!("events depend on the implementation")
		}
		if native_result != whole_result {
			panic!("error state depends on chunking")
		}
		if merge_text(native) != merge_text(whole) {
			panic!("events depend on chunking")
		}
    });
}
