/*!
# Start tag interiors

Splitting of the text between the brackets of a start tag into the tag name
and its attributes.

Whitespace in this module is ASCII whitespace: space, `\t`, `\n`, `\x0b`,
`\x0c` and `\r`.
*/
use crate::listener::Attribute;

#[inline]
pub(crate) fn is_space(b: u8) -> bool {
	matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Index of the first non-whitespace byte at or after `from`, or the length
/// of `data`.
#[inline]
fn skip_space(data: &[u8], from: usize) -> usize {
	let mut i = from;
	while i < data.len() && is_space(data[i]) {
		i += 1;
	}
	i
}

/// Remove leading and trailing whitespace.
pub fn trim(data: &[u8]) -> &[u8] {
	let start = skip_space(data, 0);
	let mut end = data.len();
	while end > start && is_space(data[end - 1]) {
		end -= 1;
	}
	&data[start..end]
}

/// Find the end of a quoted string starting at `at`.
///
/// `data[at]` must be the opening quote. Inside, a backslash escapes any
/// following byte. Returns the index just past the closing quote, or `None`
/// if the string is not terminated within `data`.
pub(crate) fn quoted_end(data: &[u8], at: usize) -> Option<usize> {
	let quote = data[at];
	let mut i = at + 1;
	while i < data.len() {
		match data[i] {
			b'\\' => i += 2,
			b if b == quote => return Some(i + 1),
			_ => i += 1,
		}
	}
	None
}

/// Name and attribute material of a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHead<'a> {
	/// Tag name; empty for nameless tags.
	pub name: &'a [u8],
	/// The part of the interior which holds attributes, if any.
	pub attributes: Option<&'a [u8]>,
}

/**
Split a start tag interior into name and attribute material.

The interior is split at its first run of whitespace. If the first word
contains a `=`, the tag is considered nameless and the whole interior is
attribute material. Returns `None` if the interior consists of whitespace
only; such a tag is not a tag at all.

# Example

```
use squarelex::attr::split_interior;
let head = split_interior(b"mytag a=b c").unwrap();
assert_eq!(head.name, b"mytag");
assert_eq!(head.attributes, Some(&b"a=b c"[..]));

let head = split_interior(b"unnamed=Foo").unwrap();
assert_eq!(head.name, b"");
assert_eq!(head.attributes, Some(&b"unnamed=Foo"[..]));

assert!(split_interior(b"  ").is_none());
```
*/
pub fn split_interior(interior: &[u8]) -> Option<TagHead<'_>> {
	let start = skip_space(interior, 0);
	if start == interior.len() {
		return None
	}
	let mut head_end = start;
	while head_end < interior.len() && !is_space(interior[head_end]) {
		head_end += 1;
	}
	let head = &interior[start..head_end];
	if head.contains(&b'=') {
		return Some(TagHead{
			name: b"",
			attributes: Some(interior),
		})
	}
	let rest = skip_space(interior, head_end);
	Some(TagHead{
		name: head,
		attributes: if rest < interior.len() {
			Some(&interior[rest..])
		} else {
			None
		},
	})
}

/**
Tokenize attribute material into `(name, value)` pairs and append them to
`into`, in order of appearance.

Each attribute is a name (anything up to whitespace, `=` or `]`), optionally
followed by `=` and a value. A value is either a double- or single-quoted
string in which a backslash escapes any byte (leading whitespace allowed),
or a run of bytes up to whitespace, `\` or `]`. Quotes are kept. A name
without `=` has no value; `=` followed by nothing has an empty one.

Tokenizing stops at the first position where neither a name nor a `=` can
be found, so it always terminates, even on malformed input.

# Example

```
use squarelex::attr::tokenize_attributes;
let mut attrs = Vec::new();
tokenize_attributes(b"aname=\"foo\" name2 x=", &mut attrs);
assert_eq!(attrs.len(), 3);
assert_eq!(attrs[0].value(), Some(&b"\"foo\""[..]));
assert_eq!(attrs[1].value(), None);
assert_eq!(attrs[2].value(), Some(&b""[..]));
```
*/
pub fn tokenize_attributes<'a>(data: &'a [u8], into: &mut Vec<Attribute<'a>>) {
	let mut pos = 0;
	loop {
		let name_start = skip_space(data, pos);
		let mut i = name_start;
		while i < data.len() && !is_space(data[i]) && data[i] != b'=' && data[i] != b']' {
			i += 1;
		}
		let name = &data[name_start..i];
		i = skip_space(data, i);

		let value = if i < data.len() && data[i] == b'=' {
			let value_start = i + 1;
			let q = skip_space(data, value_start);
			let quoted = match data.get(q) {
				Some(b'"') | Some(b'\'') => quoted_end(data, q),
				_ => None,
			};
			let value_end = match quoted {
				Some(end) => end,
				None => {
					let mut j = value_start;
					while j < data.len() && !is_space(data[j]) && data[j] != b'\\' && data[j] != b']' {
						j += 1;
					}
					j
				},
			};
			i = value_end;
			Some(trim(&data[value_start..value_end]))
		} else {
			None
		};

		if name.is_empty() && value.is_none() {
			break
		}
		into.push(Attribute::new(name, value));
		pos = i;
	}
}
