/*!
# Error types

This module holds the error types returned by the various functions of this
crate.
*/
use std::error;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::sync::Arc;

use smartstring::alias::String as SmartString;

use crate::lexer::State;
use crate::position::Position;

/// The input ended in the middle of a token.
///
/// Returned by [`Lexer::finalize()`](crate::Lexer::finalize) if the buffer
/// could not be fully consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EofError {
	state: State,
	position: Position,
}

impl EofError {
	pub(crate) fn new(state: State, position: Position) -> EofError {
		EofError{state, position}
	}

	/// The state the lexer was stuck in.
	pub fn state(&self) -> State {
		self.state
	}

	/// Position of the first byte of the unconsumed remainder.
	pub fn position(&self) -> Position {
		self.position
	}
}

impl fmt::Display for EofError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "unfinished lexer state '{}' at {}", self.state.name(), self.position)
	}
}

impl error::Error for EofError {}

/// [`std::sync::Arc`]-based around [`std::io::Error`] to allow cloning.
#[derive(Clone)]
pub struct IOErrorWrapper(Arc<io::Error>);

impl IOErrorWrapper {
	fn wrap(e: io::Error) -> IOErrorWrapper {
		IOErrorWrapper(Arc::new(e))
	}
}

impl fmt::Debug for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl fmt::Display for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&**self, f)
	}
}

impl PartialEq for IOErrorWrapper {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Deref for IOErrorWrapper {
	type Target = io::Error;

	fn deref(&self) -> &io::Error {
		&*self.0
	}
}

/// Boxed error as returned by a [`Listener`](crate::Listener).
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// Shareable wrapper around an error raised by a listener.
///
/// The original error is kept untouched and is reachable via
/// [`ListenerError::get_ref()`], [`ListenerError::downcast_ref()`] and
/// [`std::error::Error::source()`].
#[derive(Clone)]
pub struct ListenerError(Arc<dyn error::Error + Send + Sync + 'static>);

impl ListenerError {
	fn wrap(e: BoxError) -> ListenerError {
		ListenerError(Arc::from(e))
	}

	/// The error as returned by the listener.
	pub fn get_ref(&self) -> &(dyn error::Error + Send + Sync + 'static) {
		&*self.0
	}

	/// Attempt to downcast to the concrete error type the listener returned.
	pub fn downcast_ref<T: error::Error + 'static>(&self) -> Option<&T> {
		self.0.downcast_ref::<T>()
	}
}

impl fmt::Debug for ListenerError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl fmt::Display for ListenerError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&*self.0, f)
	}
}

impl PartialEq for ListenerError {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

/// Error types which may be returned from the lexer and its drivers.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
	/// [`Lexer::finalize()`](crate::Lexer::finalize) was called while a
	/// token was incomplete.
	///
	/// The lexer is not finalized by this; feeding the missing data and
	/// finalizing again is possible.
	Eof(EofError),

	/// The lexer was used after it had been finalized.
	///
	/// This is returned on every call once the lexer is in
	/// [`State::Final`].
	Finalized,

	/// The configured encoding label is not known.
	UnknownEncoding(SmartString),

	/// A text chunk contained a character which cannot be represented in
	/// the configured encoding.
	Unencodable{
		encoding: &'static str,
		ch: char,
	},

	/// The listener failed while handling an event.
	///
	/// The token which caused the event has not been consumed.
	Listener(ListenerError),

	/// An I/O error was encountered while reading input for the lexer.
	IO(IOErrorWrapper),
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub fn io(e: io::Error) -> Error {
		Error::IO(IOErrorWrapper::wrap(e))
	}

	pub fn listener(e: BoxError) -> Error {
		Error::Listener(ListenerError::wrap(e))
	}

	/// Whether this error is caused by operating the lexer in a state which
	/// does not permit the operation.
	pub fn is_state_error(&self) -> bool {
		matches!(self, Error::Finalized)
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::io(e)
	}
}

impl From<EofError> for Error {
	fn from(e: EofError) -> Error {
		Error::Eof(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::Eof(e) => fmt::Display::fmt(e, f),
			Error::Finalized => f.write_str("the lexer was already finalized"),
			Error::UnknownEncoding(label) => write!(f, "unknown encoding: {:?}", label.as_str()),
			Error::Unencodable{encoding, ch} => write!(f, "U+{:04X} cannot be encoded in {}", *ch as u32, encoding),
			Error::Listener(e) => write!(f, "listener error: {}", e),
			Error::IO(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::Eof(e) => Some(e),
			Error::IO(e) => Some(&**e),
			Error::Listener(e) => Some(e.get_ref()),
			Error::Finalized
			| Error::UnknownEncoding(_)
			| Error::Unencodable{..} => None,
		}
	}
}
