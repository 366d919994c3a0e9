pub type Result<T> = std::result::Result<T, Error>;

type ErrorCause = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// Returned by [`crate::inbox::listen`] when the socket cannot be bound.
	#[error("failed to bind inbox socket: {cause}")]
	Bind { cause: ErrorCause },

	/// A wire frame that did not parse as a report message.  The connection
	/// that sent it gets dropped; the relay never sees the frame.
	#[error("failed to parse report message: {cause}")]
	Parse { cause: ErrorCause },
}
