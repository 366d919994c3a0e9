type ErrorCause = Box<dyn ::std::error::Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	// Reserved for argument parse failures; nothing below the CLI layer
	// should construct this.
	#[error("invalid arguments: {cause}")]
	InvalidArguments { cause: ErrorCause },

	/// The inbox socket could not be set up (port taken, no permission).
	#[error("failed to start inbox: {cause}")]
	InboxSetup { cause: ErrorCause },
}

impl Error {
	pub fn code(&self) -> i32 {
		match self {
			Error::InvalidArguments { .. } => 1,
			Error::InboxSetup { .. } => 4,
		}
	}
}
