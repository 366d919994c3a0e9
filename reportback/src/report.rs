use serde::{Deserialize, Serialize};

/// Exit status carried by a report whose producer did not include one.
///
/// This is a convention with the producing side, not something we can detect:
/// a real process can also exit -1 (which the OS wraps to 255 anyway).
pub const EXIT_CODE_UNKNOWN: i32 = -1;

/// RunReport is the message shuttled from whatever ran a command back to the
/// party that asked for it: both captured output streams, plus the exit code.
///
/// Producers may leave any field out of the wire form entirely.  Parsing
/// fills the gaps (empty strings, [`EXIT_CODE_UNKNOWN`]), so a listener never
/// observes a missing field.  The wire keys are `stdout`, `stderr` and
/// `exitCode`; unknown extra keys are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunReport {
	pub stdout: String,
	pub stderr: String,
	#[serde(rename = "exitCode")]
	pub exit_code: i32,
}

impl Default for RunReport {
	fn default() -> Self {
		RunReport {
			stdout: String::new(),
			stderr: String::new(),
			exit_code: EXIT_CODE_UNKNOWN,
		}
	}
}

impl RunReport {
	pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
		RunReport {
			stdout: stdout.into(),
			stderr: stderr.into(),
			exit_code,
		}
	}
}
