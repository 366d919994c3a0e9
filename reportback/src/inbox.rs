use std::net::{Ipv6Addr, SocketAddr};

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;

use crate::{Completion, Error, Relay, Result, RunReport};

const BUFFER_SIZE: usize = 4096;
const BUFFER_MIN_READ_SIZE: usize = 1024;
const BUFFER_MAX_SIZE: usize = 65536;

/// Handle onto a listening inbox, returned by [`listen`].
///
/// The handle is the hosting environment's side of the relay: it observes
/// one [`Completion`] per delivery through [`Inbox::next_completion`] and
/// decides when the whole thing gets torn down ([`Inbox::shutdown`]).
/// Dropping the handle shuts the inbox down as well.
pub struct Inbox {
	local_addr: SocketAddr,
	completions: Receiver<Completion>,
	cancel: CancellationToken,
}

/// Serves report messages to `relay` from a TCP socket on `port`.
///
/// The wire form is zero-byte-delimited JSON: each frame is one object with
/// the keys `stdout`, `stderr` and `exitCode`, any of which may be absent
/// (see [`RunReport`]).  Every parsed frame becomes one `relay.deliver`
/// call, in the order the frames arrived on their connection.  A connection
/// that sends a frame we cannot parse, or a frame larger than the buffer
/// cap, is dropped; later connections are unaffected.
///
/// Pass port 0 to bind an ephemeral port and read it back from
/// [`Inbox::local_addr`].
pub async fn listen(port: u16, relay: Relay) -> Result<Inbox> {
	let listener = TcpListener::bind((Ipv6Addr::UNSPECIFIED, port))
		.await
		.map_err(|error| Error::Bind {
			cause: Box::new(error),
		})?;
	let local_addr = listener.local_addr().map_err(|error| Error::Bind {
		cause: Box::new(error),
	})?;

	let (completions, completions_recv) = mpsc::channel(32);
	let cancel = CancellationToken::new();

	let accept_cancel = cancel.clone();
	tokio::spawn(async move {
		loop {
			tokio::select! {
				_ = accept_cancel.cancelled() => break,
				connection = listener.accept() => {
					let stream = match connection {
						Ok((stream, _)) => stream,
						Err(error) => {
							eprintln!("[inbox] error: failed to accept sender: {error}");
							continue;
						}
					};

					tokio::spawn(feed_relay(
						stream,
						relay.clone(),
						completions.clone(),
						accept_cancel.clone(),
					));
				}
			}
		}
	});

	Ok(Inbox {
		local_addr,
		completions: completions_recv,
		cancel,
	})
}

impl Inbox {
	/// The address the inbox is bound to.
	pub fn local_addr(&self) -> SocketAddr {
		self.local_addr
	}

	/// Waits for the completion signal of the next delivery.
	///
	/// Returns `None` once the inbox has shut down and all signals have been
	/// drained.  Signals arrive in delivery order and are never dropped, so a
	/// host that holds the handle should keep polling this (or drop the whole
	/// `Inbox`): a backlog of unconsumed signals eventually applies
	/// backpressure to the connection readers.
	pub async fn next_completion(&mut self) -> Option<Completion> {
		self.completions.recv().await
	}

	/// Stops the accept loop and all connection readers.
	pub fn shutdown(&self) {
		self.cancel.cancel();
	}
}

impl Drop for Inbox {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

async fn feed_relay(
	mut stream: TcpStream,
	relay: Relay,
	completions: Sender<Completion>,
	cancel: CancellationToken,
) {
	let mut buffer = Vec::with_capacity(BUFFER_SIZE);
	let mut size = 0;
	loop {
		if buffer.capacity() - size < BUFFER_MIN_READ_SIZE
			&& buffer.capacity() + BUFFER_SIZE <= BUFFER_MAX_SIZE
		{
			buffer.reserve(BUFFER_SIZE)
		}

		if size >= buffer.capacity() {
			eprintln!("[inbox] error: report message exceeds buffer limit");
			return;
		}

		let n = tokio::select! {
			_ = cancel.cancelled() => return,
			read = stream.read_buf(&mut buffer) => match read {
				// Senders are expected to close once they have said their piece.
				Ok(0) => return,
				Ok(n) => n,
				Err(error) => {
					eprintln!("[inbox] error: failed to receive report: {error}");
					return;
				}
			},
		};

		let mut start = 0;
		for i in size..(size + n) {
			if buffer[i] == b'\0' {
				let report = match decode_report(&buffer[start..i]) {
					Ok(report) => report,
					Err(error) => {
						eprintln!("[inbox] error: {error}");
						return;
					}
				};
				start = i + 1;

				let completion = relay.deliver(report);
				// The host may have stopped watching; deliveries go on
				// regardless.  Teardown still has to reach a reader parked
				// here on a full signal backlog.
				tokio::select! {
					_ = cancel.cancelled() => return,
					_ = completions.send(completion) => {}
				}
			}
		}

		size += n;
		if start > 0 {
			buffer.drain(..start);
			size -= start;
		}
	}
}

/// Parses one wire frame (without its trailing delimiter) into a report.
pub fn decode_report(frame: &[u8]) -> Result<RunReport> {
	serde_json::from_slice(frame).map_err(|error| Error::Parse {
		cause: Box::new(error),
	})
}

/// Serializes `report` into its wire form: JSON plus the zero-byte delimiter.
pub fn encode_report(report: &RunReport) -> Vec<u8> {
	let mut bytes = serde_json::to_vec(report).expect("failed to serialize report");
	bytes.push(0);
	bytes
}
