use std::process::exit;

use clap::error::ErrorKind;
use clap::Parser;

use reportback::{inbox, Completion, Relay};

mod cmds;
mod errors;

use errors::*;

#[tokio::main]
async fn main() {
	let result = main2().await;

	// Report bytes may still sit in the stdout buffer, and exit() won't
	// flush them.
	let _ = std::io::Write::flush(&mut std::io::stdout());

	match result {
		Ok(code) => exit(code),
		Err(e) => {
			eprintln!("{e}");
			exit(e.code());
		}
	}
}

async fn main2() -> Result<i32, Error> {
	let cli = match cmds::Root::try_parse() {
		Ok(arguments) => arguments,
		Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
			print!("{e}");
			return Ok(0);
		}
		Err(e) => return Err(Error::InvalidArguments { cause: Box::new(e) }),
	};

	// The listener surfaces the report where a person can see it: report
	// stdout to our stdout, report stderr to our stderr.  The exit code
	// goes back to this task so `--once` can adopt it.
	let relay = Relay::new();
	let (code_sender, mut code_recv) = tokio::sync::mpsc::channel(32);
	relay.set_listener(move |stdout, stderr, exit_code| {
		print!("{stdout}");
		eprint!("{stderr}");
		let _ = code_sender.try_send(exit_code);
	});

	let mut inbox = inbox::listen(cli.port, relay)
		.await
		.map_err(|e| Error::InboxSetup { cause: Box::new(e) })?;
	eprintln!("[reportback] listening on {}", inbox.local_addr());

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {
				inbox.shutdown();
				return Ok(0);
			}
			completion = inbox.next_completion() => match completion {
				Some(Completion::Dispatched) if cli.once => {
					inbox.shutdown();
					// The listener forwards the code before the completion
					// signal fires, so this cannot wait.
					let code = code_recv
						.recv()
						.await
						.expect("dispatched report did not forward an exit code");
					return Ok(code);
				}
				Some(Completion::Dispatched) => {
					let _ = code_recv.try_recv();
				}
				Some(Completion::Discarded) => {}
				None => return Ok(0),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verify_cli() {
		use clap::CommandFactory;
		cmds::Root::command().debug_assert()
	}
}
