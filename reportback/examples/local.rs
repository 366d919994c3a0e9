use reportback::{Relay, RunReport};

fn main() {
	let relay = Relay::new();
	relay.set_listener(|stdout, stderr, exit_code| {
		print!("{stdout}");
		eprint!("{stderr}");
		println!("exited with {exit_code}");
	});

	relay.deliver(RunReport::new("Hello, World!\n", "", 0));
}
