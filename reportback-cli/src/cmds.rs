#[derive(clap::Parser, Debug)]
pub struct Root {
	/// Port to listen on for report messages.
	#[arg(short, long, default_value_t = 8060)]
	pub port: u16,

	/// Exit after the first delivered report, using its exit code as our own.
	#[arg(long)]
	pub once: bool,
}
