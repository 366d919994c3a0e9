use std::net::Ipv6Addr;

use reportback::inbox::encode_report;
use reportback::RunReport;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

// Pushes one report at a host listening on the default reportback-cli port.
// Start `reportback-cli` in another terminal first.
#[tokio::main]
async fn main() {
	let report = RunReport::new("Hello, World!\n", "", 0);

	let mut connection = TcpStream::connect((Ipv6Addr::LOCALHOST, 8060))
		.await
		.expect("failed to connect (is reportback-cli running?)");
	connection
		.write_all(&encode_report(&report))
		.await
		.expect("failed to send report");
}
