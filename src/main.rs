use cratestats_graph::{App, init_logging, listener};
use leptos::mount::mount_to_body;

fn main() {
	init_logging();
	if let Err(err) = listener::start() {
		log::error!("render listener not started: {}", err);
	}
	mount_to_body(App);
}
