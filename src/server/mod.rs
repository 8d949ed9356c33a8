// Server module entry
// Listener setup, bounded accept loop, connection serving and shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

// Re-export common types
pub use listener::create_listener;
pub use server_loop::Server;
pub use signal::{start_signal_handler, Shutdown};
