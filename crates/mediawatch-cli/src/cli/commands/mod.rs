//! CLI command handlers. Each command is in its own file.

mod completions;
mod config;
mod descriptors;
mod probe;
mod watch;

pub use completions::{run_completions, run_man};
pub use config::run_config;
pub use descriptors::run_descriptors;
pub use probe::run_probe;
pub use watch::{run_watch, WatchArgs};
