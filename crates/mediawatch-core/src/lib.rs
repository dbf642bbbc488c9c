pub mod config;
pub mod logging;

pub mod descriptor;
pub mod overlay;
pub mod player;
pub mod probe;
pub mod runtime;
pub mod watchdog;
