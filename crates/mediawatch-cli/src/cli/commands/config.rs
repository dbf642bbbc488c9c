//! `mediawatch config` – show where the config lives and what it resolves to.

use anyhow::Result;
use mediawatch_core::config;

pub fn run_config() -> Result<()> {
    let path = config::config_path()?;
    let cfg = config::load_at(&path)?;
    println!("config file:    {}", path.display());
    println!("poll interval:  {} ms", cfg.poll_interval_millis);
    println!(
        "probe URL:      {}",
        cfg.probe_url_override.as_deref().unwrap_or("(player source)")
    );
    println!("descriptors:    {}", cfg.error_descriptors.iter().count());
    Ok(())
}
