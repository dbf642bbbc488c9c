//! `mediawatch descriptors` – print the effective descriptor table.

use anyhow::Result;
use mediawatch_core::config;

pub fn run_descriptors() -> Result<()> {
    let cfg = config::load_or_init()?;
    println!("{:<8} {:<28} {}", "CODE", "TYPE", "HEADLINE");
    for (key, descriptor) in cfg.error_descriptors.iter() {
        println!(
            "{:<8} {:<28} {}",
            key.to_string(),
            descriptor.kind,
            descriptor.headline
        );
    }
    Ok(())
}
