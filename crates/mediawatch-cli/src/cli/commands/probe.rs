//! `mediawatch probe <url>` – one-shot HEAD check.

use anyhow::{Context, Result};
use mediawatch_core::probe::{self, ProbeTimeouts};
use std::time::Duration;

pub async fn run_probe(url: &str, timeout_secs: u64) -> Result<()> {
    let timeouts = ProbeTimeouts {
        total: Duration::from_secs(timeout_secs.max(1)),
        ..ProbeTimeouts::default()
    };
    let response = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || probe::head(&url, timeouts)
    })
    .await
    .context("probe task join")?;

    if !response.complete {
        anyhow::bail!("HEAD {} did not complete", url);
    }
    println!("HEAD {} -> HTTP {}", url, response.status);
    if !response.is_ready() {
        anyhow::bail!("source not ready (HTTP {})", response.status);
    }
    Ok(())
}
