//! HTTP HEAD connectivity probe.
//!
//! Uses the curl crate (libcurl) to issue a HEAD request against the media
//! source. [`CurlNetwork`] runs each probe on tokio's blocking pool and
//! reports the outcome back to the event loop as a [`WatchdogEvent`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;

use crate::player::{Network, ProbeId, ProbeResponse, WatchdogEvent};

/// Connect and overall timeouts for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    pub connect: Duration,
    pub total: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            total: Duration::from_secs(30),
        }
    }
}

/// Performs a HEAD request and reports whether it completed and with which status.
///
/// Follows redirects. Transport errors (DNS, refused, timeout) yield an incomplete
/// response rather than an error. Blocks the current thread.
pub fn head(url: &str, timeouts: ProbeTimeouts) -> ProbeResponse {
    head_cancellable(url, timeouts, &AtomicBool::new(false))
}

/// Like [`head`], but the transfer is torn down once `cancel` is set.
///
/// libcurl polls the flag from its progress callback, at least about once a
/// second while the connection is idle.
pub fn head_cancellable(url: &str, timeouts: ProbeTimeouts, cancel: &AtomicBool) -> ProbeResponse {
    match perform_head(url, timeouts, cancel) {
        Ok(status) => ProbeResponse::completed(status),
        Err(e) if e.is_aborted_by_callback() => {
            tracing::debug!("HEAD {} cancelled", url);
            ProbeResponse::incomplete()
        }
        Err(e) => {
            tracing::warn!("HEAD {} failed: {}", url, e);
            ProbeResponse::incomplete()
        }
    }
}

fn perform_head(
    url: &str,
    timeouts: ProbeTimeouts,
    cancel: &AtomicBool,
) -> Result<u32, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.connect_timeout(timeouts.connect)?;
    easy.timeout(timeouts.total)?;
    easy.progress(true)?;
    {
        let mut transfer = easy.transfer();
        transfer.progress_function(|_, _, _, _| !cancel.load(Ordering::Relaxed))?;
        transfer.perform()?;
    }
    easy.response_code()
}

/// One probe on the blocking pool: the reporting task plus the flag that stops curl.
struct InFlight {
    cancel: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl InFlight {
    fn cancel(self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.task.abort();
    }
}

/// [`Network`] backed by curl probes on the tokio blocking pool.
///
/// Must be driven from inside a tokio runtime. Online status is a shared flag
/// the host flips when its connectivity view changes. Only a weak handle to the
/// event channel is kept, so the network never holds the channel open on its own.
pub struct CurlNetwork {
    events: WeakUnboundedSender<WatchdogEvent>,
    online: Arc<AtomicBool>,
    timeouts: ProbeTimeouts,
    next_id: u64,
    probes: HashMap<ProbeId, InFlight>,
}

impl CurlNetwork {
    /// Probe results are sent on `events`. Starts online.
    pub fn new(events: &UnboundedSender<WatchdogEvent>) -> Self {
        Self {
            events: events.downgrade(),
            online: Arc::new(AtomicBool::new(true)),
            timeouts: ProbeTimeouts::default(),
            next_id: 0,
            probes: HashMap::new(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: ProbeTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Shared connectivity flag; store `false` to report offline.
    pub fn online_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.online)
    }

    /// Probes still tracked (not yet finished or aborted).
    pub fn pending(&self) -> usize {
        self.probes.values().filter(|p| !p.task.is_finished()).count()
    }
}

impl Network for CurlNetwork {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    fn start_probe(&mut self, url: &str) -> ProbeId {
        self.probes.retain(|_, p| !p.task.is_finished());
        self.next_id += 1;
        let id = ProbeId(self.next_id);

        let cancel = Arc::new(AtomicBool::new(false));
        let url = url.to_string();
        let events = self.events.clone();
        let timeouts = self.timeouts;
        let flag = Arc::clone(&cancel);
        let task = tokio::spawn(async move {
            let blocking = tokio::task::spawn_blocking(move || head_cancellable(&url, timeouts, &flag));
            let response = match blocking.await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("probe task join: {}", e);
                    ProbeResponse::incomplete()
                }
            };
            // No live sender means the driver already stopped.
            if let Some(events) = events.upgrade() {
                let _ = events.send(WatchdogEvent::ProbeCompleted { id, response });
            }
        });
        self.probes.insert(id, InFlight { cancel, task });
        id
    }

    fn abort_probe(&mut self, id: ProbeId) {
        if let Some(probe) = self.probes.remove(&id) {
            probe.cancel();
        }
    }
}

impl Drop for CurlNetwork {
    fn drop(&mut self) {
        for (_, probe) in self.probes.drain() {
            probe.cancel();
        }
    }
}
