//! Seams to the host: the media player and the network environment.
//!
//! The watchdog never touches playback, rendering, or sockets directly. Hosts
//! implement these traits; tests implement them with recording mocks.

use crate::descriptor::ErrorCode;
use std::fmt;
use std::time::Duration;

/// Player notifications the watchdog subscribes to on attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Error,
    TimeUpdate,
    Dispose,
}

/// Opaque handle for a recurring timer armed on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Identifies one probe request issued through [`Network::start_probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeId(pub u64);

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe#{}", self.0)
    }
}

/// Outcome of a HEAD probe as observed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// The request ran to completion (a status line was received).
    pub complete: bool,
    /// HTTP status; 0 when the request did not complete.
    pub status: u32,
}

impl ProbeResponse {
    pub fn completed(status: u32) -> Self {
        Self {
            complete: true,
            status,
        }
    }

    /// Transport failure, timeout, or abort.
    pub fn incomplete() -> Self {
        Self {
            complete: false,
            status: 0,
        }
    }

    /// True when the source is reachable again: complete with a 2xx status.
    pub fn is_ready(&self) -> bool {
        self.complete && (200..300).contains(&self.status)
    }
}

/// Everything the watchdog reacts to, in the order the host delivers it.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchdogEvent {
    /// The player reported an error.
    Error { code: ErrorCode },
    /// Playback position advanced.
    TimeUpdate { seconds: f64 },
    /// The player is being torn down.
    Dispose,
    /// The polling timer fired.
    Tick,
    /// A probe finished (possibly after being superseded or aborted).
    ProbeCompleted { id: ProbeId, response: ProbeResponse },
}

/// The host media player.
pub trait Player {
    /// Register interest in a notification; the host delivers it as a [`WatchdogEvent`].
    fn subscribe(&mut self, kind: EventKind);

    /// Currently loaded source URL, if any.
    fn source(&self) -> Option<String>;
    /// Assign a source. Assigning the current source forces a reload.
    fn set_source(&mut self, url: &str);

    /// Position cached by the player, in seconds.
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn play(&mut self);

    fn set_interval(&mut self, period: Duration) -> TimerHandle;
    fn clear_interval(&mut self, handle: TimerHandle);

    /// Show the error overlay with the given HTML body.
    fn fill_overlay(&mut self, html: &str);
    fn close_overlay(&mut self);
}

/// The host network environment.
pub trait Network {
    /// Host's view of connectivity (e.g. `navigator.onLine`).
    fn is_online(&self) -> bool;
    /// Issue a HEAD request against `url`. Completion arrives later as
    /// [`WatchdogEvent::ProbeCompleted`] carrying the returned id.
    fn start_probe(&mut self, url: &str) -> ProbeId;
    /// Best-effort cancel; a late completion may still be delivered.
    fn abort_probe(&mut self, id: ProbeId);
}
