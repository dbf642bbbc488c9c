//! Connectivity watchdog: detects network-loss errors, shows the overlay, polls
//! the source with HEAD probes, and resumes playback once it is reachable again.
//!
//! All handlers run on the host's single event thread. The watchdog owns its
//! state outright; a probe is the only operation that outlives a handler, and
//! its completion is matched against the tracked [`ProbeId`] before it can
//! touch state.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::WatchdogConfig;
use crate::descriptor::ErrorCode;
use crate::overlay;
use crate::player::{
    EventKind, Network, Player, ProbeId, ProbeResponse, TimerHandle, WatchdogEvent,
};

#[derive(Debug, Default)]
struct WatchdogState {
    waiting: bool,
    /// Valid only while `waiting`.
    saved_time: f64,
    /// Last position seen via time-progress notifications.
    last_time: Option<f64>,
    in_flight: Option<ProbeId>,
    timer: Option<TimerHandle>,
    disposed: bool,
}

/// Watchdog attached to a single player instance.
pub struct ConnectivityWatchdog<P: Player, N: Network> {
    player: P,
    network: N,
    config: WatchdogConfig,
    state: WatchdogState,
}

impl<P: Player, N: Network> ConnectivityWatchdog<P, N> {
    /// Subscribe to the player's error, time-progress and disposal notifications
    /// and arm the polling timer.
    pub fn attach(mut player: P, network: N, config: WatchdogConfig) -> Self {
        for kind in [EventKind::Error, EventKind::TimeUpdate, EventKind::Dispose] {
            player.subscribe(kind);
        }

        let mut watchdog = Self {
            player,
            network,
            config,
            state: WatchdogState::default(),
        };
        watchdog.reset_timer();

        debug!(
            poll_ms = watchdog.config.poll_interval_millis,
            probe_url = ?watchdog.config.probe_url_override,
            "watchdog attached"
        );
        watchdog
    }

    /// Route one host event to its handler.
    pub fn handle(&mut self, event: WatchdogEvent) {
        match event {
            WatchdogEvent::Error { code } => self.on_error(code),
            WatchdogEvent::TimeUpdate { seconds } => self.on_time_update(seconds),
            WatchdogEvent::Dispose => self.on_dispose(),
            WatchdogEvent::Tick => self.on_tick(),
            WatchdogEvent::ProbeCompleted { id, response } => {
                self.on_probe_response(id, response)
            }
        }
    }

    pub fn on_time_update(&mut self, seconds: f64) {
        if self.state.disposed {
            return;
        }
        self.state.last_time = Some(sanitize_time(seconds));
    }

    /// Render the overlay for `code`; a network-loss code also arms waiting.
    /// A later error while already waiting overwrites the saved time.
    pub fn on_error(&mut self, code: ErrorCode) {
        if self.state.disposed {
            return;
        }

        let descriptor = self.config.error_descriptors.lookup(code);
        let html = overlay::render(&descriptor.headline);
        self.player.fill_overlay(&html);

        if !code.is_network_loss() {
            debug!(%code, kind = %descriptor.kind, "player error, not waiting for connection");
            return;
        }

        let saved = self
            .state
            .last_time
            .unwrap_or_else(|| sanitize_time(self.player.current_time()));
        self.state.waiting = true;
        self.state.saved_time = saved;
        info!(%code, saved_time = saved, "connection lost, waiting for source");
    }

    /// Poll once: no-op unless waiting; skipped while offline or without a source.
    pub fn on_tick(&mut self) {
        if self.state.disposed || !self.state.waiting {
            return;
        }
        if !self.network.is_online() {
            debug!("offline, skipping probe");
            return;
        }
        let Some(source) = self.player.source().filter(|s| !s.is_empty()) else {
            debug!("no source loaded, skipping probe");
            return;
        };

        let url = self.config.probe_url_override.clone().unwrap_or(source);
        if let Some(stale) = self.state.in_flight.take() {
            debug!(probe = %stale, "aborting superseded probe");
            self.network.abort_probe(stale);
        }
        let id = self.network.start_probe(&url);
        debug!(probe = %id, %url, "probe issued");
        self.state.in_flight = Some(id);
    }

    /// Resume playback if `id` is the tracked probe and the response is ready.
    pub fn on_probe_response(&mut self, id: ProbeId, response: ProbeResponse) {
        if self.state.disposed || self.state.in_flight != Some(id) {
            debug!(probe = %id, "ignoring stale probe response");
            return;
        }
        self.state.in_flight = None;

        if !response.is_ready() {
            debug!(
                probe = %id,
                complete = response.complete,
                status = response.status,
                "source not reachable yet"
            );
            return;
        }
        if !self.state.waiting {
            return;
        }

        let resume_at = self.state.saved_time;
        self.state.waiting = false;
        self.player.close_overlay();
        if let Some(source) = self.player.source() {
            self.player.set_source(&source);
        }
        self.player.set_current_time(resume_at);
        self.player.play();
        info!(resume_at, "connection restored, playback resumed");
    }

    /// Stop the timer and abort any in-flight probe. Idempotent.
    pub fn on_dispose(&mut self) {
        if self.state.disposed {
            return;
        }
        self.state.disposed = true;
        self.state.waiting = false;
        if let Some(timer) = self.state.timer.take() {
            self.player.clear_interval(timer);
        }
        if let Some(probe) = self.state.in_flight.take() {
            self.network.abort_probe(probe);
        }
        debug!("watchdog disposed");
    }

    fn reset_timer(&mut self) {
        if let Some(timer) = self.state.timer.take() {
            self.player.clear_interval(timer);
        }
        let period = self.config.poll_interval();
        self.state.timer = Some(self.player.set_interval(period));
    }

    pub fn is_waiting(&self) -> bool {
        self.state.waiting
    }

    /// Position playback resumes at; `None` unless waiting.
    pub fn saved_time(&self) -> Option<f64> {
        self.state.waiting.then_some(self.state.saved_time)
    }

    pub fn in_flight_probe(&self) -> Option<ProbeId> {
        self.state.in_flight
    }

    pub fn is_timer_armed(&self) -> bool {
        self.state.timer.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.disposed
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval()
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn network(&self) -> &N {
        &self.network
    }
}

fn sanitize_time(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
