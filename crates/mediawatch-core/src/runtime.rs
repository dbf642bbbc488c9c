//! Event loop that feeds a [`ConnectivityWatchdog`] from one task.
//!
//! Host notifications and probe completions arrive on an unbounded channel;
//! the polling timer is a `tokio::time::Interval`. Both are multiplexed with
//! `select!`, so handlers never run concurrently.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{self, MissedTickBehavior};

use crate::player::{Network, Player, WatchdogEvent};
use crate::watchdog::ConnectivityWatchdog;

/// Sending half handed to the host and to the network collaborator.
pub type EventSender = UnboundedSender<WatchdogEvent>;

/// Receives events and drives the watchdog until disposal.
pub struct Driver {
    events: UnboundedReceiver<WatchdogEvent>,
}

/// Create the event channel and the driver that consumes it.
pub fn channel() -> (EventSender, Driver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Driver { events: rx })
}

impl Driver {
    /// Run until a `Dispose` event is handled, or until every sender is dropped
    /// (in which case the watchdog is disposed first).
    ///
    /// Ticks are delivered one poll interval apart, the first one a full interval
    /// after the call, and only while the watchdog's timer is armed.
    pub async fn run<P, N>(mut self, watchdog: &mut ConnectivityWatchdog<P, N>)
    where
        P: Player,
        N: Network,
    {
        let period = watchdog.poll_interval();
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        let done = matches!(event, WatchdogEvent::Dispose);
                        watchdog.handle(event);
                        if done {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("event channel closed, disposing watchdog");
                        watchdog.on_dispose();
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if watchdog.is_timer_armed() {
                        watchdog.handle(WatchdogEvent::Tick);
                    }
                }
            }
        }
    }
}
