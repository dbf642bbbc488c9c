//! Recording [`Player`] for driving the watchdog end to end.

use std::time::Duration;

use mediawatch_core::player::{EventKind, Player, TimerHandle, WatchdogEvent};
use mediawatch_core::runtime::EventSender;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Fill(String),
    Close,
    SetSource(String),
    Seek(f64),
    Play,
    ClearInterval,
}

/// Records every outbound call. Optionally sends `Dispose` when playback resumes,
/// which ends the driver loop once recovery is complete.
pub struct RecordingPlayer {
    pub source: Option<String>,
    pub actions: Vec<Action>,
    pub subscriptions: Vec<EventKind>,
    dispose_on_play: Option<EventSender>,
}

impl RecordingPlayer {
    pub fn new(source: Option<&str>) -> Self {
        Self {
            source: source.map(str::to_string),
            actions: Vec::new(),
            subscriptions: Vec::new(),
            dispose_on_play: None,
        }
    }

    pub fn dispose_on_play(mut self, events: EventSender) -> Self {
        self.dispose_on_play = Some(events);
        self
    }
}

impl Player for RecordingPlayer {
    fn subscribe(&mut self, kind: EventKind) {
        self.subscriptions.push(kind);
    }

    fn source(&self) -> Option<String> {
        self.source.clone()
    }

    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.actions.push(Action::SetSource(url.to_string()));
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.actions.push(Action::Seek(seconds));
    }

    fn play(&mut self) {
        self.actions.push(Action::Play);
        if let Some(events) = &self.dispose_on_play {
            let _ = events.send(WatchdogEvent::Dispose);
        }
    }

    fn set_interval(&mut self, _period: Duration) -> TimerHandle {
        TimerHandle(1)
    }

    fn clear_interval(&mut self, _handle: TimerHandle) {
        self.actions.push(Action::ClearInterval);
    }

    fn fill_overlay(&mut self, html: &str) {
        self.actions.push(Action::Fill(html.to_string()));
    }

    fn close_overlay(&mut self) {
        self.actions.push(Action::Close);
    }
}
