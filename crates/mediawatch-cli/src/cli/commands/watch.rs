//! `mediawatch watch` – attach the watchdog to a headless player.
//!
//! Player notifications are read from stdin, one per line:
//!
//! ```text
//! time 42.5     playback position advanced
//! error 2       player reported error code 2
//! offline       host reports no connectivity
//! online        host reports connectivity again
//! dispose       tear the player down and exit
//! ```
//!
//! Overlay and playback actions are printed to stdout.

use anyhow::{Context, Result};
use clap::Args;
use mediawatch_core::config::{self, PluginOptions, WatchdogConfig};
use mediawatch_core::descriptor::ErrorCode;
use mediawatch_core::player::{EventKind, Player, TimerHandle, WatchdogEvent};
use mediawatch_core::probe::CurlNetwork;
use mediawatch_core::runtime::{self, EventSender};
use mediawatch_core::watchdog::ConnectivityWatchdog;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Media source loaded into the player (omit to start with no source).
    pub source: Option<String>,

    /// Probe this URL instead of the player source.
    #[arg(long, value_name = "URL")]
    pub probe_url: Option<String>,

    /// Polling period in milliseconds.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Plugin options as a JSON object, applied over config.toml.
    #[arg(long, value_name = "JSON")]
    pub options: Option<String>,
}

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StdinCommand {
    Event(WatchdogEvent),
    Online(bool),
}

pub(crate) fn parse_line(line: &str) -> Result<Option<StdinCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    let cmd = match (word.to_ascii_lowercase().as_str(), arg) {
        ("error", Some(code)) => {
            let code = code
                .parse::<i32>()
                .map_err(|_| format!("bad error code: {}", code))?;
            StdinCommand::Event(WatchdogEvent::Error {
                code: ErrorCode(code),
            })
        }
        ("time", Some(secs)) => {
            let seconds = secs
                .parse::<f64>()
                .map_err(|_| format!("bad time: {}", secs))?;
            StdinCommand::Event(WatchdogEvent::TimeUpdate { seconds })
        }
        ("dispose", None) => StdinCommand::Event(WatchdogEvent::Dispose),
        ("online", None) => StdinCommand::Online(true),
        ("offline", None) => StdinCommand::Online(false),
        _ => return Err(format!("unrecognized command: {}", line.trim())),
    };
    Ok(Some(cmd))
}

/// Effective config: config.toml, then `--options`, then the individual flags.
pub(crate) fn build_config(args: &WatchArgs) -> Result<WatchdogConfig> {
    let mut cfg = config::load_or_init()?;
    apply_args(&mut cfg, args)?;
    Ok(cfg)
}

fn apply_args(cfg: &mut WatchdogConfig, args: &WatchArgs) -> Result<()> {
    if let Some(json) = &args.options {
        let options = PluginOptions::from_json(json).context("--options")?;
        cfg.apply(options)?;
    }
    cfg.apply(PluginOptions {
        poll_interval_millis: args.poll_interval_ms,
        probe_url_override: args.probe_url.clone(),
        ..Default::default()
    })?;
    Ok(())
}

/// Player without a screen: tracks source and position, prints what it would render.
pub(crate) struct HeadlessPlayer {
    source: Option<String>,
    position: f64,
    playing: bool,
    overlay: Option<String>,
    next_timer: u64,
}

impl HeadlessPlayer {
    pub(crate) fn new(source: Option<String>) -> Self {
        Self {
            source,
            position: 0.0,
            playing: false,
            overlay: None,
            next_timer: 0,
        }
    }
}

impl Player for HeadlessPlayer {
    fn subscribe(&mut self, kind: EventKind) {
        tracing::debug!(?kind, "headless player: subscription registered");
    }

    fn source(&self) -> Option<String> {
        self.source.clone()
    }

    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.playing = false;
        println!("source reloaded: {}", url);
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = seconds;
    }

    fn play(&mut self) {
        self.playing = true;
        println!("playing from {:.1}s", self.position);
    }

    fn set_interval(&mut self, period: Duration) -> TimerHandle {
        self.next_timer += 1;
        tracing::debug!(?period, timer = self.next_timer, "headless player: interval armed");
        TimerHandle(self.next_timer)
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        tracing::debug!(timer = handle.0, "headless player: interval cleared");
    }

    fn fill_overlay(&mut self, html: &str) {
        self.playing = false;
        self.overlay = Some(html.to_string());
        println!("overlay: {}", html);
    }

    fn close_overlay(&mut self) {
        if self.overlay.take().is_some() {
            println!("overlay dismissed");
        }
    }
}

/// Read stdin on a dedicated thread so a blocked read never holds up shutdown.
fn spawn_stdin_reader(events: EventSender, online: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line) {
                Ok(Some(StdinCommand::Event(event))) => {
                    if events.send(event).is_err() {
                        return;
                    }
                }
                Ok(Some(StdinCommand::Online(flag))) => online.store(flag, Ordering::Relaxed),
                Ok(None) => {}
                Err(msg) => eprintln!("{}", msg),
            }
        }
        // EOF tears the player down.
        let _ = events.send(WatchdogEvent::Dispose);
    });
}

pub async fn run_watch(args: WatchArgs) -> Result<()> {
    let cfg = build_config(&args)?;
    tracing::info!(source = ?args.source, poll_ms = cfg.poll_interval_millis, "starting watch");

    let (tx, driver) = runtime::channel();
    let network = CurlNetwork::new(&tx);
    let online = network.online_flag();
    let player = HeadlessPlayer::new(args.source.clone());
    let mut watchdog = ConnectivityWatchdog::attach(player, network, cfg);

    eprintln!("reading events from stdin: time <secs> | error <code> | online | offline | dispose");
    spawn_stdin_reader(tx, online);
    driver.run(&mut watchdog).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediawatch_core::player::{Network, ProbeId};

    #[test]
    fn parse_events() {
        assert_eq!(
            parse_line("error 2"),
            Ok(Some(StdinCommand::Event(WatchdogEvent::Error {
                code: ErrorCode::NETWORK
            })))
        );
        assert_eq!(
            parse_line("  TIME 42.5 "),
            Ok(Some(StdinCommand::Event(WatchdogEvent::TimeUpdate {
                seconds: 42.5
            })))
        );
        assert_eq!(
            parse_line("dispose"),
            Ok(Some(StdinCommand::Event(WatchdogEvent::Dispose)))
        );
        assert_eq!(parse_line("offline"), Ok(Some(StdinCommand::Online(false))));
        assert_eq!(parse_line("online"), Ok(Some(StdinCommand::Online(true))));
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_line("error two").is_err());
        assert!(parse_line("time").is_err());
        assert!(parse_line("dispose now").is_err());
        assert!(parse_line("rewind 3").is_err());
    }

    #[test]
    fn flags_override_json_options() {
        let args = WatchArgs {
            source: None,
            probe_url: Some("http://127.0.0.1/ping".into()),
            poll_interval_ms: Some(100),
            options: Some(r#"{ "pollIntervalMillis": 5000, "testUrl": "http://a.example/" }"#.into()),
        };
        let mut cfg = WatchdogConfig::default();
        apply_args(&mut cfg, &args).unwrap();
        assert_eq!(cfg.poll_interval_millis, 100);
        assert_eq!(cfg.probe_url_override.as_deref(), Some("http://127.0.0.1/ping"));
    }

    #[test]
    fn bad_options_json_is_an_error() {
        let args = WatchArgs {
            source: None,
            probe_url: None,
            poll_interval_ms: None,
            options: Some("{ not json".into()),
        };
        let mut cfg = WatchdogConfig::default();
        let err = apply_args(&mut cfg, &args).unwrap_err();
        assert!(format!("{:#}", err).contains("--options"));
        assert_eq!(cfg, WatchdogConfig::default());
    }

    struct NoNetwork;

    impl Network for NoNetwork {
        fn is_online(&self) -> bool {
            true
        }
        fn start_probe(&mut self, _url: &str) -> ProbeId {
            ProbeId(1)
        }
        fn abort_probe(&mut self, _id: ProbeId) {}
    }

    #[test]
    fn headless_player_resumes_at_saved_position() {
        let player = HeadlessPlayer::new(Some("https://media.example.com/a.mp4".into()));
        let mut wd = ConnectivityWatchdog::attach(player, NoNetwork, WatchdogConfig::default());
        wd.on_time_update(30.0);
        wd.on_error(ErrorCode::NETWORK);
        assert!(wd.player().overlay.is_some());
        assert!(!wd.player().playing);

        wd.on_tick();
        wd.on_probe_response(
            ProbeId(1),
            mediawatch_core::player::ProbeResponse::completed(200),
        );
        let player = wd.player();
        assert!(player.overlay.is_none());
        assert!(player.playing);
        assert_eq!(player.position, 30.0);
    }
}
