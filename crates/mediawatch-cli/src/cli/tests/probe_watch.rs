//! Tests for probe and watch subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_probe() {
    match parse(&["mediawatch", "probe", "https://example.com/movie.mp4"]) {
        CliCommand::Probe { url, timeout } => {
            assert_eq!(url, "https://example.com/movie.mp4");
            assert_eq!(timeout, 30);
        }
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_probe_timeout() {
    match parse(&["mediawatch", "probe", "http://x/", "--timeout", "5"]) {
        CliCommand::Probe { timeout, .. } => assert_eq!(timeout, 5),
        _ => panic!("expected Probe with --timeout"),
    }
}

#[test]
fn cli_parse_probe_requires_url() {
    assert!(Cli::try_parse_from(["mediawatch", "probe"]).is_err());
}

#[test]
fn cli_parse_watch_defaults() {
    match parse(&["mediawatch", "watch"]) {
        CliCommand::Watch(args) => {
            assert!(args.source.is_none());
            assert!(args.probe_url.is_none());
            assert!(args.poll_interval_ms.is_none());
            assert!(args.options.is_none());
        }
        _ => panic!("expected Watch"),
    }
}

#[test]
fn cli_parse_watch_all_flags() {
    match parse(&[
        "mediawatch",
        "watch",
        "https://example.com/movie.mp4",
        "--probe-url",
        "https://example.com/ping",
        "--poll-interval-ms",
        "250",
        "--options",
        r#"{"errorDescriptors":{}}"#,
    ]) {
        CliCommand::Watch(args) => {
            assert_eq!(args.source.as_deref(), Some("https://example.com/movie.mp4"));
            assert_eq!(args.probe_url.as_deref(), Some("https://example.com/ping"));
            assert_eq!(args.poll_interval_ms, Some(250));
            assert_eq!(args.options.as_deref(), Some(r#"{"errorDescriptors":{}}"#));
        }
        _ => panic!("expected Watch with flags"),
    }
}
