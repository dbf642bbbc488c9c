//! Player error codes and the table of human-readable descriptors shown in the overlay.
//!
//! Positive codes mirror the media element's `MediaError` codes; negative codes are
//! player-level errors that never reach the media element.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric error code reported by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const ABORTED: ErrorCode = ErrorCode(1);
    pub const NETWORK: ErrorCode = ErrorCode(2);
    pub const DECODE: ErrorCode = ErrorCode(3);
    pub const SRC_NOT_SUPPORTED: ErrorCode = ErrorCode(4);
    pub const ENCRYPTED: ErrorCode = ErrorCode(5);
    /// No source has been loaded into the player.
    pub const NO_SRC: ErrorCode = ErrorCode(-1);
    /// The player gave up waiting for data.
    pub const TIMEOUT: ErrorCode = ErrorCode(-2);

    /// True for the one code that means the connection dropped mid-playback.
    pub fn is_network_loss(self) -> bool {
        self == ErrorCode::NETWORK
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category label plus the headline rendered in the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Category label, e.g. `MEDIA_ERR_NETWORK`.
    #[serde(rename = "type")]
    pub kind: String,
    pub headline: String,
}

impl ErrorDescriptor {
    pub fn new(kind: impl Into<String>, headline: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            headline: headline.into(),
        }
    }
}

/// Key into a [`DescriptorTable`]: a concrete code or the catch-all entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptorKey {
    Code(ErrorCode),
    Unknown,
}

impl fmt::Display for DescriptorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorKey::Code(code) => write!(f, "{}", code),
            DescriptorKey::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for DescriptorKey {
    type Err = std::num::ParseIntError;

    /// Accepts `"unknown"` (any case) or a decimal code such as `"2"` or `"-1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unknown") {
            return Ok(DescriptorKey::Unknown);
        }
        s.parse::<i32>().map(|n| DescriptorKey::Code(ErrorCode(n)))
    }
}

/// Immutable mapping from error code to descriptor. Always holds an `Unknown` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorTable {
    entries: BTreeMap<DescriptorKey, ErrorDescriptor>,
    unknown: ErrorDescriptor,
}

impl Default for DescriptorTable {
    fn default() -> Self {
        let defaults = [
            (
                ErrorCode::ABORTED,
                "MEDIA_ERR_ABORTED",
                "The video download was cancelled",
            ),
            (
                ErrorCode::NETWORK,
                "MEDIA_ERR_NETWORK",
                "The video connection was lost, please confirm you are connected to the internet",
            ),
            (
                ErrorCode::DECODE,
                "MEDIA_ERR_DECODE",
                "The video is bad or in a format that cannot be played on your browser",
            ),
            (
                ErrorCode::SRC_NOT_SUPPORTED,
                "MEDIA_ERR_SRC_NOT_SUPPORTED",
                "This video is either unavailable or not supported in this browser",
            ),
            (
                ErrorCode::ENCRYPTED,
                "MEDIA_ERR_ENCRYPTED",
                "The video you are trying to watch is encrypted and we do not know how to decrypt it",
            ),
            (
                ErrorCode::NO_SRC,
                "PLAYER_ERR_NO_SRC",
                "No video has been loaded",
            ),
            (
                ErrorCode::TIMEOUT,
                "PLAYER_ERR_TIMEOUT",
                "Could not download the video",
            ),
        ];

        let entries = defaults
            .into_iter()
            .map(|(code, kind, headline)| {
                (DescriptorKey::Code(code), ErrorDescriptor::new(kind, headline))
            })
            .collect();

        Self {
            entries,
            unknown: ErrorDescriptor::new(
                "MEDIA_ERR_UNKNOWN",
                "An unanticipated problem was encountered, check back soon and try again",
            ),
        }
    }
}

impl DescriptorTable {
    /// Descriptor for `code`, falling back to the `Unknown` entry.
    pub fn lookup(&self, code: ErrorCode) -> &ErrorDescriptor {
        self.entries
            .get(&DescriptorKey::Code(code))
            .unwrap_or(&self.unknown)
    }

    pub fn unknown(&self) -> &ErrorDescriptor {
        &self.unknown
    }

    /// Returns a new table where each given entry replaces (or adds to) the existing one.
    pub fn merged<I>(&self, overrides: I) -> DescriptorTable
    where
        I: IntoIterator<Item = (DescriptorKey, ErrorDescriptor)>,
    {
        let mut table = self.clone();
        for (key, descriptor) in overrides {
            match key {
                DescriptorKey::Unknown => table.unknown = descriptor,
                key @ DescriptorKey::Code(_) => {
                    table.entries.insert(key, descriptor);
                }
            }
        }
        table
    }

    /// All entries in key order, `Unknown` last.
    pub fn iter(&self) -> impl Iterator<Item = (DescriptorKey, &ErrorDescriptor)> {
        self.entries
            .iter()
            .map(|(k, v)| (*k, v))
            .chain(std::iter::once((DescriptorKey::Unknown, &self.unknown)))
    }
}
