//! Parsing of the caller-supplied video source string.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::decode::decoder::DecodeError;

/// Where a video lives. Remote URLs are handed to FFmpeg's protocol layer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VideoSource {
    Local(PathBuf),
    Remote(String),
}

impl VideoSource {
    /// Parse a source string: a plain path, a `file://` URL, or `scheme://...`.
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DecodeError::InvalidSource("empty video source".to_string()));
        }

        let Some((scheme, rest)) = raw.split_once("://") else {
            return Ok(VideoSource::Local(PathBuf::from(raw)));
        };

        let scheme_ok = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(DecodeError::InvalidSource(format!("malformed URL scheme in {raw:?}")));
        }
        if rest.is_empty() {
            return Err(DecodeError::InvalidSource(format!("URL without a location: {raw:?}")));
        }

        if scheme.eq_ignore_ascii_case("file") {
            Ok(VideoSource::Local(PathBuf::from(rest)))
        } else {
            Ok(VideoSource::Remote(raw.to_string()))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, VideoSource::Remote(_))
    }
}

impl FromStr for VideoSource {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoSource::parse(s)
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::Local(path) => write!(f, "{}", path.display()),
            VideoSource::Remote(url) => f.write_str(url),
        }
    }
}
