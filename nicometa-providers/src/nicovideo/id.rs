//! Video identifiers

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::error::NicovideoError;

// `\d` in the regex crate matches any Unicode digit, so spell out ASCII.
static RE_VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(sm|nm)[0-9]+$").expect("invalid video id regex"));

/// A validated `sm`/`nm` video id.
///
/// Only obtainable through [`VideoId::parse`], so anything holding one has
/// already passed the pattern check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(raw: &str) -> Result<Self, NicovideoError> {
        if RE_VIDEO_ID.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(NicovideoError::InvalidIdentifier(raw.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for VideoId {
    type Err = NicovideoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_sm_and_nm() {
        for raw in ["sm9", "sm123456", "nm100", "nm0"] {
            let id = VideoId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in [
            "", "xx1", "sm", "nm", "SM9", "so123", "sm12a", " sm9", "sm9 ", "sm9/../x",
            "sm9?x=1", "lv123", "1sm9",
        ] {
            assert!(
                matches!(VideoId::parse(raw), Err(NicovideoError::InvalidIdentifier(ref s)) if s == raw),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        // Arabic-Indic and fullwidth digits
        assert!(VideoId::parse("sm\u{0661}\u{0662}").is_err());
        assert!(VideoId::parse("sm\u{FF11}").is_err());
    }

    #[test]
    fn test_from_str_and_display() {
        let id: VideoId = "sm9".parse().unwrap();
        assert_eq!(id.to_string(), "sm9");
    }
}
