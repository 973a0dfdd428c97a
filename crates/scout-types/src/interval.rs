//! Recurrence intervals for scheduled searches.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a profile's search pipeline fires.
///
/// `Manual` is the sentinel for "no automatic schedule"; unknown values
/// deserialize to `Manual` rather than failing, so a profile saved with an
/// unrecognized interval simply stops auto-running instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    #[serde(rename = "1h")]
    Hourly,

    #[serde(rename = "3h")]
    EveryThreeHours,

    #[serde(rename = "6h")]
    EverySixHours,

    #[serde(rename = "12h")]
    EveryTwelveHours,

    #[serde(rename = "24h")]
    Daily,

    /// No automatic schedule; runs only when triggered by the user.
    #[default]
    #[serde(rename = "manual")]
    #[serde(other)]
    Manual,
}

impl Interval {
    /// Parse from the stored string form. Unknown strings map to `Manual`.
    pub fn parse(s: &str) -> Self {
        match s {
            "1h" => Interval::Hourly,
            "3h" => Interval::EveryThreeHours,
            "6h" => Interval::EverySixHours,
            "12h" => Interval::EveryTwelveHours,
            "24h" => Interval::Daily,
            _ => Interval::Manual,
        }
    }

    /// Interval length in seconds, or `None` for `Manual`.
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Interval::Manual => None,
            Interval::Hourly => Some(3_600),
            Interval::EveryThreeHours => Some(10_800),
            Interval::EverySixHours => Some(21_600),
            Interval::EveryTwelveHours => Some(43_200),
            Interval::Daily => Some(86_400),
        }
    }

    /// Interval as a `Duration`, or `None` for `Manual`.
    pub fn period(&self) -> Option<Duration> {
        self.as_secs().map(Duration::from_secs)
    }

    /// True when this interval installs no trigger.
    pub fn is_manual(&self) -> bool {
        matches!(self, Interval::Manual)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Interval::Manual => "manual",
            Interval::Hourly => "1h",
            Interval::EveryThreeHours => "3h",
            Interval::EverySixHours => "6h",
            Interval::EveryTwelveHours => "12h",
            Interval::Daily => "24h",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_seconds_mapping() {
        assert_eq!(Interval::Hourly.as_secs(), Some(3_600));
        assert_eq!(Interval::EveryThreeHours.as_secs(), Some(10_800));
        assert_eq!(Interval::EverySixHours.as_secs(), Some(21_600));
        assert_eq!(Interval::EveryTwelveHours.as_secs(), Some(43_200));
        assert_eq!(Interval::Daily.as_secs(), Some(86_400));
        assert_eq!(Interval::Manual.as_secs(), None);
    }

    #[test]
    fn test_parse_known_values() {
        assert_eq!(Interval::parse("1h"), Interval::Hourly);
        assert_eq!(Interval::parse("24h"), Interval::Daily);
        assert_eq!(Interval::parse("manual"), Interval::Manual);
    }

    #[test]
    fn test_parse_unknown_is_manual() {
        assert_eq!(Interval::parse("2h"), Interval::Manual);
        assert_eq!(Interval::parse("weekly"), Interval::Manual);
        assert_eq!(Interval::parse(""), Interval::Manual);
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Interval::EveryThreeHours).unwrap();
        assert_eq!(json, "\"3h\"");
        let decoded: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, Interval::EveryThreeHours);
    }

    #[test]
    fn test_serde_unknown_maps_to_manual() {
        let decoded: Interval = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(decoded, Interval::Manual);
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for interval in [
            Interval::Manual,
            Interval::Hourly,
            Interval::EveryThreeHours,
            Interval::EverySixHours,
            Interval::EveryTwelveHours,
            Interval::Daily,
        ] {
            assert_eq!(Interval::parse(&interval.to_string()), interval);
        }
    }
}
