//! Refresh cadences for polling consumers.

use crate::domain::SportConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What a polling consumer is refreshing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    /// Upcoming odds, paced by the sport's configured interval
    Odds,
    Live,
    Scores,
}

impl PollKind {
    pub fn default_interval(&self) -> Duration {
        match self {
            PollKind::Odds => Duration::from_secs(30),
            PollKind::Live => Duration::from_secs(15),
            PollKind::Scores => Duration::from_secs(60),
        }
    }

    /// Interval for a sport; only odds follow the sport's own cadence.
    pub fn interval_for(&self, sport: &SportConfig) -> Duration {
        match self {
            PollKind::Odds if sport.refresh_interval_seconds > 0 => {
                Duration::from_secs(sport.refresh_interval_seconds as u64)
            }
            _ => self.default_interval(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PollKind::Odds => "odds",
            PollKind::Live => "live",
            PollKind::Scores => "scores",
        }
    }
}

impl fmt::Display for PollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PollKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "odds" | "upcoming" => Ok(PollKind::Odds),
            "live" => Ok(PollKind::Live),
            "scores" => Ok(PollKind::Scores),
            other => Err(format!("unknown poll kind: {}", other)),
        }
    }
}
