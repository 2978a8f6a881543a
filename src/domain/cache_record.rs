//! Duplicate suppression for race-day notifications.
//!
//! A single [`CacheRecord`] remembers the last signal that was acted upon and
//! when. On disk it is one line: `"<0|1>,<unix-timestamp>"`.

use std::{fmt, str::FromStr};

/// Seconds during which an unchanged signal is not notified again.
pub const SUPPRESSION_WINDOW_SECS: i64 = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub last_signal: bool,
    pub last_action_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Suppress,
    Notify,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed cache record: {0:?}")]
pub struct MalformedCacheRecord(pub String);

impl CacheRecord {
    pub fn new(last_signal: bool, last_action_time: i64) -> Self {
        CacheRecord {
            last_signal,
            last_action_time,
        }
    }
}

impl fmt::Display for CacheRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.last_signal {
            true => "1",
            false => "0",
        };
        write!(f, "{},{}", state, self.last_action_time)
    }
}

impl FromStr for CacheRecord {
    type Err = MalformedCacheRecord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedCacheRecord(s.to_string());

        let (state, timestamp) = s.trim().split_once(',').ok_or_else(malformed)?;

        let last_signal = match state.trim() {
            "1" => true,
            "0" => false,
            _ => return Err(malformed()),
        };

        let timestamp = timestamp.trim();
        // Older deployments wrote fractional seconds
        let last_action_time = match timestamp.parse::<i64>() {
            Ok(t) => t,
            Err(_) => match timestamp.parse::<f64>() {
                Ok(t) if (i64::MIN as f64..i64::MAX as f64).contains(&t) => t.trunc() as i64,
                _ => return Err(malformed()),
            },
        };

        Ok(CacheRecord {
            last_signal,
            last_action_time,
        })
    }
}

pub fn decide(record: Option<&CacheRecord>, signal: bool, now: i64) -> Decision {
    match record {
        Some(r)
            if r.last_signal == signal
                && now.saturating_sub(r.last_action_time) < SUPPRESSION_WINDOW_SECS =>
        {
            Decision::Suppress
        }
        _ => Decision::Notify,
    }
}
