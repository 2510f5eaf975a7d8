//! Wall clock.
//!
//! The engine never reads the system time itself. Callers read a [`Clock`]
//! once per evaluation and pass the local `now` down.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// Timezone used to turn UTC into local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timezone {
    Named(Tz),
    Fixed(FixedOffset),
    /// Whatever the operating system reports.
    System,
}

impl Timezone {
    /// Parse an IANA name (`Europe/Berlin`), `UTC`/`GMT` or a fixed offset
    /// such as `UTC+02:00`, `+0530` or `-3`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let invalid = || ValidationError::InvalidValue {
            field: "clock.timezone".into(),
            message: format!("unknown timezone '{raw}'"),
        };
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let upper = trimmed.to_uppercase();
        if upper == "UTC" || upper == "GMT" {
            return FixedOffset::east_opt(0).map(Timezone::Fixed).ok_or_else(invalid);
        }
        if let Some(offset) = upper.strip_prefix("UTC").or_else(|| upper.strip_prefix("GMT")) {
            return parse_fixed_offset(offset).map(Timezone::Fixed).ok_or_else(invalid);
        }
        if let Some(offset) = parse_fixed_offset(trimmed) {
            return Ok(Timezone::Fixed(offset));
        }
        trimmed.parse::<Tz>().map(Timezone::Named).map_err(|_| invalid())
    }

    pub fn localize(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Timezone::Named(tz) => utc.with_timezone(tz).naive_local(),
            Timezone::Fixed(offset) => utc.with_timezone(offset).naive_local(),
            Timezone::System => utc.with_timezone(&Local).naive_local(),
        }
    }
}

fn parse_fixed_offset(raw: &str) -> Option<FixedOffset> {
    let trimmed = raw.trim();
    let (sign, rest) = match trimmed.chars().next()? {
        '+' => (1, &trimmed[1..]),
        '-' => (-1, &trimmed[1..]),
        _ => return None,
    };
    let rest = rest.trim();
    let colons = rest.chars().filter(|c| *c == ':').count();
    if rest.is_empty() || colons > 1 || !rest.chars().all(|c| c.is_ascii_digit() || c == ':') {
        return None;
    }

    let (hours, minutes) = if let Some((h, m)) = rest.split_once(':') {
        (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?)
    } else if rest.len() > 2 {
        let (h, m) = rest.split_at(rest.len() - 2);
        (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?)
    } else {
        (rest.parse::<i32>().ok()?, 0)
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Reads the system clock in a configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }

    /// Build from an optional configured timezone name; `None` uses the
    /// system timezone.
    pub fn from_config(timezone: Option<&str>) -> Result<Self, ValidationError> {
        let timezone = match timezone {
            Some(name) => Timezone::parse(name)?,
            None => Timezone::System,
        };
        Ok(Self::new(timezone))
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Timezone::System)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        self.timezone.localize(Utc::now())
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Parse `YYYY-MM-DDTHH:MM[:SS]` (a space also separates date and time).
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(FixedClock)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "now".into(),
                message: format!("'{raw}' is not YYYY-MM-DDTHH:MM[:SS]"),
            })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
