use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Fixed moment used instead of the real clock, so that a tick can be
/// reproduced without waiting for real time. Each part replaces only
/// its own component of the current civil time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockOverride {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidClockOverride {
    #[error("Invalid manual date: `{0}`. Use YYYY-MM-DD")]
    Date(String),
    #[error("Invalid manual time: `{0}`. Use HH:MM")]
    Time(String),
}

impl ClockOverride {
    pub fn parse(date: Option<&str>, time: Option<&str>) -> Result<Self, InvalidClockOverride> {
        let date = match date {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| InvalidClockOverride::Date(raw.to_string()))?,
            ),
            None => None,
        };
        let time = match time {
            Some(raw) => Some(
                NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                    .map_err(|_| InvalidClockOverride::Time(raw.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { date, time })
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none()
    }
}

/// The civil "now" and "today" of a single tick.
///
/// Captured once when the tick starts and used for every comparison in
/// that tick, so that a tick running across a minute or midnight
/// boundary still sees one consistent moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    now: NaiveDateTime,
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

impl TickContext {
    pub fn capture(now: DateTime<Utc>, timezone: &Tz, clock_override: &ClockOverride) -> Self {
        let civil = now.with_timezone(timezone).naive_local();
        let date = clock_override.date.unwrap_or_else(|| civil.date());
        let time = clock_override.time.unwrap_or_else(|| civil.time());
        Self::at(NaiveDateTime::new(date, time))
    }

    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: NaiveDateTime::new(now.date(), truncate_to_minute(now.time())),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.now.time()
    }

    /// The minute templates are matched against, e.g. `09:00`
    pub fn match_minute(&self) -> String {
        self.now.format("%H:%M").to_string()
    }
}
