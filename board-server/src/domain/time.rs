//! Arrival time handling for departure boards.
//!
//! Boards display an arrival as one of three tokens: the sentinel "Due", a
//! relative "12 mins", or an absolute "23:47" clock time in the operator's
//! local zone. This module folds all three into a single "minutes until
//! departure" value.

use chrono::{DateTime, TimeDelta, TimeZone, Timelike};
use tracing::debug;

/// Error returned when parsing an invalid clock token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Normalized arrival of a single departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalEstimate {
    /// Minutes until departure, or `None` when the token could not be read.
    pub minutes: Option<i64>,

    /// Whether the board showed the "due now" sentinel.
    pub is_due_now: bool,
}

impl ArrivalEstimate {
    fn due() -> Self {
        Self {
            minutes: Some(0),
            is_due_now: true,
        }
    }

    fn in_minutes(minutes: Option<i64>) -> Self {
        Self {
            minutes,
            is_due_now: false,
        }
    }
}

/// A 24-hour time of day as printed on a board.
///
/// # Examples
///
/// ```
/// use board_server::domain::BoardTime;
///
/// let t = BoardTime::parse_hhmm("23:47").unwrap();
/// assert_eq!((t.hour(), t.minute()), (23, 47));
///
/// assert!(BoardTime::parse_hhmm("24:00").is_err());
/// assert!(BoardTime::parse_hhmm("12:60").is_err());
/// assert!(BoardTime::parse_hhmm("1230").is_err());
/// assert!(BoardTime::parse_hhmm("12:30:00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardTime {
    hour: u32,
    minute: u32,
}

impl BoardTime {
    /// Parse an "HH:MM" token. Single-digit hours ("7:05") are accepted.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        if minute.contains(':') {
            return Err(TimeError::new("expected a single colon"));
        }

        let hour = parse_digits(hour).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute =
            parse_digits(minute).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self { hour, minute })
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes from `now` until the next board occurrence of this time.
    ///
    /// `now` is truncated to the minute. The occurrence is on `now`'s
    /// calendar date unless this hour is strictly earlier than the current
    /// hour, in which case it is on the following day. Only hours are
    /// compared: at 14:45 a board time of "14:10" is today and yields -35.
    ///
    /// Returns `None` if the local time does not exist in `now`'s zone
    /// (a DST gap). An ambiguous local time resolves to the earlier instant.
    pub fn minutes_until<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<i64> {
        // Truncate on the instant; a local round-trip fails in a repeated hour.
        let now = now.clone()
            - TimeDelta::seconds(i64::from(now.second()))
            - TimeDelta::nanoseconds(i64::from(now.nanosecond()));

        let mut date = now.date_naive();
        if self.hour < now.hour() {
            date = date.succ_opt()?;
        }

        let local = date.and_hms_opt(self.hour, self.minute, 0)?;
        let candidate = now.timezone().from_local_datetime(&local).earliest()?;

        Some(candidate.signed_duration_since(now).num_minutes())
    }
}

/// Normalize a displayed arrival token into minutes until departure.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Unrecognized or malformed tokens yield `minutes: None`; they are never
/// an error.
///
/// # Examples
///
/// ```
/// use board_server::domain::normalize;
/// use chrono::TimeZone;
/// use chrono_tz::Europe::London;
///
/// let now = London.with_ymd_and_hms(2024, 3, 15, 22, 50, 0).unwrap();
///
/// assert_eq!(normalize("Due", &now).minutes, Some(0));
/// assert_eq!(normalize("12 mins", &now).minutes, Some(12));
/// assert_eq!(normalize("23:05", &now).minutes, Some(15));
/// // Earlier hour: tomorrow morning
/// assert_eq!(normalize("00:10", &now).minutes, Some(80));
/// assert_eq!(normalize("Cancelled", &now).minutes, None);
/// ```
pub fn normalize<Tz: TimeZone>(token: &str, now: &DateTime<Tz>) -> ArrivalEstimate {
    let token = token.trim();

    if token.eq_ignore_ascii_case("due") {
        return ArrivalEstimate::due();
    }

    if let Some(count) = strip_minutes_unit(token) {
        let minutes = leading_integer(count);
        if minutes.is_none() {
            debug!(token, "relative arrival without a leading number");
        }
        return ArrivalEstimate::in_minutes(minutes);
    }

    if token.matches(':').count() == 1 {
        return match BoardTime::parse_hhmm(token) {
            Ok(time) => {
                let minutes = time.minutes_until(now);
                if minutes.is_none() {
                    debug!(token, "clock arrival does not exist in the board time zone");
                }
                ArrivalEstimate::in_minutes(minutes)
            }
            Err(e) => {
                debug!(token, error = %e, "malformed clock arrival");
                ArrivalEstimate::in_minutes(None)
            }
        };
    }

    debug!(token, "unrecognized arrival token");
    ArrivalEstimate::in_minutes(None)
}

/// Strip a trailing "mins"/"min" unit (any case), returning the rest.
fn strip_minutes_unit(token: &str) -> Option<&str> {
    ["mins", "min"].into_iter().find_map(|unit| {
        let split = token.len().checked_sub(unit.len())?;
        if !token.is_char_boundary(split) {
            return None;
        }
        let (count, suffix) = token.split_at(split);
        suffix
            .eq_ignore_ascii_case(unit)
            .then(|| count.trim_end())
    })
}

/// Parse the leading run of ASCII digits, ignoring anything after it.
fn leading_integer(s: &str) -> Option<i64> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Parse one or two ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
