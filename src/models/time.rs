//! Weekly time model.
//!
//! Defines weekdays, compact day sets, clock times, and minute ranges.
//!
//! # Time Model
//! All times are minutes since midnight of an unspecified day in the week.
//! A meeting whose time is unknown carries no [`TimeRange`] at all; it
//! never overlaps anything.
//!
//! # Day Codes
//! Day sets use the registrar's single-letter codes: `M T W R F S U`
//! (Monday through Sunday). `"MWF"` and `"TR"` are the common patterns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All weekdays, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Registrar day code.
    pub fn code(self) -> char {
        match self {
            Weekday::Mon => 'M',
            Weekday::Tue => 'T',
            Weekday::Wed => 'W',
            Weekday::Thu => 'R',
            Weekday::Fri => 'F',
            Weekday::Sat => 'S',
            Weekday::Sun => 'U',
        }
    }

    /// Parses a registrar day code (case-insensitive).
    pub fn from_code(code: char) -> Result<Self, ConfigError> {
        match code.to_ascii_uppercase() {
            'M' => Ok(Weekday::Mon),
            'T' => Ok(Weekday::Tue),
            'W' => Ok(Weekday::Wed),
            'R' => Ok(Weekday::Thu),
            'F' => Ok(Weekday::Fri),
            'S' => Ok(Weekday::Sat),
            'U' => Ok(Weekday::Sun),
            _ => Err(ConfigError::InvalidDay { code }),
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A set of weekdays stored as a 7-bit mask.
///
/// Intersection and membership are single bit operations.
/// Serialized as a day-code string such as `"MWF"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DaySet(u8);

impl DaySet {
    /// The empty set.
    pub const EMPTY: DaySet = DaySet(0);

    /// Monday through Friday.
    pub const WEEKDAYS: DaySet = DaySet(0b001_1111);

    /// Creates a set from a list of days.
    pub fn from_days(days: &[Weekday]) -> Self {
        days.iter().fold(DaySet::EMPTY, |set, &d| set.with(d))
    }

    /// Returns a copy with `day` added.
    pub fn with(self, day: Weekday) -> Self {
        DaySet(self.0 | day.bit())
    }

    /// Whether `day` is in the set.
    #[inline]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    /// Set intersection.
    #[inline]
    pub fn intersection(self, other: DaySet) -> DaySet {
        DaySet(self.0 & other.0)
    }

    /// Set union.
    #[inline]
    pub fn union(self, other: DaySet) -> DaySet {
        DaySet(self.0 | other.0)
    }

    /// Whether the two sets share at least one day.
    #[inline]
    pub fn intersects(self, other: DaySet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of days in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the days in week order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromStr for DaySet {
    type Err = ConfigError;

    /// Parses day codes, ignoring whitespace and repeated days.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .try_fold(DaySet::EMPTY, |set, c| Ok(set.with(Weekday::from_code(c)?)))
    }
}

impl TryFrom<String> for DaySet {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DaySet> for String {
    fn from(set: DaySet) -> Self {
        set.to_string()
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.iter() {
            write!(f, "{}", day.code())?;
        }
        Ok(())
    }
}

/// A minute-of-day clock time.
///
/// Parsed from `"HH:MM"` in 24h form or with an `AM`/`PM` suffix.
/// Serialized in 12h form (`"10:00 AM"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Creates a clock time from minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self, ConfigError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ConfigError::invalid_time(
                minutes.to_string(),
                "minute of day out of range",
            ));
        }
        Ok(ClockTime(minutes))
    }

    /// Creates a clock time from an hour (0-23) and minute.
    pub fn hm(hour: u16, minute: u16) -> Result<Self, ConfigError> {
        if hour > 23 || minute > 59 {
            return Err(ConfigError::invalid_time(
                format!("{hour}:{minute:02}"),
                "hour or minute out of range",
            ));
        }
        Ok(ClockTime(hour * 60 + minute))
    }

    // Callers pass in-range constants.
    pub(crate) const fn at(hour: u16, minute: u16) -> Self {
        ClockTime(hour * 60 + minute)
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_clock_time(s)?
            .map(ClockTime)
            .ok_or_else(|| ConfigError::invalid_time(s, "empty time"))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = self.0 / 60;
        let minute = self.0 % 60;
        let (display_hour, suffix) = match hour {
            0 => (12, "AM"),
            1..=11 => (hour, "AM"),
            12 => (12, "PM"),
            _ => (hour - 12, "PM"),
        };
        write!(f, "{display_hour}:{minute:02} {suffix}")
    }
}

/// Parses a clock time into minutes since midnight.
///
/// Accepts `"HH:MM"` (24h) and `"H:MM AM"` / `"H:MMpm"` (12h).
/// An empty or blank string means "time unknown" and yields `Ok(None)`.
///
/// # Examples
/// ```
/// use course_planner::models::parse_clock_time;
///
/// assert_eq!(parse_clock_time("09:30").unwrap(), Some(570));
/// assert_eq!(parse_clock_time("12:15 AM").unwrap(), Some(15));
/// assert_eq!(parse_clock_time("1:00pm").unwrap(), Some(780));
/// assert_eq!(parse_clock_time("").unwrap(), None);
/// ```
pub fn parse_clock_time(input: &str) -> Result<Option<u16>, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let upper = trimmed.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (h, m) = clock
        .split_once(':')
        .ok_or_else(|| ConfigError::invalid_time(input, "expected HH:MM"))?;
    let hour: u16 = h
        .parse()
        .map_err(|_| ConfigError::invalid_time(input, "hour is not a number"))?;
    let minute: u16 = m
        .parse()
        .map_err(|_| ConfigError::invalid_time(input, "minute is not a number"))?;
    if minute > 59 {
        return Err(ConfigError::invalid_time(input, "minute out of range"));
    }

    let hour = match meridiem {
        None if hour <= 23 => hour,
        Some(pm) if (1..=12).contains(&hour) => match (pm, hour) {
            (false, 12) => 0,
            (false, h) => h,
            (true, 12) => 12,
            (true, h) => h + 12,
        },
        _ => return Err(ConfigError::invalid_time(input, "hour out of range")),
    };

    Ok(Some(hour * 60 + minute))
}

/// A half-open minute range [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start minute (inclusive).
    pub start: u16,
    /// End minute (exclusive).
    pub end: u16,
}

impl TimeRange {
    /// Creates a new range.
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Length in minutes (0 for an inverted range).
    #[inline]
    pub fn duration(&self) -> u16 {
        self.end.saturating_sub(self.start)
    }

    /// Whether a minute falls within this range.
    #[inline]
    pub fn contains(&self, minute: u16) -> bool {
        minute >= self.start && minute < self.end
    }

    /// Whether two ranges overlap. Touching ranges do not.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}
