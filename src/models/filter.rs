//! Schedule filter models.
//!
//! A filter is a user-configured predicate that a valid schedule must
//! satisfy. The set of filter kinds is closed: [`ScheduleFilter`] is a
//! tagged enum, and the evaluator in [`crate::filter`] matches it
//! exhaustively.
//!
//! Filters arrive from the UI as loosely-typed [`FilterSpec`] records with
//! string operators. Conversion into [`ScheduleFilter`] validates them, so
//! malformed configuration is rejected before it can reach the search.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time::{ClockTime, DaySet};
use crate::error::ConfigError;

/// Filter kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    ClassTime,
    ClassLoad,
    BreakTime,
}

impl FilterKind {
    /// Wire tag (`"class_time"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::ClassTime => "class_time",
            FilterKind::ClassLoad => "class_load",
            FilterKind::BreakTime => "break_time",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class_time" => Ok(FilterKind::ClassTime),
            "class_load" => Ok(FilterKind::ClassLoad),
            "break_time" => Ok(FilterKind::BreakTime),
            _ => Err(ConfigError::UnknownFilterKind { kind: s.to_string() }),
        }
    }
}

/// Comparison for [`ScheduleFilter::ClassTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassTimeOp {
    /// Meetings must start strictly after the filter time.
    StartAfter,
    /// Meetings must start strictly before the filter time.
    StartBefore,
}

impl FromStr for ClassTimeOp {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start_after" => Ok(ClassTimeOp::StartAfter),
            "start_before" => Ok(ClassTimeOp::StartBefore),
            _ => Err(ConfigError::UnknownOperator {
                kind: FilterKind::ClassTime.to_string(),
                operator: s.to_string(),
            }),
        }
    }
}

/// Comparison for [`ScheduleFilter::ClassLoad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassLoadOp {
    AtMost,
    AtLeast,
}

impl FromStr for ClassLoadOp {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "at_most" => Ok(ClassLoadOp::AtMost),
            "at_least" => Ok(ClassLoadOp::AtLeast),
            _ => Err(ConfigError::UnknownOperator {
                kind: FilterKind::ClassLoad.to_string(),
                operator: s.to_string(),
            }),
        }
    }
}

/// What a class-load amount counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadUnit {
    /// Meetings held that day.
    #[default]
    Meetings,
    /// Credit hours of the sections meeting that day.
    CreditHours,
}

impl FromStr for LoadUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meetings" => Ok(LoadUnit::Meetings),
            "credit_hours" => Ok(LoadUnit::CreditHours),
            _ => Err(ConfigError::UnknownOperator {
                kind: FilterKind::ClassLoad.to_string(),
                operator: s.to_string(),
            }),
        }
    }
}

/// A scheduling preference a valid schedule must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "FilterSpec")]
pub enum ScheduleFilter {
    /// Constrains start times of meetings on the given days.
    ClassTime {
        operator: ClassTimeOp,
        time: ClockTime,
        days: DaySet,
    },

    /// Constrains the daily load on each of the given days.
    ClassLoad {
        operator: ClassLoadOp,
        amount: u32,
        #[serde(default)]
        unit: LoadUnit,
        days: DaySet,
    },

    /// Requires `[from, until)` to be free on each of the given days.
    BreakTime {
        from: ClockTime,
        until: ClockTime,
        days: DaySet,
    },
}

impl ScheduleFilter {
    /// Creates a class-time filter.
    pub fn class_time(
        operator: ClassTimeOp,
        time: ClockTime,
        days: DaySet,
    ) -> Result<Self, ConfigError> {
        let filter = Self::ClassTime {
            operator,
            time,
            days,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Creates a class-load filter counting meetings.
    pub fn class_load(operator: ClassLoadOp, amount: u32, days: DaySet) -> Result<Self, ConfigError> {
        Self::class_load_in(operator, amount, LoadUnit::Meetings, days)
    }

    /// Creates a class-load filter with an explicit unit.
    pub fn class_load_in(
        operator: ClassLoadOp,
        amount: u32,
        unit: LoadUnit,
        days: DaySet,
    ) -> Result<Self, ConfigError> {
        let filter = Self::ClassLoad {
            operator,
            amount,
            unit,
            days,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Creates a break-time filter.
    pub fn break_time(from: ClockTime, until: ClockTime, days: DaySet) -> Result<Self, ConfigError> {
        let filter = Self::BreakTime { from, until, days };
        filter.validate()?;
        Ok(filter)
    }

    /// The filter a newly created entry of `kind` starts with.
    ///
    /// Defaults: classes start after 10:00 AM, at most 3 classes a day,
    /// and a free 11:00 AM - 12:00 PM window, all on MWF.
    pub fn default_for(kind: FilterKind) -> Self {
        Self::default_with_unit(kind, LoadUnit::Meetings)
    }

    /// Like [`ScheduleFilter::default_for`], with class-load filters
    /// counting in `unit`.
    pub fn default_with_unit(kind: FilterKind, unit: LoadUnit) -> Self {
        let mwf = DaySet::from_days(&[
            super::Weekday::Mon,
            super::Weekday::Wed,
            super::Weekday::Fri,
        ]);
        match kind {
            FilterKind::ClassTime => Self::ClassTime {
                operator: ClassTimeOp::StartAfter,
                time: ClockTime::at(10, 0),
                days: mwf,
            },
            FilterKind::ClassLoad => Self::ClassLoad {
                operator: ClassLoadOp::AtMost,
                amount: 3,
                unit,
                days: mwf,
            },
            FilterKind::BreakTime => Self::BreakTime {
                from: ClockTime::at(11, 0),
                until: ClockTime::at(12, 0),
                days: mwf,
            },
        }
    }

    /// Kind tag of this filter.
    pub fn kind(&self) -> FilterKind {
        match self {
            Self::ClassTime { .. } => FilterKind::ClassTime,
            Self::ClassLoad { .. } => FilterKind::ClassLoad,
            Self::BreakTime { .. } => FilterKind::BreakTime,
        }
    }

    /// Days the filter applies to.
    pub fn days(&self) -> DaySet {
        match self {
            Self::ClassTime { days, .. }
            | Self::ClassLoad { days, .. }
            | Self::BreakTime { days, .. } => *days,
        }
    }

    /// Checks structural validity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days().is_empty() {
            return Err(ConfigError::EmptyDays {
                kind: self.kind().to_string(),
            });
        }
        if let Self::BreakTime { from, until, .. } = self {
            if until <= from {
                return Err(ConfigError::InvalidBreakWindow {
                    from: from.to_string(),
                    until: until.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Days as sent by the UI: either `"MWF"` or `["M", "W", "F"]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaysField {
    Codes(String),
    List(Vec<String>),
}

impl Default for DaysField {
    fn default() -> Self {
        DaysField::List(Vec::new())
    }
}

impl DaysField {
    fn parse(&self) -> Result<DaySet, ConfigError> {
        match self {
            DaysField::Codes(codes) => codes.parse(),
            DaysField::List(list) => list.concat().parse(),
        }
    }
}

/// Loosely-typed filter record as built by the UI.
///
/// Every field except `type` is optional here; missing or malformed
/// fields are reported when converting into [`ScheduleFilter`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub amount: Option<u32>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
    #[serde(default)]
    pub days: DaysField,
}

impl TryFrom<FilterSpec> for ScheduleFilter {
    type Error = ConfigError;

    fn try_from(spec: FilterSpec) -> Result<Self, Self::Error> {
        let kind: FilterKind = spec.kind.parse()?;
        let days = spec.days.parse()?;
        let operator = spec.operator.as_deref().unwrap_or_default();

        match kind {
            FilterKind::ClassTime => {
                let time = required(kind, "time", spec.time.as_deref())?;
                Self::class_time(operator.parse()?, time, days)
            }
            FilterKind::ClassLoad => {
                let amount = spec.amount.ok_or_else(|| missing(kind, "amount"))?;
                let unit = match spec.unit.as_deref() {
                    Some(u) => u.parse()?,
                    None => LoadUnit::default(),
                };
                Self::class_load_in(operator.parse()?, amount, unit, days)
            }
            FilterKind::BreakTime => {
                let from = required(kind, "from", spec.from.as_deref())?;
                let until = required(kind, "until", spec.until.as_deref())?;
                Self::break_time(from, until, days)
            }
        }
    }
}

fn required(kind: FilterKind, field: &str, value: Option<&str>) -> Result<ClockTime, ConfigError> {
    value.ok_or_else(|| missing(kind, field))?.parse()
}

fn missing(kind: FilterKind, field: &str) -> ConfigError {
    ConfigError::Parse {
        message: format!("{kind} filter is missing '{field}'"),
    }
}

/// A filter entry in the user's filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Stable entry identifier.
    pub id: u32,
    /// Whether the filter takes part in generation.
    pub enabled: bool,
    /// The filter itself.
    pub filter: ScheduleFilter,
}

/// The user's editable list of filters.
///
/// Entries are independently toggleable; only enabled entries are
/// applied. Any edit marks the set as changed until [`FilterSet::mark_applied`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
    #[serde(skip)]
    changed: bool,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a default filter of `kind` and returns its ID.
    pub fn create(&mut self, kind: FilterKind) -> u32 {
        self.push(ScheduleFilter::default_for(kind))
    }

    /// Adds a default filter of `kind`, class-load filters counting in `unit`.
    pub fn create_with_unit(&mut self, kind: FilterKind, unit: LoadUnit) -> u32 {
        self.push(ScheduleFilter::default_with_unit(kind, unit))
    }

    /// Adds a filter (enabled) and returns its ID.
    ///
    /// The filter is validated first; a malformed filter is rejected and
    /// the set is left unchanged.
    pub fn add(&mut self, filter: ScheduleFilter) -> Result<u32, ConfigError> {
        filter.validate()?;
        Ok(self.push(filter))
    }

    fn push(&mut self, filter: ScheduleFilter) -> u32 {
        let id = self.entries.iter().map(|e| e.id + 1).max().unwrap_or(0);
        self.entries.push(FilterEntry {
            id,
            enabled: true,
            filter,
        });
        self.changed = true;
        id
    }

    /// Replaces the filter with `id`. Returns `Ok(false)` if no such entry.
    ///
    /// A malformed replacement is rejected and the entry is kept.
    pub fn update(&mut self, id: u32, filter: ScheduleFilter) -> Result<bool, ConfigError> {
        filter.validate()?;
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.filter = filter;
                self.changed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enables or disables the filter with `id`. Returns false if no such entry.
    pub fn set_enabled(&mut self, id: u32, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                if entry.enabled != enabled {
                    entry.enabled = enabled;
                    self.changed = true;
                }
                true
            }
            None => false,
        }
    }

    /// Removes the filter with `id`. Returns false if no such entry.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        self.changed |= removed;
        removed
    }

    /// Looks up an entry.
    pub fn get(&self, id: u32) -> Option<&FilterEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// All entries in creation order.
    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Enabled filters, in creation order.
    pub fn active(&self) -> Vec<ScheduleFilter> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.filter.clone())
            .collect()
    }

    /// Whether the set was edited since it was last applied.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Clears the changed flag.
    pub fn mark_applied(&mut self) {
        self.changed = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
