//! Course, section, and meeting models.
//!
//! A course is offered as one or more sections. Each section meets on a
//! weekly pattern described by its meetings. Courses are built by the
//! catalog collaborator and are immutable once fetched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::time::{DaySet, TimeRange, Weekday};

/// A course the student selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code (e.g. `"CSE174"`).
    pub code: String,
    /// Academic term code.
    pub term: String,
    /// Subject code (e.g. `"CSE"`).
    #[serde(default)]
    pub subject: String,
    /// Catalog number (e.g. `"174"`).
    #[serde(default)]
    pub number: String,
    /// Course title.
    #[serde(default)]
    pub title: String,
    /// Offered sections, in catalog order.
    pub sections: Vec<Section>,
}

impl Course {
    /// Creates a course with no sections.
    pub fn new(code: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            term: term.into(),
            subject: String::new(),
            number: String::new(),
            title: String::new(),
            sections: Vec::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets subject and catalog number.
    pub fn with_subject(mut self, subject: impl Into<String>, number: impl Into<String>) -> Self {
        self.subject = subject.into();
        self.number = number.into();
        self
    }

    /// Adds a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Finds a section by ID.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Number of offered sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// One offered instance of a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    /// Identifier unique within the course (registrar CRN).
    pub id: String,
    /// Section code (e.g. `"A"`).
    #[serde(default)]
    pub name: String,
    /// Available seats. Informational only.
    pub slots: i32,
    /// Possible credit hour values, ascending and unique.
    pub credit_hours: Vec<u8>,
    /// Weekly meetings.
    pub meetings: Vec<Meeting>,
}

impl Section {
    /// Creates a section with no meetings.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            slots: 0,
            credit_hours: Vec::new(),
            meetings: Vec::new(),
        }
    }

    /// Sets the section code.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of available seats.
    pub fn with_slots(mut self, slots: i32) -> Self {
        self.slots = slots;
        self
    }

    /// Sets credit hours from a low/high range, collapsing duplicates.
    pub fn with_credit_range(mut self, low: u8, high: u8) -> Self {
        let unique: BTreeSet<u8> = [low, high].into_iter().collect();
        self.credit_hours = unique.into_iter().collect();
        self
    }

    /// Sets a single credit hour value.
    pub fn with_credits(self, credits: u8) -> Self {
        self.with_credit_range(credits, credits)
    }

    /// Adds a meeting.
    pub fn with_meeting(mut self, meeting: Meeting) -> Self {
        self.meetings.push(meeting);
        self
    }

    /// Lowest credit value this section can be taken for (0 if unknown).
    pub fn min_credits(&self) -> u8 {
        self.credit_hours.iter().copied().min().unwrap_or(0)
    }

    /// Whether any meeting of this section falls on `day`.
    pub fn meets_on(&self, day: Weekday) -> bool {
        self.meetings.iter().any(|m| m.days.contains(day))
    }

    /// Union of all meeting days.
    pub fn days(&self) -> DaySet {
        self.meetings
            .iter()
            .fold(DaySet::EMPTY, |acc, m| acc.union(m.days))
    }
}

/// A recurring weekly time block of a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meeting {
    /// Days the meeting occurs.
    pub days: DaySet,
    /// Meeting time. `None` when the registrar lists no time.
    pub time: Option<TimeRange>,
    /// Building and room. Not interpreted.
    #[serde(default)]
    pub location: String,
}

impl Meeting {
    /// Creates a timed meeting.
    pub fn new(days: DaySet, start: u16, end: u16) -> Self {
        Self {
            days,
            time: Some(TimeRange::new(start, end)),
            location: String::new(),
        }
    }

    /// Creates a meeting whose time is unknown.
    pub fn untimed(days: DaySet) -> Self {
        Self {
            days,
            time: None,
            location: String::new(),
        }
    }

    /// Creates a meeting from raw registrar minutes.
    ///
    /// A negative start or end (the registrar's `-1`) means the time is
    /// unknown.
    pub fn from_minutes(days: DaySet, start: i32, end: i32) -> Self {
        let time = match (u16::try_from(start), u16::try_from(end)) {
            (Ok(s), Ok(e)) => Some(TimeRange::new(s, e)),
            _ => None,
        };
        Self {
            days,
            time,
            location: String::new(),
        }
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Start minute, if timed.
    #[inline]
    pub fn start(&self) -> Option<u16> {
        self.time.map(|t| t.start)
    }

    /// Whether the meeting has a known time.
    #[inline]
    pub fn is_timed(&self) -> bool {
        self.time.is_some()
    }
}
