//! Schedule (solution) model.
//!
//! A schedule assigns exactly one section to every selected course.
//! Schedules produced by the combination search are conflict-free; they
//! are value objects compared by content and never mutated afterwards.
//!
//! The metric helpers here feed the ranking rules in [`crate::ranking`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::course::Section;
use super::time::{DaySet, TimeRange, Weekday};

/// One complete assignment of a section to each selected course.
///
/// Entries follow course selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schedule {
    /// Chosen sections, one per course.
    pub entries: Vec<ScheduledSection>,
}

/// A course → section pair within a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledSection {
    /// Course code.
    pub course_code: String,
    /// Chosen section (shared with the course pool).
    pub section: Arc<Section>,
}

impl ScheduledSection {
    /// Creates a new entry.
    pub fn new(course_code: impl Into<String>, section: Arc<Section>) -> Self {
        Self {
            course_code: course_code.into(),
            section,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule from entries.
    pub fn from_entries(entries: Vec<ScheduledSection>) -> Self {
        Self { entries }
    }

    /// Finds the section chosen for a course.
    pub fn section_for(&self, course_code: &str) -> Option<&Section> {
        self.entries
            .iter()
            .find(|e| e.course_code == course_code)
            .map(|e| e.section.as_ref())
    }

    /// Section IDs in course order.
    pub fn section_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.section.id.as_str()).collect()
    }

    /// Number of courses scheduled.
    pub fn course_count(&self) -> usize {
        self.entries.len()
    }

    /// Timed meeting blocks on `day`, sorted by start.
    pub fn blocks_on(&self, day: Weekday) -> Vec<TimeRange> {
        let mut blocks: Vec<TimeRange> = self
            .entries
            .iter()
            .flat_map(|e| e.section.meetings.iter())
            .filter(|m| m.days.contains(day))
            .filter_map(|m| m.time)
            .collect();
        blocks.sort_by_key(|b| (b.start, b.end));
        blocks
    }

    /// Days with at least one meeting (timed or not).
    pub fn days(&self) -> DaySet {
        self.entries
            .iter()
            .fold(DaySet::EMPTY, |acc, e| acc.union(e.section.days()))
    }

    /// Number of days with timed meetings.
    pub fn days_on_campus(&self) -> usize {
        Weekday::ALL
            .iter()
            .filter(|&&d| !self.blocks_on(d).is_empty())
            .count()
    }

    /// Mean over class days of the first meeting's start minute.
    ///
    /// Returns `None` if the schedule has no timed meetings.
    pub fn average_daily_start(&self) -> Option<f64> {
        self.average_over_days(|blocks| blocks.first().map(|b| b.start))
    }

    /// Mean over class days of the last meeting's end minute.
    pub fn average_daily_end(&self) -> Option<f64> {
        self.average_over_days(|blocks| blocks.iter().map(|b| b.end).max())
    }

    /// Total minutes between consecutive meetings, summed over the week.
    pub fn idle_minutes(&self) -> u32 {
        Weekday::ALL
            .iter()
            .map(|&d| {
                let blocks = self.blocks_on(d);
                let mut idle = 0u32;
                let mut busy_until: Option<u16> = None;
                for b in &blocks {
                    if let Some(until) = busy_until {
                        idle += b.start.saturating_sub(until) as u32;
                    }
                    busy_until = Some(busy_until.map_or(b.end, |u| u.max(b.end)));
                }
                idle
            })
            .sum()
    }

    /// Sum of available seats across chosen sections.
    pub fn open_seats(&self) -> i64 {
        self.entries.iter().map(|e| e.section.slots as i64).sum()
    }

    /// Minimum total credit hours.
    pub fn total_credits(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.section.min_credits() as u32)
            .sum()
    }

    fn average_over_days(&self, pick: impl Fn(&[TimeRange]) -> Option<u16>) -> Option<f64> {
        let values: Vec<u16> = Weekday::ALL
            .iter()
            .filter_map(|&d| pick(&self.blocks_on(d)))
            .collect();
        if values.is_empty() {
            return None;
        }
        let sum: u32 = values.iter().map(|&v| v as u32).sum();
        Some(sum as f64 / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Meeting;

    fn days(s: &str) -> DaySet {
        s.parse().unwrap()
    }

    fn entry(course: &str, section: Section) -> ScheduledSection {
        ScheduledSection::new(course, Arc::new(section))
    }

    fn sample_schedule() -> Schedule {
        Schedule::from_entries(vec![
            entry(
                "CSE174",
                Section::new("A")
                    .with_slots(5)
                    .with_credits(3)
                    .with_meeting(Meeting::new(days("MWF"), 540, 590)),
            ),
            entry(
                "MTH151",
                Section::new("B")
                    .with_slots(2)
                    .with_credit_range(4, 5)
                    .with_meeting(Meeting::new(days("MW"), 660, 710))
                    .with_meeting(Meeting::new(days("T"), 780, 830)),
            ),
            entry(
                "ENG111",
                Section::new("C")
                    .with_slots(-1)
                    .with_meeting(Meeting::untimed(days("F"))),
            ),
        ])
    }

    #[test]
    fn test_section_lookup() {
        let s = sample_schedule();
        assert_eq!(s.section_for("MTH151").unwrap().id, "B");
        assert!(s.section_for("BIO101").is_none());
        assert_eq!(s.section_ids(), vec!["A", "B", "C"]);
        assert_eq!(s.course_count(), 3);
    }

    #[test]
    fn test_blocks_on_sorted_and_timed_only() {
        let s = sample_schedule();
        let mon = s.blocks_on(Weekday::Mon);
        assert_eq!(mon, vec![TimeRange::new(540, 590), TimeRange::new(660, 710)]);
        // The Friday ENG111 meeting has no time.
        assert_eq!(s.blocks_on(Weekday::Fri), vec![TimeRange::new(540, 590)]);
        assert!(s.blocks_on(Weekday::Sat).is_empty());
    }

    #[test]
    fn test_idle_minutes() {
        let s = sample_schedule();
        // Mon 590→660 and Wed 590→660.
        assert_eq!(s.idle_minutes(), 140);
    }

    #[test]
    fn test_daily_averages() {
        let s = sample_schedule();
        // Starts: M 540, T 780, W 540, F 540.
        let start = s.average_daily_start().unwrap();
        assert!((start - 600.0).abs() < 1e-10);
        // Ends: M 710, T 830, W 710, F 590.
        let end = s.average_daily_end().unwrap();
        assert!((end - 710.0).abs() < 1e-10);
        assert_eq!(s.days_on_campus(), 4);
    }

    #[test]
    fn test_seats_and_credits() {
        let s = sample_schedule();
        assert_eq!(s.open_seats(), 6);
        assert_eq!(s.total_credits(), 7);
        assert_eq!(s.days(), days("MTWF"));
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert_eq!(s.idle_minutes(), 0);
        assert_eq!(s.average_daily_start(), None);
        assert_eq!(s.days_on_campus(), 0);
        assert_eq!(s.course_count(), 0);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(sample_schedule(), sample_schedule());
    }
}
