//! Course planning domain models.
//!
//! Provides the data types the generation engine works on: the weekly
//! time model, courses with their sections and meetings, generated
//! schedules, and the user's schedule filters.
//!
//! # Domain Mapping
//!
//! | Model | Registrar term |
//! |-------|----------------|
//! | Course | Course (subject + number) |
//! | Section | Course section (CRN) |
//! | Meeting | Scheduled meeting pattern |
//! | Schedule | One section per selected course |

mod course;
mod filter;
mod schedule;
mod time;

pub use course::{Course, Meeting, Section};
pub use filter::{
    ClassLoadOp, ClassTimeOp, DaysField, FilterEntry, FilterKind, FilterSet, FilterSpec,
    LoadUnit, ScheduleFilter,
};
pub use schedule::{Schedule, ScheduledSection};
pub use time::{parse_clock_time, ClockTime, DaySet, TimeRange, Weekday, MINUTES_PER_DAY};
