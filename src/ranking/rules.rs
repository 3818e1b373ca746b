//! Built-in sort rules.
//!
//! # Categories
//!
//! - **Time of day**: EARLIEST_START, LATEST_START, EARLIEST_END
//! - **Compactness**: LEAST_IDLE, FEWEST_DAYS
//! - **Availability**: MOST_OPEN_SEATS
//!
//! # Score Convention
//! All rules return lower scores for schedules that should rank first.
//! Schedules without timed meetings score last on the time-of-day rules.

use super::{RuleScore, SortRule};
use crate::models::Schedule;

// ======================== Time-of-day rules ========================

/// Earliest average daily start.
///
/// Averages, over days with classes, the start of the first class.
#[derive(Debug, Clone, Copy)]
pub struct EarliestStart;

impl SortRule for EarliestStart {
    fn name(&self) -> &'static str {
        "EARLIEST_START"
    }

    fn evaluate(&self, schedule: &Schedule) -> RuleScore {
        schedule.average_daily_start().unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Earliest Average Start"
    }
}

/// Latest average daily start.
///
/// For students who would rather not have early classes.
#[derive(Debug, Clone, Copy)]
pub struct LatestStart;

impl SortRule for LatestStart {
    fn name(&self) -> &'static str {
        "LATEST_START"
    }

    fn evaluate(&self, schedule: &Schedule) -> RuleScore {
        schedule
            .average_daily_start()
            .map(|m| -m)
            .unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Latest Average Start"
    }
}

/// Earliest average daily end.
#[derive(Debug, Clone, Copy)]
pub struct EarliestEnd;

impl SortRule for EarliestEnd {
    fn name(&self) -> &'static str {
        "EARLIEST_END"
    }

    fn evaluate(&self, schedule: &Schedule) -> RuleScore {
        schedule.average_daily_end().unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Earliest Average End"
    }
}

// ======================== Compactness rules ========================

/// Least idle time between classes, summed over the week.
#[derive(Debug, Clone, Copy)]
pub struct LeastIdle;

impl SortRule for LeastIdle {
    fn name(&self) -> &'static str {
        "LEAST_IDLE"
    }

    fn evaluate(&self, schedule: &Schedule) -> RuleScore {
        schedule.idle_minutes() as f64
    }

    fn description(&self) -> &'static str {
        "Least Idle Time"
    }
}

/// Fewest days with timed classes.
#[derive(Debug, Clone, Copy)]
pub struct FewestDays;

impl SortRule for FewestDays {
    fn name(&self) -> &'static str {
        "FEWEST_DAYS"
    }

    fn evaluate(&self, schedule: &Schedule) -> RuleScore {
        schedule.days_on_campus() as f64
    }

    fn description(&self) -> &'static str {
        "Fewest Days On Campus"
    }
}

// ======================== Availability rule ========================

/// Most open seats across the chosen sections.
#[derive(Debug, Clone, Copy)]
pub struct MostOpenSeats;

impl SortRule for MostOpenSeats {
    fn name(&self) -> &'static str {
        "MOST_OPEN_SEATS"
    }

    fn evaluate(&self, schedule: &Schedule) -> RuleScore {
        -(schedule.open_seats() as f64)
    }

    fn description(&self) -> &'static str {
        "Most Open Seats"
    }
}
