//! Ranking rules, rule engine, and pagination for generated schedules.
//!
//! Provides score-based sort rules (earliest start, least idle time, ...)
//! and a composable engine that orders schedules by one or more rules.
//! Sorting is stable: schedules with equal scores keep the order the
//! combination search produced them in.
//!
//! # Usage
//!
//! ```
//! use course_planner::models::{Meeting, Section};
//! use course_planner::ranking::{rules, RankingEngine};
//! use course_planner::search::{CancellationToken, CombinationSearch, CoursePool};
//!
//! let pools = vec![CoursePool::new("CSE174", vec![
//!     Section::new("A").with_meeting(Meeting::new("MWF".parse().unwrap(), 540, 590)),
//!     Section::new("B").with_meeting(Meeting::new("TR".parse().unwrap(), 540, 615)),
//! ])];
//! let token = CancellationToken::new();
//! let schedules = CombinationSearch::new(&pools, &token).run().unwrap();
//!
//! let engine = RankingEngine::new()
//!     .with_rule(rules::FewestDays)
//!     .with_tie_breaker(rules::LeastIdle);
//! let ordered = engine.sort(schedules);
//! assert_eq!(ordered[0].section_ids(), vec!["B"]);
//! ```

mod engine;
mod page;
pub mod rules;

pub use engine::{EvaluationMode, RankingEngine};
pub use page::{page, Page, Pager, ViewMode};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::models::Schedule;

/// Score returned by a sort rule.
///
/// Lower scores rank first.
pub type RuleScore = f64;

/// A rule that scores a schedule for ordering.
///
/// # Score Convention
/// **Lower score = ranked earlier.** Rules preferring larger metrics
/// negate them.
pub trait SortRule: Send + Sync + Debug {
    /// Rule name (e.g., "EARLIEST_START").
    fn name(&self) -> &'static str;

    /// Scores a schedule.
    fn evaluate(&self, schedule: &Schedule) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// User-selectable sort key.
///
/// New keys can be added without touching the engine: each maps to a
/// [`RankingEngine`] in [`ScheduleSort::engine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSort {
    /// Search order.
    #[default]
    Default,
    /// Earliest average first class of the day.
    EarliestStart,
    /// Latest average first class of the day.
    LatestStart,
    /// Earliest average last class of the day.
    EarliestEnd,
    /// Fewest minutes between classes.
    LeastIdle,
    /// Fewest days on campus, then least idle time.
    FewestDays,
    /// Most open seats.
    MostOpenSeats,
    /// Fewest days on campus and least idle time, traded off: one extra
    /// day on campus costs as much as [`COMPACT_WEEK_DAY_WEIGHT`] idle minutes.
    CompactWeek,
}

/// Idle minutes one campus day is worth under [`ScheduleSort::CompactWeek`].
pub const COMPACT_WEEK_DAY_WEIGHT: f64 = 60.0;

impl ScheduleSort {
    /// All sort keys.
    pub const ALL: [ScheduleSort; 8] = [
        ScheduleSort::Default,
        ScheduleSort::EarliestStart,
        ScheduleSort::LatestStart,
        ScheduleSort::EarliestEnd,
        ScheduleSort::LeastIdle,
        ScheduleSort::FewestDays,
        ScheduleSort::MostOpenSeats,
        ScheduleSort::CompactWeek,
    ];

    /// The ranking engine implementing this key.
    pub fn engine(self) -> RankingEngine {
        let engine = RankingEngine::new();
        match self {
            ScheduleSort::Default => engine,
            ScheduleSort::EarliestStart => engine.with_rule(rules::EarliestStart),
            ScheduleSort::LatestStart => engine.with_rule(rules::LatestStart),
            ScheduleSort::EarliestEnd => engine.with_rule(rules::EarliestEnd),
            ScheduleSort::LeastIdle => engine
                .with_rule(rules::LeastIdle)
                .with_tie_breaker(rules::FewestDays),
            ScheduleSort::FewestDays => engine
                .with_rule(rules::FewestDays)
                .with_tie_breaker(rules::LeastIdle),
            ScheduleSort::MostOpenSeats => engine.with_rule(rules::MostOpenSeats),
            ScheduleSort::CompactWeek => engine
                .with_mode(EvaluationMode::Weighted)
                .with_weighted_rule(rules::FewestDays, COMPACT_WEEK_DAY_WEIGHT)
                .with_weighted_rule(rules::LeastIdle, 1.0),
        }
    }

    /// Orders schedules by this key.
    pub fn sort(self, schedules: Vec<Schedule>) -> Vec<Schedule> {
        self.engine().sort(schedules)
    }
}
