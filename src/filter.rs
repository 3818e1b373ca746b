//! Filter evaluation.
//!
//! Applies the user's [`ScheduleFilter`]s to candidate schedules. A
//! schedule is valid iff it satisfies every filter; filters are
//! independent of one another, so evaluation order never changes the
//! verdict.
//!
//! # Semantics
//!
//! | Filter | Passes when |
//! |--------|-------------|
//! | `ClassTime start_after t` | every timed meeting on a listed day starts strictly after `t` |
//! | `ClassTime start_before t` | every timed meeting on a listed day starts strictly before `t` |
//! | `ClassLoad at_most n` | every listed day carries a load ≤ `n` |
//! | `ClassLoad at_least n` | every listed day carries a load ≥ `n` |
//! | `BreakTime from..until` | on every listed day with timed meetings, none overlaps `[from, until)` |
//!
//! Meetings without a known time are ignored by the time-based filters but
//! still count toward a day's class load.

use crate::models::{
    ClassLoadOp, ClassTimeOp, LoadUnit, Schedule, ScheduleFilter, TimeRange, Weekday,
};

/// Whether `schedule` satisfies every filter in `filters`.
///
/// Short-circuits on the first failing filter.
pub fn is_valid(schedule: &Schedule, filters: &[ScheduleFilter]) -> bool {
    filters.iter().all(|f| satisfies(schedule, f))
}

/// Index of the first filter `schedule` fails, if any.
pub fn first_violation(schedule: &Schedule, filters: &[ScheduleFilter]) -> Option<usize> {
    filters.iter().position(|f| !satisfies(schedule, f))
}

/// Keeps the schedules that satisfy every filter, preserving order.
pub fn retain_valid(schedules: Vec<Schedule>, filters: &[ScheduleFilter]) -> Vec<Schedule> {
    if filters.is_empty() {
        return schedules;
    }
    schedules
        .into_iter()
        .filter(|s| is_valid(s, filters))
        .collect()
}

/// Whether `schedule` satisfies a single filter.
pub fn satisfies(schedule: &Schedule, filter: &ScheduleFilter) -> bool {
    match filter {
        ScheduleFilter::ClassTime {
            operator,
            time,
            days,
        } => {
            let limit = time.minutes();
            schedule
                .entries
                .iter()
                .flat_map(|e| e.section.meetings.iter())
                .filter(|m| m.days.intersects(*days))
                .filter_map(|m| m.start())
                .all(|start| match operator {
                    ClassTimeOp::StartAfter => start > limit,
                    ClassTimeOp::StartBefore => start < limit,
                })
        }

        ScheduleFilter::ClassLoad {
            operator,
            amount,
            unit,
            days,
        } => days.iter().all(|day| {
            let load = daily_load(schedule, day, *unit);
            match operator {
                ClassLoadOp::AtMost => load <= *amount,
                ClassLoadOp::AtLeast => load >= *amount,
            }
        }),

        ScheduleFilter::BreakTime { from, until, days } => {
            let window = TimeRange::new(from.minutes(), until.minutes());
            days.iter()
                .all(|day| schedule.blocks_on(day).iter().all(|b| !b.overlaps(&window)))
        }
    }
}

/// Load carried on one day, in the given unit.
///
/// `Meetings` counts every meeting held that day. `CreditHours` sums the
/// lowest credit value of each section meeting that day, once per section.
pub fn daily_load(schedule: &Schedule, day: Weekday, unit: LoadUnit) -> u32 {
    match unit {
        LoadUnit::Meetings => schedule
            .entries
            .iter()
            .flat_map(|e| e.section.meetings.iter())
            .filter(|m| m.days.contains(day))
            .count() as u32,
        LoadUnit::CreditHours => schedule
            .entries
            .iter()
            .filter(|e| e.section.meets_on(day))
            .map(|e| e.section.min_credits() as u32)
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClockTime, DaySet, FilterKind, Meeting, ScheduledSection, Section,
    };
    use crate::search::{CancellationToken, CombinationSearch, CoursePool};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn days(s: &str) -> DaySet {
        s.parse().unwrap()
    }

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn section(id: &str, d: &str, start: u16, end: u16) -> Section {
        Section::new(id).with_meeting(Meeting::new(days(d), start, end))
    }

    fn schedule(sections: Vec<Section>) -> Schedule {
        Schedule::from_entries(
            sections
                .into_iter()
                .enumerate()
                .map(|(i, s)| ScheduledSection::new(format!("C{i}"), Arc::new(s)))
                .collect(),
        )
    }

    /// Conflict-free combinations of the A/B scenario: {A1,B2}, {A2,B2}.
    fn scenario_schedules() -> Vec<Schedule> {
        let pools = vec![
            CoursePool::new(
                "A",
                vec![section("A1", "M", 540, 590), section("A2", "M", 600, 650)],
            ),
            CoursePool::new(
                "B",
                vec![section("B1", "M", 570, 620), section("B2", "T", 540, 590)],
            ),
        ];
        let token = CancellationToken::new();
        CombinationSearch::new(&pools, &token).run().unwrap()
    }

    #[test]
    fn test_start_after_boundary_is_exclusive() {
        let filter =
            ScheduleFilter::class_time(ClassTimeOp::StartAfter, t("10:00"), days("M")).unwrap();
        let all = scenario_schedules();
        assert_eq!(all.len(), 2);

        // {A1,B2}: A1 starts 09:00 on Monday.
        assert!(!satisfies(&all[0], &filter));
        // {A2,B2}: A2 starts exactly 10:00, which is not after 10:00.
        assert!(!satisfies(&all[1], &filter));

        // B1 starts 09:30 on Monday, so {A2,B1} would fail as well.
        let a2_b1 = schedule(vec![section("A2", "M", 600, 650), section("B1", "M", 570, 620)]);
        assert!(!satisfies(&a2_b1, &filter));

        assert!(retain_valid(all, &[filter]).is_empty());
    }

    #[test]
    fn test_start_after_one_minute_earlier_keeps_a2() {
        let filter =
            ScheduleFilter::class_time(ClassTimeOp::StartAfter, t("09:59"), days("M")).unwrap();
        let valid = retain_valid(scenario_schedules(), &[filter]);
        let ids: Vec<_> = valid.iter().map(|s| s.section_ids()).collect();
        // B2 meets Tuesday only, so it is unconstrained.
        assert_eq!(ids, vec![vec!["A2", "B2"]]);
    }

    #[test]
    fn test_start_before() {
        let filter =
            ScheduleFilter::class_time(ClassTimeOp::StartBefore, t("10:00"), days("M")).unwrap();
        let s = schedule(vec![section("X", "M", 599, 700)]);
        assert!(satisfies(&s, &filter));
        let s = schedule(vec![section("X", "M", 600, 700)]);
        assert!(!satisfies(&s, &filter));
    }

    #[test]
    fn test_class_time_ignores_untimed_and_other_days() {
        let filter = ScheduleFilter::default_for(FilterKind::ClassTime); // after 10 AM MWF
        let s = schedule(vec![
            Section::new("online").with_meeting(Meeting::untimed(days("MWF"))),
            section("tue", "TR", 480, 530),
        ]);
        assert!(satisfies(&s, &filter));
    }

    #[test]
    fn test_class_load_at_most_meetings() {
        let filter = ScheduleFilter::class_load(ClassLoadOp::AtMost, 2, days("MW")).unwrap();
        let two = schedule(vec![section("A", "MW", 540, 590), section("B", "M", 600, 650)]);
        assert!(satisfies(&two, &filter)); // Mon 2, Wed 1

        let three = schedule(vec![
            section("A", "MW", 540, 590),
            section("B", "M", 600, 650),
            Section::new("C").with_meeting(Meeting::untimed(days("M"))),
        ]);
        assert!(!satisfies(&three, &filter)); // Mon 3, untimed counts
    }

    #[test]
    fn test_class_load_at_least() {
        let filter = ScheduleFilter::class_load(ClassLoadOp::AtLeast, 1, days("MT")).unwrap();
        let mon_only = schedule(vec![section("A", "M", 540, 590)]);
        assert!(!satisfies(&mon_only, &filter)); // Tue carries 0
        let both = schedule(vec![section("A", "MT", 540, 590)]);
        assert!(satisfies(&both, &filter));
    }

    #[test]
    fn test_class_load_credit_hours() {
        let filter = ScheduleFilter::class_load_in(
            ClassLoadOp::AtMost,
            6,
            LoadUnit::CreditHours,
            days("M"),
        )
        .unwrap();
        let s = schedule(vec![
            section("A", "M", 540, 590).with_credits(3),
            // Two Monday meetings, counted once.
            section("B", "M", 600, 650)
                .with_meeting(Meeting::new(days("M"), 780, 830))
                .with_credit_range(3, 4),
        ]);
        assert_eq!(daily_load(&s, Weekday::Mon, LoadUnit::CreditHours), 6);
        assert_eq!(daily_load(&s, Weekday::Mon, LoadUnit::Meetings), 3);
        assert!(satisfies(&s, &filter));

        let heavy = schedule(vec![
            section("A", "M", 540, 590).with_credits(4),
            section("B", "M", 600, 650).with_credits(3),
        ]);
        assert!(!satisfies(&heavy, &filter));
    }

    #[test]
    fn test_break_time() {
        let filter = ScheduleFilter::default_for(FilterKind::BreakTime); // 11-12 MWF
        let clear = schedule(vec![section("A", "MWF", 600, 660), section("B", "MWF", 720, 770)]);
        assert!(satisfies(&clear, &filter)); // touching both edges

        let blocked = schedule(vec![section("A", "W", 690, 740)]);
        assert!(!satisfies(&blocked, &filter));

        let other_days = schedule(vec![section("A", "TR", 660, 720)]);
        assert!(satisfies(&other_days, &filter));

        let untimed = schedule(vec![Section::new("A").with_meeting(Meeting::untimed(days("MWF")))]);
        assert!(satisfies(&untimed, &filter));
    }

    #[test]
    fn test_empty_filters_accept_everything() {
        let all = scenario_schedules();
        assert!(all.iter().all(|s| is_valid(s, &[])));
        assert_eq!(retain_valid(all, &[]).len(), 2);
    }

    #[test]
    fn test_first_violation() {
        let filters = vec![
            ScheduleFilter::class_load(ClassLoadOp::AtMost, 5, days("M")).unwrap(),
            ScheduleFilter::class_time(ClassTimeOp::StartAfter, t("10:00"), days("M")).unwrap(),
        ];
        let s = schedule(vec![section("A", "M", 540, 590)]);
        assert_eq!(first_violation(&s, &filters), Some(1));
        let late = schedule(vec![section("A", "M", 700, 750)]);
        assert_eq!(first_violation(&late, &filters), None);
    }

    #[test]
    fn test_conjunction_and_monotonicity_random() {
        let mut rng = StdRng::seed_from_u64(11);
        let all_filters = vec![
            ScheduleFilter::default_for(FilterKind::ClassTime),
            ScheduleFilter::default_for(FilterKind::ClassLoad),
            ScheduleFilter::default_for(FilterKind::BreakTime),
            ScheduleFilter::class_time(ClassTimeOp::StartBefore, t("3:00 PM"), days("TR")).unwrap(),
        ];

        for _ in 0..200 {
            let sections = (0..rng.random_range(1..5))
                .map(|i| {
                    let start: u16 = 480 + 15 * rng.random_range(0..40u16);
                    let d = ["MWF", "TR", "M", "W", "F"][rng.random_range(0..5)];
                    section(&format!("S{i}"), d, start, start + 50)
                })
                .collect();
            let s = schedule(sections);

            // Conjunction: valid iff each filter passes on its own.
            let each = all_filters.iter().all(|f| satisfies(&s, f));
            assert_eq!(is_valid(&s, &all_filters), each);

            // Order independence.
            let mut reversed = all_filters.clone();
            reversed.reverse();
            assert_eq!(is_valid(&s, &reversed), each);

            // Dropping any filter never rejects a previously valid schedule.
            for skip in 0..all_filters.len() {
                let fewer: Vec<_> = all_filters
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, f)| f.clone())
                    .collect();
                if each {
                    assert!(is_valid(&s, &fewer));
                }
            }
        }
    }
}
