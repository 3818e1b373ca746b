//! Rule engine for multi-criteria schedule ranking.
//!
//! Composes sort rules with a configurable evaluation mode. Ties that
//! survive every rule keep their input order.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{RuleScore, SortRule};
use crate::models::Schedule;

/// How multiple rules are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compute weighted sum of all rule scores.
    Weighted,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn SortRule>,
    weight: f64,
}

/// A composable rule engine for ordering schedules.
///
/// Scores are computed once per schedule, then the schedules are sorted
/// stably by those scores.
///
/// # Example
/// ```
/// use course_planner::ranking::{rules, RankingEngine};
///
/// let engine = RankingEngine::new()
///     .with_rule(rules::EarliestStart)
///     .with_tie_breaker(rules::LeastIdle);
/// assert_eq!(engine.rule_count(), 2);
/// ```
#[derive(Clone)]
pub struct RankingEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    epsilon: f64,
}

impl RankingEngine {
    /// Creates an empty engine. With no rules, sorting keeps input order.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            epsilon: 1e-9,
        }
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: SortRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: SortRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: SortRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Number of configured rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns indices into `schedules` in ranked order.
    pub fn sort_indices(&self, schedules: &[Schedule]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..schedules.len()).collect();
        if self.rules.is_empty() || schedules.len() < 2 {
            return indices;
        }

        match &self.mode {
            EvaluationMode::Sequential => {
                let scores: Vec<Vec<RuleScore>> = schedules
                    .iter()
                    .map(|s| self.rules.iter().map(|wr| wr.rule.evaluate(s)).collect())
                    .collect();
                indices.sort_by(|&a, &b| self.compare_sequential(&scores[a], &scores[b]));
            }
            EvaluationMode::Weighted => {
                let scores: Vec<f64> = schedules.iter().map(|s| self.weighted_score(s)).collect();
                indices.sort_by(|&a, &b| {
                    scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal)
                });
            }
        }

        indices
    }

    /// Orders schedules, best first. Equal schedules keep input order.
    pub fn sort(&self, schedules: Vec<Schedule>) -> Vec<Schedule> {
        let order = self.sort_indices(&schedules);
        let mut slots: Vec<Option<Schedule>> = schedules.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }

    /// Evaluates one schedule and returns each rule's weighted score.
    pub fn evaluate(&self, schedule: &Schedule) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(schedule) * wr.weight)
            .collect()
    }

    fn compare_sequential(&self, a: &[RuleScore], b: &[RuleScore]) -> Ordering {
        for (score_a, score_b) in a.iter().zip(b) {
            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(score_b).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }

    fn weighted_score(&self, schedule: &Schedule) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(schedule) * wr.weight)
            .sum()
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySet, Meeting, ScheduledSection, Section};
    use crate::ranking::{rules, ScheduleSort};

    fn make_schedule(id: &str, d: &str, start: u16, end: u16, slots: i32) -> Schedule {
        let days: DaySet = d.parse().unwrap();
        Schedule::from_entries(vec![ScheduledSection::new(
            "C",
            Arc::new(
                Section::new(id)
                    .with_slots(slots)
                    .with_meeting(Meeting::new(days, start, end)),
            ),
        )])
    }

    fn ids(schedules: &[Schedule]) -> Vec<&str> {
        schedules.iter().map(|s| s.section_ids()[0]).collect()
    }

    #[test]
    fn test_earliest_start_ordering() {
        let schedules = vec![
            make_schedule("late", "M", 720, 770, 0),
            make_schedule("early", "M", 480, 530, 0),
            make_schedule("mid", "M", 600, 650, 0),
        ];
        let engine = RankingEngine::new().with_rule(rules::EarliestStart);
        let sorted = engine.sort(schedules);
        assert_eq!(ids(&sorted), vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let schedules = vec![
            make_schedule("first", "M", 540, 590, 0),
            make_schedule("second", "W", 540, 590, 0),
            make_schedule("third", "F", 540, 590, 0),
        ];
        let engine = RankingEngine::new().with_rule(rules::EarliestStart);
        assert_eq!(ids(&engine.sort(schedules)), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sequential_with_tie_breaker() {
        let schedules = vec![
            make_schedule("few_seats", "M", 540, 590, 2),
            make_schedule("many_seats", "T", 540, 590, 40),
        ];
        let engine = RankingEngine::new()
            .with_rule(rules::EarliestStart)
            .with_tie_breaker(rules::MostOpenSeats);
        // EarliestStart ties → MostOpenSeats breaks it.
        assert_eq!(ids(&engine.sort(schedules)), vec!["many_seats", "few_seats"]);
    }

    #[test]
    fn test_weighted_mode() {
        let schedules = vec![
            make_schedule("A", "M", 480, 530, 0),
            make_schedule("B", "M", 600, 650, 200),
        ];
        let engine = RankingEngine::new()
            .with_mode(EvaluationMode::Weighted)
            .with_weighted_rule(rules::EarliestStart, 1.0)
            .with_weighted_rule(rules::MostOpenSeats, 1.0);
        // A: 480 + 0 = 480, B: 600 - 200 = 400 → B first.
        assert_eq!(ids(&engine.sort(schedules)), vec!["B", "A"]);
    }

    #[test]
    fn test_empty_engine_keeps_order() {
        let schedules = vec![
            make_schedule("x", "M", 720, 770, 0),
            make_schedule("y", "M", 480, 530, 0),
        ];
        let sorted = RankingEngine::new().sort(schedules);
        assert_eq!(ids(&sorted), vec!["x", "y"]);
        assert!(RankingEngine::new().sort(Vec::new()).is_empty());
    }

    #[test]
    fn test_evaluate_scores() {
        let s = make_schedule("S", "M", 540, 590, 10);
        let engine = RankingEngine::new()
            .with_rule(rules::EarliestStart)
            .with_rule(rules::MostOpenSeats);
        let scores = engine.evaluate(&s);
        assert_eq!(scores.len(), 2);
        assert!((scores[0] - 540.0).abs() < 1e-10);
        assert!((scores[1] + 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_every_sort_key_is_total_and_deterministic() {
        let schedules = vec![
            make_schedule("a", "MWF", 540, 590, 3),
            make_schedule("b", "TR", 480, 555, 9),
            make_schedule("c", "M", 800, 850, 1),
        ];
        for key in ScheduleSort::ALL {
            let once = key.sort(schedules.clone());
            let twice = key.sort(schedules.clone());
            assert_eq!(once, twice);
            assert_eq!(once.len(), schedules.len());
        }
        assert_eq!(ids(&ScheduleSort::Default.sort(schedules.clone())), vec!["a", "b", "c"]);
        assert_eq!(ids(&ScheduleSort::LatestStart.sort(schedules.clone())), vec!["c", "a", "b"]);
        assert_eq!(ids(&ScheduleSort::FewestDays.sort(schedules)), vec!["c", "b", "a"]);
    }

    fn two_meetings(id: &str, d: &str, first: (u16, u16), second: (u16, u16)) -> Schedule {
        let days: DaySet = d.parse().unwrap();
        let section = Section::new(id)
            .with_meeting(Meeting::new(days, first.0, first.1))
            .with_meeting(Meeting::new(days, second.0, second.1));
        Schedule::from_entries(vec![ScheduledSection::new("C", Arc::new(section))])
    }

    #[test]
    fn test_compact_sort_is_weighted() {
        // spread: 2 days, 300 idle minutes. packed: 3 days, no idle time.
        let schedules = vec![
            two_meetings("spread", "TR", (540, 590), (740, 790)),
            two_meetings("packed", "MWF", (540, 590), (590, 640)),
        ];
        let engine = ScheduleSort::CompactWeek.engine();
        assert_eq!(engine.mode(), EvaluationMode::Weighted);
        // 2 * 60 + 300 = 420 against 3 * 60 + 0 = 180.
        assert_eq!(ids(&engine.sort(schedules.clone())), vec!["packed", "spread"]);
        assert_eq!(ids(&ScheduleSort::FewestDays.sort(schedules)), vec!["spread", "packed"]);
    }

    #[test]
    fn test_debug_lists_rules() {
        let engine = ScheduleSort::FewestDays.engine();
        let dbg = format!("{engine:?}");
        assert!(dbg.contains("FEWEST_DAYS(w=1)"));
        assert!(dbg.contains("LEAST_IDLE(w=0)"));
    }
}
