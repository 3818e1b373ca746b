//! Combination search over course sections.
//!
//! Enumerates every assignment of one section per course such that no two
//! chosen sections conflict.
//!
//! # Algorithm
//!
//! Depth-first backtracking over courses in input order. At each depth,
//! every section of the current course is checked against the sections
//! already committed; only conflict-free sections are recursed into. An
//! incompatible prefix is abandoned before later courses are explored, so
//! the full cartesian product is never materialized.
//!
//! # Determinism
//! Courses and sections are visited in input order, so schedules come out
//! in lexicographic order of section indices.
//!
//! # Cancellation
//! The search checks its [`CancellationToken`] before every top-level
//! section choice and every `check_interval` visited nodes. A cancelled
//! search returns [`Cancelled`] and no partial results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::conflict::sections_conflict;
use crate::models::{Course, Schedule, ScheduledSection, Section};

/// Shared cancellation flag checked by the search.
///
/// Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was signalled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The search was interrupted by its cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("schedule search cancelled")]
pub struct Cancelled;

/// The sections one course contributes to the search.
#[derive(Debug, Clone, PartialEq)]
pub struct CoursePool {
    /// Course code.
    pub code: String,
    /// Candidate sections, in catalog order.
    pub sections: Vec<Arc<Section>>,
}

impl CoursePool {
    /// Creates a pool from explicit sections.
    pub fn new(code: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            code: code.into(),
            sections: sections.into_iter().map(Arc::new).collect(),
        }
    }

    /// Creates a pool holding all sections of a course.
    pub fn from_course(course: &Course) -> Self {
        Self::new(course.code.clone(), course.sections.clone())
    }

    /// Restricts the pool to the section with `section_id`.
    ///
    /// An unknown ID leaves the pool empty.
    pub fn pinned_to(mut self, section_id: &str) -> Self {
        self.sections.retain(|s| s.id == section_id);
        self
    }
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Sections tried across all depths.
    pub nodes_visited: u64,
    /// Sections rejected because they conflicted with the prefix.
    pub conflicts_pruned: u64,
    /// Complete schedules emitted.
    pub schedules_found: u64,
}

/// Backtracking enumerator of conflict-free schedules.
///
/// # Example
/// ```
/// use course_planner::models::{Meeting, Section};
/// use course_planner::search::{CancellationToken, CombinationSearch, CoursePool};
///
/// let mon = "M".parse().unwrap();
/// let pools = vec![
///     CoursePool::new("A", vec![
///         Section::new("A1").with_meeting(Meeting::new(mon, 540, 590)),
///         Section::new("A2").with_meeting(Meeting::new(mon, 600, 650)),
///     ]),
///     CoursePool::new("B", vec![
///         Section::new("B1").with_meeting(Meeting::new(mon, 570, 620)),
///     ]),
/// ];
/// let token = CancellationToken::new();
/// let schedules = CombinationSearch::new(&pools, &token).run().unwrap();
/// assert!(schedules.is_empty()); // B1 overlaps both A sections
/// ```
#[derive(Debug)]
pub struct CombinationSearch<'a> {
    pools: &'a [CoursePool],
    token: &'a CancellationToken,
    check_interval: u64,
    stats: SearchStats,
    #[cfg(test)]
    cancel_at_node: Option<u64>,
}

impl<'a> CombinationSearch<'a> {
    /// Creates a search over `pools`.
    pub fn new(pools: &'a [CoursePool], token: &'a CancellationToken) -> Self {
        Self {
            pools,
            token,
            check_interval: 1024,
            stats: SearchStats::default(),
            #[cfg(test)]
            cancel_at_node: None,
        }
    }

    /// Sets how many nodes are visited between cancellation checks.
    pub fn with_check_interval(mut self, nodes: u64) -> Self {
        self.check_interval = nodes.max(1);
        self
    }

    /// Runs the search and returns all conflict-free schedules.
    ///
    /// No courses, or any course with no sections, yields an empty list.
    pub fn run(self) -> Result<Vec<Schedule>, Cancelled> {
        self.run_with_stats().map(|(schedules, _)| schedules)
    }

    /// Runs the search and also returns its counters.
    pub fn run_with_stats(mut self) -> Result<(Vec<Schedule>, SearchStats), Cancelled> {
        let out = self.search()?;
        Ok((out, self.stats))
    }

    /// Runs the search in place.
    ///
    /// Counters are reset first and remain readable through
    /// [`CombinationSearch::stats`] after the run, cancelled or not.
    pub fn search(&mut self) -> Result<Vec<Schedule>, Cancelled> {
        self.stats = SearchStats::default();
        let mut out = Vec::new();
        if self.pools.is_empty() || self.pools.iter().any(|p| p.sections.is_empty()) {
            debug!(courses = self.pools.len(), "nothing to search");
            return Ok(out);
        }

        let mut chosen: Vec<usize> = Vec::with_capacity(self.pools.len());
        self.backtrack(&mut chosen, &mut out)?;

        debug!(
            courses = self.pools.len(),
            nodes = self.stats.nodes_visited,
            pruned = self.stats.conflicts_pruned,
            found = self.stats.schedules_found,
            "combination search finished"
        );
        Ok(out)
    }

    /// Counters of the last run.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Cancels the token once `nodes` nodes have been visited.
    #[cfg(test)]
    fn cancel_at_node(mut self, nodes: u64) -> Self {
        self.cancel_at_node = Some(nodes);
        self
    }

    fn backtrack(&mut self, chosen: &mut Vec<usize>, out: &mut Vec<Schedule>) -> Result<(), Cancelled> {
        let depth = chosen.len();
        if depth == self.pools.len() {
            out.push(self.materialize(chosen));
            self.stats.schedules_found += 1;
            return Ok(());
        }

        let pools = self.pools;
        for (idx, section) in pools[depth].sections.iter().enumerate() {
            self.stats.nodes_visited += 1;
            #[cfg(test)]
            if self.cancel_at_node == Some(self.stats.nodes_visited) {
                self.token.cancel();
            }
            let checkpoint =
                depth == 0 || self.stats.nodes_visited % self.check_interval == 0;
            if checkpoint && self.token.is_cancelled() {
                debug!(nodes = self.stats.nodes_visited, "combination search cancelled");
                return Err(Cancelled);
            }

            let conflicts = chosen
                .iter()
                .enumerate()
                .any(|(d, &i)| sections_conflict(&pools[d].sections[i], section));
            if conflicts {
                self.stats.conflicts_pruned += 1;
                continue;
            }

            chosen.push(idx);
            self.backtrack(chosen, out)?;
            chosen.pop();
        }
        Ok(())
    }

    fn materialize(&self, chosen: &[usize]) -> Schedule {
        Schedule::from_entries(
            chosen
                .iter()
                .enumerate()
                .map(|(d, &i)| {
                    let pool = &self.pools[d];
                    ScheduledSection::new(pool.code.clone(), Arc::clone(&pool.sections[i]))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::conflicting_pairs;
    use crate::models::{DaySet, Meeting, Weekday};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn days(s: &str) -> DaySet {
        s.parse().unwrap()
    }

    fn section(id: &str, d: &str, start: u16, end: u16) -> Section {
        Section::new(id).with_meeting(Meeting::new(days(d), start, end))
    }

    /// A1 Mon 09:00-09:50, A2 Mon 10:00-10:50; B1 Mon 09:30-10:20, B2 Tue 09:00-09:50.
    pub(crate) fn scenario_pools() -> Vec<CoursePool> {
        vec![
            CoursePool::new(
                "A",
                vec![section("A1", "M", 540, 590), section("A2", "M", 600, 650)],
            ),
            CoursePool::new(
                "B",
                vec![section("B1", "M", 570, 620), section("B2", "T", 540, 590)],
            ),
        ]
    }

    fn ids(schedules: &[Schedule]) -> Vec<Vec<&str>> {
        schedules.iter().map(|s| s.section_ids()).collect()
    }

    #[test]
    fn test_scenario_combinations() {
        let pools = scenario_pools();
        let token = CancellationToken::new();
        let schedules = CombinationSearch::new(&pools, &token).run().unwrap();
        // B1 overlaps A1 (09:30-09:50) and A2 (10:00-10:20) on Monday.
        assert_eq!(ids(&schedules), vec![vec!["A1", "B2"], vec!["A2", "B2"]]);
    }

    #[test]
    fn test_single_course_yields_singletons() {
        let pools = vec![CoursePool::new(
            "A",
            vec![
                section("A1", "M", 540, 590),
                section("A2", "M", 540, 590),
                section("A3", "T", 540, 590),
            ],
        )];
        let token = CancellationToken::new();
        let schedules = CombinationSearch::new(&pools, &token).run().unwrap();
        assert_eq!(ids(&schedules), vec![vec!["A1"], vec!["A2"], vec!["A3"]]);
    }

    #[test]
    fn test_empty_course_yields_nothing() {
        let mut pools = scenario_pools();
        pools.push(CoursePool::new("C", vec![]));
        let token = CancellationToken::new();
        assert!(CombinationSearch::new(&pools, &token).run().unwrap().is_empty());
        assert!(CombinationSearch::new(&[], &token).run().unwrap().is_empty());
    }

    #[test]
    fn test_pinned_pool() {
        let pools = vec![
            scenario_pools().remove(0).pinned_to("A2"),
            scenario_pools().remove(1),
        ];
        let token = CancellationToken::new();
        let schedules = CombinationSearch::new(&pools, &token).run().unwrap();
        assert_eq!(ids(&schedules), vec![vec!["A2", "B2"]]);

        let unknown = scenario_pools().remove(0).pinned_to("A9");
        assert!(unknown.sections.is_empty());
    }

    #[test]
    fn test_untimed_sections_combine_freely() {
        let pools = vec![
            CoursePool::new("A", vec![Section::new("A1").with_meeting(Meeting::untimed(days("MWF")))]),
            CoursePool::new("B", vec![section("B1", "MWF", 540, 590)]),
        ];
        let token = CancellationToken::new();
        assert_eq!(CombinationSearch::new(&pools, &token).run().unwrap().len(), 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let pools = scenario_pools();
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(CombinationSearch::new(&pools, &token).run(), Err(Cancelled));
    }

    #[test]
    fn test_cancelled_mid_run() {
        // Untimed sections never conflict, so every node is explored.
        let pools: Vec<CoursePool> = (0..6)
            .map(|c| {
                let sections = (0..8).map(|s| Section::new(format!("C{c}S{s}"))).collect();
                CoursePool::new(format!("C{c}"), sections)
            })
            .collect();
        let full_tree: u64 = (1..=6).map(|depth| 8u64.pow(depth)).sum();

        let token = CancellationToken::new();
        let mut search = CombinationSearch::new(&pools, &token)
            .with_check_interval(16)
            .cancel_at_node(100);
        assert_eq!(search.search(), Err(Cancelled));
        let visited = search.stats().nodes_visited;
        assert!(visited >= 100);
        assert!(visited < 100 + 16);
        assert!(visited < full_tree);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_search_stats_reset_between_runs() {
        let pools = scenario_pools();
        let token = CancellationToken::new();
        let mut search = CombinationSearch::new(&pools, &token);
        assert_eq!(search.search().unwrap().len(), 2);
        assert_eq!(search.search().unwrap().len(), 2);
        assert_eq!(search.stats().nodes_visited, 6);
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_stats_count_pruning() {
        let pools = scenario_pools();
        let token = CancellationToken::new();
        let (schedules, stats) = CombinationSearch::new(&pools, &token)
            .run_with_stats()
            .unwrap();
        assert_eq!(schedules.len(), 2);
        assert_eq!(stats.schedules_found, 2);
        assert_eq!(stats.conflicts_pruned, 2);
        // 2 top-level + 2 under A1 + 2 under A2.
        assert_eq!(stats.nodes_visited, 6);
    }

    #[test]
    fn test_deterministic_output() {
        let pools = scenario_pools();
        let token = CancellationToken::new();
        let first = CombinationSearch::new(&pools, &token).run().unwrap();
        let second = CombinationSearch::new(&pools, &token).run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_no_false_negatives_and_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..40 {
            let pools = random_pools(&mut rng);
            let token = CancellationToken::new();
            let schedules = CombinationSearch::new(&pools, &token)
                .with_check_interval(3)
                .run()
                .unwrap();

            for s in &schedules {
                assert!(conflicting_pairs(s).is_empty());
                assert_eq!(s.course_count(), pools.len());
            }
            assert_eq!(schedules.len(), brute_force_count(&pools));
        }
    }

    fn random_pools(rng: &mut StdRng) -> Vec<CoursePool> {
        let courses = rng.random_range(1..5);
        (0..courses)
            .map(|c| {
                let n = rng.random_range(1..5);
                let sections = (0..n)
                    .map(|s| {
                        let day = Weekday::ALL[rng.random_range(0..3)];
                        let start: u16 = 480 + 30 * rng.random_range(0..12u16);
                        Section::new(format!("C{c}S{s}"))
                            .with_meeting(Meeting::new(DaySet::from_days(&[day]), start, start + 50))
                    })
                    .collect();
                CoursePool::new(format!("C{c}"), sections)
            })
            .collect()
    }

    // Enumerates the full cartesian product and counts conflict-free picks.
    fn brute_force_count(pools: &[CoursePool]) -> usize {
        let total: usize = pools.iter().map(|p| p.sections.len()).product();
        (0..total)
            .filter(|&n| {
                let mut code = n;
                let picks: Vec<&Section> = pools
                    .iter()
                    .map(|p| {
                        let i = code % p.sections.len();
                        code /= p.sections.len();
                        p.sections[i].as_ref()
                    })
                    .collect();
                (0..picks.len()).all(|i| {
                    ((i + 1)..picks.len()).all(|j| !sections_conflict(picks[i], picks[j]))
                })
            })
            .count()
    }
}
