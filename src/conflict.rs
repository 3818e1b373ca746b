//! Meeting and section conflict detection.
//!
//! Two meetings conflict iff they share a day and their half-open time
//! ranges overlap. Meetings without a known time never conflict.
//!
//! # Complexity
//! `sections_conflict` is O(|a.meetings| * |b.meetings|).

use crate::models::{Meeting, Schedule, Section};

/// Whether two meetings overlap on a shared day.
///
/// Symmetric: `meetings_conflict(a, b) == meetings_conflict(b, a)`.
#[inline]
pub fn meetings_conflict(a: &Meeting, b: &Meeting) -> bool {
    match (a.time, b.time) {
        (Some(ta), Some(tb)) => a.days.intersects(b.days) && ta.overlaps(&tb),
        _ => false,
    }
}

/// Whether any meeting of `a` conflicts with any meeting of `b`.
pub fn sections_conflict(a: &Section, b: &Section) -> bool {
    a.meetings
        .iter()
        .any(|ma| b.meetings.iter().any(|mb| meetings_conflict(ma, mb)))
}

/// Returns the index pairs of conflicting entries in a schedule.
///
/// A schedule produced by the combination search always yields an empty
/// list; this is the pairwise check used to verify that.
pub fn conflicting_pairs(schedule: &Schedule) -> Vec<(usize, usize)> {
    let entries = &schedule.entries;
    let mut pairs = Vec::new();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if sections_conflict(&entries[i].section, &entries[j].section) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
