//! Schedule generation orchestrator.
//!
//! Generation runs in two stages:
//!
//! 1. [`compute_schedules`]: a pure function from a [`GenerationRequest`]
//!    to the ranked list of valid schedules (search → filter → rank).
//! 2. [`Generator`]: tickets each request, tracks the in-flight request
//!    per selection key, and publishes only the newest result.
//!
//! # Supersession
//!
//! [`Generator::begin`] issues a monotonically increasing ticket and
//! cancels the token of any older ticket still in flight for the same
//! key. When a run finishes, its result is discarded as
//! [`GenerationOutcome::Superseded`] if its token was cancelled, a newer
//! ticket is in flight for its key, or a newer ticket has already been
//! published. A stale result therefore never replaces a fresher one.
//!
//! The generator is `Send + Sync`; runs may execute on worker threads.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::filter::retain_valid;
use crate::models::{Course, Schedule, ScheduleFilter};
use crate::ranking::ScheduleSort;
use crate::search::{Cancelled, CancellationToken, CombinationSearch, CoursePool};
use crate::validation::check_request;

/// Everything one generation needs.
///
/// Ephemeral: built from the caller's selection state for each run.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Selected course codes, in selection order.
    pub selected: Vec<String>,
    /// Loaded course data by code.
    pub courses: HashMap<String, Course>,
    /// Section pinned per course code.
    pub pinned: HashMap<String, String>,
    /// Active filters (ANDed).
    pub filters: Vec<ScheduleFilter>,
    /// Sort key.
    pub sort: ScheduleSort,
}

impl GenerationRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a course and supplies its data.
    pub fn with_course(mut self, course: Course) -> Self {
        self.selected.push(course.code.clone());
        self.courses.insert(course.code.clone(), course);
        self
    }

    /// Selects a course code without supplying data.
    pub fn with_selected(mut self, code: impl Into<String>) -> Self {
        self.selected.push(code.into());
        self
    }

    /// Restricts a course to one section.
    pub fn with_pinned(mut self, code: impl Into<String>, section_id: impl Into<String>) -> Self {
        self.pinned.insert(code.into(), section_id.into());
        self
    }

    /// Adds a filter.
    pub fn with_filter(mut self, filter: ScheduleFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replaces the filter list.
    pub fn with_filters(mut self, filters: Vec<ScheduleFilter>) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the sort key.
    pub fn with_sort(mut self, sort: ScheduleSort) -> Self {
        self.sort = sort;
        self
    }

    /// Key identifying the selection this request was built from.
    pub fn selection_key(&self) -> SelectionKey {
        SelectionKey::from_codes(&self.selected)
    }

    /// Course pools in selection order.
    ///
    /// Missing courses contribute an empty pool. Repeated codes are
    /// skipped after the first.
    pub fn pools(&self) -> Vec<CoursePool> {
        let mut pools: Vec<CoursePool> = Vec::with_capacity(self.selected.len());
        for code in &self.selected {
            if pools.iter().any(|p| &p.code == code) {
                continue;
            }
            let pool = match self.courses.get(code) {
                Some(course) => CoursePool::from_course(course),
                None => CoursePool::new(code.clone(), Vec::new()),
            };
            let pool = match self.pinned.get(code) {
                Some(section_id) => pool.pinned_to(section_id),
                None => pool,
            };
            pools.push(pool);
        }
        pools
    }
}

/// Identifies a course selection; generations are tracked per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionKey(String);

impl SelectionKey {
    /// Builds a key from selected course codes (order-sensitive).
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        let joined: Vec<&str> = codes.iter().map(|c| c.as_ref()).collect();
        Self(joined.join(","))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs search, filtering, and ranking for one request.
///
/// Pure apart from logging: identical requests yield identical output.
/// Input problems (unloaded or empty courses) are logged as warnings and
/// lead to an empty result rather than an error.
pub fn compute_schedules(
    request: &GenerationRequest,
    token: &CancellationToken,
) -> Result<Vec<Schedule>, Cancelled> {
    compute_schedules_with(request, token, &GeneratorConfig::default())
}

/// [`compute_schedules`] with explicit configuration.
pub fn compute_schedules_with(
    request: &GenerationRequest,
    token: &CancellationToken,
    config: &GeneratorConfig,
) -> Result<Vec<Schedule>, Cancelled> {
    if let Err(errors) = check_request(request) {
        for e in &errors {
            warn!(kind = ?e.kind, "{}", e.message);
        }
    }

    if request.selected.is_empty() {
        return Ok(Vec::new());
    }

    let pools = request.pools();
    let found = CombinationSearch::new(&pools, token)
        .with_check_interval(config.cancel_check_interval)
        .run()?;
    let candidates = found.len();

    let filters: Vec<ScheduleFilter> = request
        .filters
        .iter()
        .filter(|f| match f.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "malformed filter ignored");
                false
            }
        })
        .cloned()
        .collect();
    let valid = retain_valid(found, &filters);
    debug!(
        candidates,
        valid = valid.len(),
        filters = filters.len(),
        "filters applied"
    );

    if token.is_cancelled() {
        return Err(Cancelled);
    }
    Ok(request.sort.sort(valid))
}

/// Handle for one generation run.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    key: SelectionKey,
    token: CancellationToken,
}

impl Ticket {
    /// Ticket number; later tickets have larger numbers.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Selection key the ticket was issued for.
    pub fn key(&self) -> &SelectionKey {
        &self.key
    }

    /// Cancellation token observed by the run.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A published generation result.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// Ticket that produced the result.
    pub ticket: u64,
    /// Selection the result belongs to.
    pub key: SelectionKey,
    /// Sort key applied.
    pub sort: ScheduleSort,
    /// Valid schedules, ranked.
    pub schedules: Vec<Schedule>,
}

/// Outcome of [`Generator::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The result was published as current.
    Generated(Arc<GenerationResult>),
    /// A newer request made this one obsolete; nothing was published.
    Superseded,
}

impl GenerationOutcome {
    /// Returns the published result, if any.
    pub fn result(&self) -> Option<&Arc<GenerationResult>> {
        match self {
            GenerationOutcome::Generated(r) => Some(r),
            GenerationOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, GenerationOutcome::Superseded)
    }
}

#[derive(Debug)]
struct InFlight {
    ticket: u64,
    token: CancellationToken,
}

/// Tickets generation requests and publishes the newest result.
///
/// # Example
/// ```
/// use course_planner::generator::{GenerationRequest, Generator};
/// use course_planner::models::{Course, Meeting, Section};
///
/// let course = Course::new("CSE174", "202610")
///     .with_section(Section::new("A").with_meeting(Meeting::new("MWF".parse().unwrap(), 540, 590)));
/// let generator = Generator::new();
/// let outcome = generator.generate(GenerationRequest::new().with_course(course));
/// assert_eq!(outcome.result().unwrap().schedules.len(), 1);
/// ```
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    next_ticket: AtomicU64,
    in_flight: DashMap<SelectionKey, InFlight>,
    published: RwLock<Option<Arc<GenerationResult>>>,
}

impl Generator {
    /// Creates a generator with default configuration.
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Creates a generator with explicit configuration.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            next_ticket: AtomicU64::new(0),
            in_flight: DashMap::new(),
            published: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Issues a ticket for `key` and cancels the previous in-flight run
    /// for the same key.
    pub fn begin(&self, key: SelectionKey) -> Ticket {
        let id = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let previous = self.in_flight.insert(
            key.clone(),
            InFlight {
                ticket: id,
                token: token.clone(),
            },
        );
        if let Some(prev) = previous {
            debug!(key = %key, cancelled = prev.ticket, ticket = id, "superseding in-flight generation");
            prev.token.cancel();
        }
        Ticket { id, key, token }
    }

    /// Executes a ticketed request and publishes the result if it is
    /// still the newest.
    pub fn run(&self, ticket: Ticket, request: &GenerationRequest) -> GenerationOutcome {
        let computed = if ticket.token.is_cancelled() {
            Err(Cancelled)
        } else {
            compute_schedules_with(request, &ticket.token, &self.config)
        };

        let outcome = match computed {
            Ok(schedules) => self.publish(&ticket, request.sort, schedules),
            Err(Cancelled) => {
                debug!(ticket = ticket.id, key = %ticket.key, "generation cancelled");
                GenerationOutcome::Superseded
            }
        };

        self.in_flight
            .remove_if(&ticket.key, |_, flight| flight.ticket == ticket.id);
        outcome
    }

    /// Begins and runs a request under its own selection key.
    pub fn generate(&self, request: GenerationRequest) -> GenerationOutcome {
        let ticket = self.begin(request.selection_key());
        self.run(ticket, &request)
    }

    /// Whether a run is in flight for `key`.
    pub fn is_generating(&self, key: &SelectionKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// The most recently published result.
    pub fn current(&self) -> Option<Arc<GenerationResult>> {
        let Ok(published) = self.published.read() else {
            return None;
        };
        published.clone()
    }

    /// Drops the published result.
    pub fn clear(&self) {
        if let Ok(mut published) = self.published.write() {
            *published = None;
        }
    }

    fn publish(
        &self,
        ticket: &Ticket,
        sort: ScheduleSort,
        schedules: Vec<Schedule>,
    ) -> GenerationOutcome {
        let Ok(mut published) = self.published.write() else {
            warn!(ticket = ticket.id, "published result lock poisoned");
            return GenerationOutcome::Superseded;
        };

        let newer_in_flight = self
            .in_flight
            .get(&ticket.key)
            .is_some_and(|flight| flight.ticket > ticket.id);
        let newer_published = published.as_ref().is_some_and(|r| r.ticket > ticket.id);
        if ticket.token.is_cancelled() || newer_in_flight || newer_published {
            debug!(ticket = ticket.id, key = %ticket.key, "discarding superseded result");
            return GenerationOutcome::Superseded;
        }

        let result = Arc::new(GenerationResult {
            ticket: ticket.id,
            key: ticket.key.clone(),
            sort,
            schedules,
        });
        info!(
            ticket = ticket.id,
            key = %ticket.key,
            schedules = result.schedules.len(),
            "schedules generated"
        );
        *published = Some(Arc::clone(&result));
        GenerationOutcome::Generated(result)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
