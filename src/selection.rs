//! Caller-owned selection context.
//!
//! [`SelectionState`] holds everything the user has chosen: term, courses,
//! pinned sections, filters, sort key, view mode, and the current page.
//! It is an explicit value passed to the operations that need it; nothing
//! here is global. Generation reads it through [`SelectionState::request`].

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::catalog::{CourseCatalog, Term};
use crate::config::GeneratorConfig;
use crate::error::{CatalogError, ConfigError};
use crate::generator::{GenerationRequest, SelectionKey};
use crate::models::{Course, FilterKind, FilterSet, LoadUnit, Schedule};
use crate::ranking::{Page, Pager, ScheduleSort, ViewMode};

/// The user's current choices.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    term: Option<String>,
    selected: Vec<String>,
    loading: BTreeSet<String>,
    courses: HashMap<String, Course>,
    pinned: HashMap<String, String>,
    filters: FilterSet,
    sort: ScheduleSort,
    view: ViewMode,
    page: usize,
    load_unit: LoadUnit,
}

impl SelectionState {
    /// Creates an empty selection with default sort and view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty selection using configured defaults.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            sort: config.default_sort,
            view: config.default_view,
            load_unit: config.default_load_unit,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Term and courses
    // ------------------------------------------------------------------

    /// Selects the catalog's first term, if it lists any.
    ///
    /// Returns the selected term.
    pub fn select_default_term(
        &mut self,
        catalog: &dyn CourseCatalog,
    ) -> Result<Option<Term>, CatalogError> {
        let first = catalog.terms()?.into_iter().next();
        match &first {
            Some(term) => {
                self.select_term(term.code.clone());
            }
            None => debug!("catalog lists no terms"),
        }
        Ok(first)
    }

    /// Switches term. Clears courses, pins, and the page.
    ///
    /// Returns true if the term changed or courses were discarded. Results
    /// already published for the old selection are then stale, and the
    /// caller should call [`Generator::clear`](crate::generator::Generator::clear).
    pub fn select_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        let stale = self.term.as_deref() != Some(term.as_str())
            || !self.selected.is_empty()
            || !self.loading.is_empty();
        self.term = Some(term);
        self.selected.clear();
        self.loading.clear();
        self.courses.clear();
        self.pinned.clear();
        self.page = 0;
        stale
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Marks `code` as loading.
    ///
    /// Returns false (and does nothing) if the course is already loading
    /// or selected.
    pub fn begin_loading(&mut self, code: &str) -> bool {
        if self.loading.contains(code) || self.is_selected(code) {
            return false;
        }
        self.loading.insert(code.to_string());
        true
    }

    /// Completes a load: the course becomes selected.
    ///
    /// Returns false if the course no longer belongs to this selection
    /// (term changed or load abandoned while it was in flight).
    pub fn finish_loading(&mut self, course: Course) -> bool {
        if !self.loading.remove(&course.code) {
            debug!(code = %course.code, "dropping course load that is no longer pending");
            return false;
        }
        if let Some(term) = &self.term {
            if &course.term != term {
                debug!(code = %course.code, term = %course.term, "dropping course from another term");
                return false;
            }
        }
        self.selected.push(course.code.clone());
        self.courses.insert(course.code.clone(), course);
        true
    }

    /// Abandons a pending load.
    pub fn cancel_loading(&mut self, code: &str) -> bool {
        self.loading.remove(code)
    }

    /// Fetches `code` from `catalog` and selects it.
    ///
    /// Returns `Ok(false)` if the course was already loading or selected.
    pub fn load_course(
        &mut self,
        catalog: &dyn CourseCatalog,
        code: &str,
    ) -> Result<bool, CatalogError> {
        if !self.begin_loading(code) {
            return Ok(false);
        }
        match catalog.fetch_course(code) {
            Ok(course) => Ok(self.finish_loading(course)),
            Err(e) => {
                self.loading.remove(code);
                warn!(code, error = %e, retryable = e.is_retryable(), "course load failed");
                Err(e)
            }
        }
    }

    /// Removes a course from the selection and resets the page.
    ///
    /// Returns false if the course was not selected.
    pub fn deselect(&mut self, code: &str) -> bool {
        if !self.is_selected(code) {
            return false;
        }
        self.selected.retain(|c| c != code);
        self.courses.remove(code);
        self.pinned.remove(code);
        self.page = 0;
        true
    }

    /// Restricts a selected course to one section.
    pub fn pin_section(&mut self, code: &str, section_id: impl Into<String>) -> bool {
        if !self.is_selected(code) {
            return false;
        }
        self.pinned.insert(code.to_string(), section_id.into());
        self.page = 0;
        true
    }

    /// Lifts a pin.
    pub fn unpin_section(&mut self, code: &str) -> bool {
        let removed = self.pinned.remove(code).is_some();
        if removed {
            self.page = 0;
        }
        removed
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selected.iter().any(|c| c == code)
    }

    pub fn is_loading(&self, code: &str) -> bool {
        self.loading.contains(code)
    }

    /// Selected course codes, in selection order.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn course(&self, code: &str) -> Option<&Course> {
        self.courses.get(code)
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Adds a default filter of `kind` and returns its ID.
    ///
    /// Class-load filters take the configured load unit.
    pub fn add_filter(&mut self, kind: FilterKind) -> u32 {
        self.filters.create_with_unit(kind, self.load_unit)
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    /// Acknowledges filter edits. Returns true if there were any.
    pub fn apply_filters(&mut self) -> bool {
        let changed = self.filters.is_changed();
        if changed {
            self.filters.mark_applied();
            self.page = 0;
        }
        changed
    }

    // ------------------------------------------------------------------
    // Sort, view, and paging
    // ------------------------------------------------------------------

    /// Changes the view mode; a different mode resets the page.
    pub fn select_view(&mut self, view: ViewMode) {
        if self.view != view {
            self.view = view;
            self.page = 0;
        }
    }

    /// Changes the sort key. The page is kept.
    pub fn select_sort(&mut self, sort: ScheduleSort) {
        self.sort = sort;
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn sort(&self) -> ScheduleSort {
        self.sort
    }

    /// Current page index.
    pub fn page_index(&self) -> usize {
        self.page
    }

    /// Advances one page within a result of `total` schedules.
    pub fn next_page(&mut self, total: usize) -> usize {
        let mut pager = self.pager(total);
        self.page = pager.next();
        self.page
    }

    /// Goes back one page.
    pub fn prev_page(&mut self, total: usize) -> usize {
        let mut pager = self.pager(total);
        self.page = pager.prev();
        self.page
    }

    /// The current page of `schedules`.
    pub fn current_page<'a>(&self, schedules: &'a [Schedule]) -> Result<Page<'a>, ConfigError> {
        self.pager(schedules.len()).page(schedules)
    }

    fn pager(&self, total: usize) -> Pager {
        Pager::for_view(total, self.view).with_index(self.page)
    }

    // ------------------------------------------------------------------
    // Generation input
    // ------------------------------------------------------------------

    /// Key of the current course selection.
    pub fn selection_key(&self) -> SelectionKey {
        SelectionKey::from_codes(&self.selected)
    }

    /// Builds a generation request from the current state.
    pub fn request(&self) -> GenerationRequest {
        let courses = self
            .selected
            .iter()
            .filter_map(|code| self.courses.get(code).map(|c| (code.clone(), c.clone())))
            .collect();
        GenerationRequest {
            selected: self.selected.clone(),
            courses,
            pinned: self.pinned.clone(),
            filters: self.filters.active(),
            sort: self.sort,
        }
    }
}
