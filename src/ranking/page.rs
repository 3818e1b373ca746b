//! Pagination over ranked schedules.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Schedule;

/// How many schedules are shown at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// One schedule per page.
    #[default]
    Detailed,
    /// Three schedules per page.
    Compact,
}

impl ViewMode {
    /// Schedules per page.
    pub fn page_size(self) -> usize {
        match self {
            ViewMode::Detailed => 1,
            ViewMode::Compact => 3,
        }
    }
}

/// One page of a ranked schedule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    /// Schedules on this page.
    pub schedules: &'a [Schedule],
    /// Page index after clamping.
    pub page_index: usize,
    /// Total pages (at least 1).
    pub page_count: usize,
}

impl Page<'_> {
    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.page_count
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }
}

fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size).max(1)
}

/// Returns the page at `index`, clamped to the valid range.
///
/// An empty sequence yields a single empty page.
///
/// # Example
/// ```
/// use course_planner::ranking::page;
///
/// let p = page(&[], 3, 5).unwrap();
/// assert_eq!((p.page_index, p.page_count), (0, 1));
/// assert!(p.schedules.is_empty());
/// ```
pub fn page(schedules: &[Schedule], page_size: usize, index: usize) -> Result<Page<'_>, ConfigError> {
    if page_size == 0 {
        return Err(ConfigError::ZeroPageSize);
    }
    let page_count = page_count(schedules.len(), page_size);
    let page_index = index.min(page_count - 1);
    let start = (page_index * page_size).min(schedules.len());
    let end = (start + page_size).min(schedules.len());
    Ok(Page {
        schedules: &schedules[start..end],
        page_index,
        page_count,
    })
}

/// Previous/next navigation over a result of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    len: usize,
    page_size: usize,
    index: usize,
}

impl Pager {
    /// Creates a pager at page 0.
    pub fn new(len: usize, page_size: usize) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(Self {
            len,
            page_size,
            index: 0,
        })
    }

    /// Creates a pager for a view mode.
    pub fn for_view(len: usize, view: ViewMode) -> Self {
        Self {
            len,
            page_size: view.page_size(),
            index: 0,
        }
    }

    /// Moves to `index`, clamped.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index.min(self.page_count() - 1);
        self
    }

    /// Current page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Total pages.
    pub fn page_count(&self) -> usize {
        page_count(self.len, self.page_size)
    }

    /// Advances one page; stays on the last page.
    pub fn next(&mut self) -> usize {
        if self.index + 1 < self.page_count() {
            self.index += 1;
        }
        self.index
    }

    /// Goes back one page; stays on the first page.
    pub fn prev(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    /// Current page of `schedules`.
    pub fn page<'a>(&self, schedules: &'a [Schedule]) -> Result<Page<'a>, ConfigError> {
        page(schedules, self.page_size, self.index)
    }
}
