//! Course data source.
//!
//! The engine never talks to the registrar directly. Course and section
//! data come through a [`CourseCatalog`]; [`InMemoryCatalog`] is the
//! in-process implementation used by tests and embedders that preload data.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::models::Course;

/// Maximum number of hits returned by [`CourseCatalog::search`] and
/// [`CourseCatalog::find`].
pub const SEARCH_LIMIT: usize = 50;

/// An academic term offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Registrar code, e.g. `"202610"`.
    pub code: String,
    /// Display name, e.g. `"Fall 2025"`.
    pub name: String,
}

impl Term {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Multi-valued course lookup.
///
/// Each field lists accepted values; an empty field places no constraint.
/// A course matches when every non-empty field contains its value. Codes
/// and subjects compare upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseQuery {
    pub codes: Vec<String>,
    pub terms: Vec<String>,
    pub subjects: Vec<String>,
    pub numbers: Vec<String>,
}

impl CourseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds course codes from a comma-separated list.
    pub fn with_codes(mut self, list: &str) -> Self {
        self.codes.extend(split_list(list).map(|v| v.to_uppercase()));
        self
    }

    /// Adds term codes from a comma-separated list.
    pub fn with_terms(mut self, list: &str) -> Self {
        self.terms.extend(split_list(list).map(str::to_string));
        self
    }

    /// Adds subjects from a comma-separated list.
    pub fn with_subjects(mut self, list: &str) -> Self {
        self.subjects.extend(split_list(list).map(|v| v.to_uppercase()));
        self
    }

    /// Adds course numbers from a comma-separated list.
    pub fn with_numbers(mut self, list: &str) -> Self {
        self.numbers.extend(split_list(list).map(str::to_string));
        self
    }

    /// True if no field constrains the lookup.
    pub fn is_unconstrained(&self) -> bool {
        self.codes.is_empty()
            && self.terms.is_empty()
            && self.subjects.is_empty()
            && self.numbers.is_empty()
    }

    /// Returns true if `course` satisfies every non-empty field.
    pub fn matches(&self, course: &Course) -> bool {
        fn accepts(values: &[String], field: &str) -> bool {
            values.is_empty() || values.iter().any(|v| v == field)
        }
        accepts(&self.codes, &course.code.to_uppercase())
            && accepts(&self.terms, &course.term)
            && accepts(&self.subjects, &course.subject.to_uppercase())
            && accepts(&self.numbers, &course.number)
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|v| !v.is_empty())
}

/// Summary row returned by catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSummary {
    pub code: String,
    pub subject: String,
    pub number: String,
    pub title: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            code: course.code.clone(),
            subject: course.subject.clone(),
            number: course.number.clone(),
            title: course.title.clone(),
        }
    }
}

/// A source of course data.
pub trait CourseCatalog: Send + Sync {
    /// Lists the offered terms. The first entry is the default term.
    fn terms(&self) -> Result<Vec<Term>, CatalogError>;

    /// Fetches a course with all sections and meetings.
    fn fetch_course(&self, code: &str) -> Result<Course, CatalogError>;

    /// Finds courses in `term` whose subject, number, or title contains
    /// `query` (case-insensitive). At most [`SEARCH_LIMIT`] hits.
    ///
    /// A blank query matches nothing.
    fn search(&self, term: &str, query: &str) -> Result<Vec<CourseSummary>, CatalogError>;

    /// Finds courses matching every constrained field of `query`, ordered
    /// by code. At most [`SEARCH_LIMIT`] hits.
    ///
    /// An unconstrained query matches nothing.
    fn find(&self, query: &CourseQuery) -> Result<Vec<CourseSummary>, CatalogError>;
}

/// Catalog backed by a concurrent in-memory map.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    terms: Vec<Term>,
    courses: DashMap<String, Course>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a term. Terms are listed in insertion order.
    pub fn with_term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    /// Adds a course (builder form).
    pub fn with_course(self, course: Course) -> Self {
        self.insert(course);
        self
    }

    /// Adds or replaces a course.
    pub fn insert(&self, course: Course) {
        self.courses.insert(course.code.clone(), course);
    }

    /// Removes a course.
    pub fn remove(&self, code: &str) -> Option<Course> {
        self.courses.remove(code).map(|(_, course)| course)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl InMemoryCatalog {
    fn collect_hits(&self, keep: impl Fn(&Course) -> bool) -> Vec<CourseSummary> {
        let mut hits: Vec<CourseSummary> = self
            .courses
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| CourseSummary::from(entry.value()))
            .collect();
        // Map iteration order is unspecified.
        hits.sort_by(|a, b| a.code.cmp(&b.code));
        hits.truncate(SEARCH_LIMIT);
        hits
    }
}

impl CourseCatalog for InMemoryCatalog {
    fn terms(&self) -> Result<Vec<Term>, CatalogError> {
        Ok(self.terms.clone())
    }

    fn fetch_course(&self, code: &str) -> Result<Course, CatalogError> {
        self.courses
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                debug!(code, "course not in catalog");
                CatalogError::NotFound {
                    code: code.to_string(),
                }
            })
    }

    fn search(&self, term: &str, query: &str) -> Result<Vec<CourseSummary>, CatalogError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.collect_hits(|course| {
            course.term == term
                && [&course.subject, &course.number, &course.title]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        }))
    }

    fn find(&self, query: &CourseQuery) -> Result<Vec<CourseSummary>, CatalogError> {
        if query.is_unconstrained() {
            return Ok(Vec::new());
        }
        Ok(self.collect_hits(|course| query.matches(course)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_term(Term::new("202620", "Spring 2026"))
            .with_term(Term::new("202610", "Fall 2025"))
            .with_course(
                Course::new("CSE174", "202610")
                    .with_subject("CSE", "174")
                    .with_title("Fundamentals of Programming")
                    .with_section(Section::new("10001")),
            )
            .with_course(
                Course::new("CSE274", "202610")
                    .with_subject("CSE", "274")
                    .with_title("Data Abstraction"),
            )
            .with_course(
                Course::new("MTH151", "202620")
                    .with_subject("MTH", "151")
                    .with_title("Calculus I"),
            )
    }

    #[test]
    fn test_fetch_course() {
        let c = catalog();
        let course = c.fetch_course("CSE174").unwrap();
        assert_eq!(course.section_count(), 1);
        assert_eq!(
            c.fetch_course("BIO101"),
            Err(CatalogError::NotFound {
                code: "BIO101".into()
            })
        );
    }

    #[test]
    fn test_search_by_term_and_fields() {
        let c = catalog();
        let hits = c.search("202610", "cse").unwrap();
        assert_eq!(
            hits.iter().map(|h| h.code.as_str()).collect::<Vec<_>>(),
            vec!["CSE174", "CSE274"]
        );
        assert_eq!(c.search("202610", "abstraction").unwrap().len(), 1);
        assert!(c.search("202610", "calculus").unwrap().is_empty());
        assert_eq!(c.search("202620", "151").unwrap()[0].title, "Calculus I");
    }

    #[test]
    fn test_search_blank_query() {
        let c = catalog();
        assert!(c.search("202610", "").unwrap().is_empty());
        assert!(c.search("202610", "   ").unwrap().is_empty());
    }

    #[test]
    fn test_terms_in_order() {
        let terms = catalog().terms().unwrap();
        assert_eq!(terms[0], Term::new("202620", "Spring 2026"));
        assert_eq!(terms.len(), 2);
        assert!(InMemoryCatalog::new().terms().unwrap().is_empty());
    }

    #[test]
    fn test_course_query_parsing() {
        let q = CourseQuery::new()
            .with_codes("cse174, mth151,")
            .with_subjects("cse")
            .with_terms("202610,202620")
            .with_numbers("174");
        assert_eq!(q.codes, vec!["CSE174", "MTH151"]);
        assert_eq!(q.subjects, vec!["CSE"]);
        assert_eq!(q.terms, vec!["202610", "202620"]);
        assert_eq!(q.numbers, vec!["174"]);
        assert!(!q.is_unconstrained());
        assert!(CourseQuery::new().with_codes(" , ").is_unconstrained());
    }

    #[test]
    fn test_find() {
        let c = catalog();
        let codes = |q: &CourseQuery| {
            c.find(q)
                .unwrap()
                .into_iter()
                .map(|h| h.code)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            codes(&CourseQuery::new().with_codes("mth151,cse174")),
            vec!["CSE174", "MTH151"]
        );
        assert_eq!(
            codes(&CourseQuery::new().with_subjects("cse").with_numbers("274,999")),
            vec!["CSE274"]
        );
        assert_eq!(
            codes(&CourseQuery::new().with_subjects("cse,mth").with_terms("202620")),
            vec!["MTH151"]
        );
        assert!(codes(&CourseQuery::new().with_codes("bio101")).is_empty());
        assert!(codes(&CourseQuery::new()).is_empty());
    }

    #[test]
    fn test_find_limit() {
        let c = InMemoryCatalog::new();
        for i in 0..60 {
            c.insert(Course::new(format!("ART{i:03}"), "202610").with_subject("ART", format!("{i:03}")));
        }
        let hits = c.find(&CourseQuery::new().with_subjects("art")).unwrap();
        assert_eq!(hits.len(), SEARCH_LIMIT);
        assert_eq!(hits[0].code, "ART000");
    }

    #[test]
    fn test_search_limit() {
        let c = InMemoryCatalog::new();
        for i in 0..60 {
            c.insert(Course::new(format!("ART{i:03}"), "202610").with_subject("ART", format!("{i:03}")));
        }
        assert_eq!(c.search("202610", "art").unwrap().len(), SEARCH_LIMIT);
    }

    #[test]
    fn test_insert_remove() {
        let c = catalog();
        assert_eq!(c.len(), 3);
        assert!(c.remove("CSE274").is_some());
        assert!(c.remove("CSE274").is_none());
        assert_eq!(c.len(), 2);
        assert!(!c.is_empty());
    }
}
