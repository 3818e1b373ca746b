//! Input validation for generation requests.
//!
//! Checks a [`GenerationRequest`] before the search runs. Detects:
//! - Selected courses whose data was never loaded
//! - Selected courses offering no sections
//! - Pinned sections the course does not offer
//! - Courses selected twice
//! - Malformed filters
//!
//! None of these abort generation. The generator logs each diagnostic and
//! proceeds; a course that cannot contribute a section simply yields zero
//! schedules.

use std::collections::HashSet;

use crate::generator::GenerationRequest;
use crate::models::ScheduleFilter;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A selected course has no loaded data.
    CourseNotLoaded,
    /// A selected course has no sections.
    EmptyCourse,
    /// A pinned section ID does not exist in its course.
    UnknownPinnedSection,
    /// The same course code is selected more than once.
    DuplicateCourse,
    /// A filter failed its own checks.
    InvalidFilter,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a generation request.
///
/// Checks:
/// 1. Every selected course code is unique
/// 2. Every selected course has loaded data
/// 3. Every loaded course has at least one section
/// 4. Every pinned section exists in its course
/// 5. Every filter is well formed
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn check_request(request: &GenerationRequest) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for code in &request.selected {
        if !seen.insert(code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCourse,
                format!("Course '{code}' is selected more than once"),
            ));
            continue;
        }

        let Some(course) = request.courses.get(code) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::CourseNotLoaded,
                format!("Course '{code}' is selected but not loaded"),
            ));
            continue;
        };

        if course.sections.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCourse,
                format!("Course '{code}' has no sections"),
            ));
        }

        if let Some(section_id) = request.pinned.get(code) {
            if course.section(section_id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownPinnedSection,
                    format!("Course '{code}' has no section '{section_id}'"),
                ));
            }
        }
    }

    if let Err(filter_errors) = validate_filters(&request.filters) {
        errors.extend(filter_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates filters individually.
pub fn validate_filters(filters: &[ScheduleFilter]) -> ValidationResult {
    let errors: Vec<ValidationError> = filters
        .iter()
        .enumerate()
        .filter_map(|(i, f)| {
            f.validate().err().map(|e| {
                ValidationError::new(
                    ValidationErrorKind::InvalidFilter,
                    format!("Filter #{i} ({}): {e}", f.kind()),
                )
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
