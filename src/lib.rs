//! Course schedule generation engine.
//!
//! Given the courses a student selected, each offered in several sections
//! with weekly meeting times, enumerates every conflict-free combination of
//! one section per course, keeps the combinations that satisfy the
//! student's filters, and presents them sorted and paginated.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Section`, `Meeting`, `Schedule`,
//!   `ScheduleFilter`, `FilterSet`, time primitives
//! - **`conflict`**: Pairwise meeting/section overlap checks
//! - **`search`**: Backtracking combination search with cancellation
//! - **`filter`**: Filter evaluation over complete schedules
//! - **`ranking`**: Sort rules, rule engine, pagination
//! - **`generator`**: Request ticketing, supersession, publication
//! - **`selection`**: Caller-owned selection context
//! - **`catalog`**: Course data source abstraction
//! - **`validation`**: Request diagnostics
//! - **`config`**: Engine tunables loaded from JSON
//! - **`error`**: Error types
//!
//! # Example
//!
//! ```
//! use course_planner::generator::{compute_schedules, GenerationRequest};
//! use course_planner::models::{Course, Meeting, Section};
//! use course_planner::search::CancellationToken;
//!
//! let mwf = "MWF".parse().unwrap();
//! let tr = "TR".parse().unwrap();
//! let request = GenerationRequest::new()
//!     .with_course(
//!         Course::new("CSE174", "202610")
//!             .with_section(Section::new("A").with_meeting(Meeting::new(mwf, 540, 590)))
//!             .with_section(Section::new("B").with_meeting(Meeting::new(tr, 540, 615))),
//!     )
//!     .with_course(
//!         Course::new("MTH151", "202610")
//!             .with_section(Section::new("C").with_meeting(Meeting::new(mwf, 560, 610))),
//!     );
//!
//! let schedules = compute_schedules(&request, &CancellationToken::new()).unwrap();
//! assert_eq!(schedules.len(), 1);
//! assert_eq!(schedules[0].section_ids(), vec!["B", "C"]);
//! ```

pub mod catalog;
pub mod config;
pub mod conflict;
pub mod error;
pub mod filter;
pub mod generator;
pub mod models;
pub mod ranking;
pub mod search;
pub mod selection;
pub mod validation;

pub use catalog::{CourseCatalog, CourseQuery, InMemoryCatalog, Term};
pub use config::GeneratorConfig;
pub use error::{CatalogError, ConfigError};
pub use generator::{
    compute_schedules, GenerationOutcome, GenerationRequest, GenerationResult, Generator,
    SelectionKey,
};
pub use ranking::{page, Page, ScheduleSort, ViewMode};
pub use search::{CancellationToken, Cancelled};
pub use selection::SelectionState;
