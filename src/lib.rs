//! colloquia: browse and search layer of a seminar and talk directory.
//!
//! Visitors filter and list seminar series, conferences, and individual
//! talks by subject, topic, institution, access level, language, date
//! range, and keyword. The core is the query-construction pipeline that
//! turns loosely-typed form fields into structured store queries, plus
//! the derived facet counters, per-row filter annotation, calendar (ICS)
//! and JSON/JSONP feeds, and embeddable widgets.
//!
//! Module map:
//! - [`model`]: read-only entity projections (talks, series, organizers,
//!   institutions).
//! - [`store`]: the query/matcher algebra, the [`store::Store`] trait, and
//!   the in-memory implementation.
//! - [`search`]: predicates, query assemblers, fetch and sorting, facet
//!   counters, and the row annotator.
//! - [`calendar`]: ICS feed rendering.
//! - [`web`]: axum router and handlers producing JSON page models.

pub mod calendar;
pub mod config;
pub mod error;
pub mod model;
pub mod search;
pub mod store;
pub mod viewer;
pub mod vocab;
pub mod web;

pub use config::{Config, DeploymentMode};
pub use error::{ColloquiaError, Result};
pub use viewer::Viewer;
pub use vocab::Vocabulary;
