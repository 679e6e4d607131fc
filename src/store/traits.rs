//! Store trait definition.
//!
//! The directory's store supports containment/equality/range/disjunction
//! predicates and distinct-value enumeration over the talks and seminars
//! collections. There are no joins: the search layer emulates them with
//! secondary queries and an in-memory visibility pass.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Institution, Organizer, SeminarSeries, Talk};

use super::Query;

/// Trait for the document store backing the directory.
#[async_trait]
pub trait Store: Send + Sync {
    // ========================================================================
    // Search
    // ========================================================================

    /// Talks matching a query, in store order.
    async fn search_talks(&self, query: &Query) -> Result<Vec<Talk>>;

    /// Seminar series matching a query, in store order.
    async fn search_seminars(&self, query: &Query) -> Result<Vec<SeminarSeries>>;

    /// Shortname projection of a seminar query, for join emulation.
    async fn seminar_shortnames(&self, query: &Query) -> Result<Vec<String>>;

    /// All series keyed by shortname, for the talk visibility pass.
    async fn all_seminars(&self) -> Result<HashMap<String, SeminarSeries>>;

    /// Organizers matching a query, grouped by series shortname and sorted
    /// by listing order within each series.
    async fn organizer_lookup(&self, query: &Query) -> Result<HashMap<String, Vec<Organizer>>>;

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Look up one series by shortname.
    async fn get_seminar(&self, shortname: &str) -> Result<Option<SeminarSeries>>;

    /// Look up one talk by series shortname and counter.
    async fn get_talk(&self, seminar_id: &str, seminar_ctr: u32) -> Result<Option<Talk>>;

    /// All talks of one series, in store order.
    async fn talks_for_seminar(&self, shortname: &str) -> Result<Vec<Talk>>;

    /// Look up one institution by shortname.
    async fn get_institution(&self, shortname: &str) -> Result<Option<Institution>>;

    /// All institutions, sorted by display name.
    async fn list_institutions(&self) -> Result<Vec<Institution>>;

    // ========================================================================
    // Distinct enumeration
    // ========================================================================

    /// Distinct language codes over the talks collection, sorted.
    async fn distinct_talk_languages(&self) -> Result<Vec<String>>;
}
