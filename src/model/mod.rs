//! Read-only projections of the directory's entities.

mod institution;
mod organizer;
mod seminar;
mod talk;

pub use institution::Institution;
pub use organizer::Organizer;
pub use seminar::SeminarSeries;
pub use talk::Talk;

use std::collections::BTreeSet;

/// Full public visibility tier for a seminar series.
pub const VISIBILITY_PUBLIC: i64 = 2;

/// Access tag for talks any visitor can view.
pub const ACCESS_OPEN: &str = "open";

/// Access tag for talks restricted to logged-in users.
pub const ACCESS_USERS: &str = "users";

/// Items that carry the faceting attributes the counters and the row
/// annotator read.
pub trait Faceted {
    fn topics(&self) -> &BTreeSet<String>;
    fn subjects(&self) -> &BTreeSet<String>;
    fn language(&self) -> &str;
}
