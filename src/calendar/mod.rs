//! Calendar feed rendering.

pub mod ics;

pub use ics::render_ics;
