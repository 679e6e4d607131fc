//! Store abstraction: query values, matcher evaluation, and backends.

mod matcher;
mod memory;
mod traits;

pub use matcher::{Bound, FieldMatch, FieldValue, Matcher, Query, Record, Value};
pub use memory::{MemoryStore, SeedData};
pub use traits::Store;
