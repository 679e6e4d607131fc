//! Series organizers.
//!
//! Organizers live in their own collection keyed by `seminar_id`; the store
//! has no joins, so the organizer substring filter runs as a secondary query
//! whose results become a per-series lookup used during rendering.

use serde::{Deserialize, Serialize};

use crate::store::{FieldValue, Record};

/// One organizer row for a seminar series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organizer {
    /// Shortname of the series this organizer belongs to.
    pub seminar_id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub email: String,
    /// Whether the organizer appears on the public page.
    #[serde(default = "default_true")]
    pub display: bool,
    /// Listing position within the series.
    #[serde(default)]
    pub order: u32,
}

fn default_true() -> bool {
    true
}

impl Record for Organizer {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "seminar_id" => FieldValue::Str(&self.seminar_id),
            "name" => FieldValue::Str(&self.name),
            "full_name" => FieldValue::Str(&self.full_name),
            "homepage" => FieldValue::Str(&self.homepage),
            "email" => FieldValue::Str(&self.email),
            "display" => FieldValue::Bool(self.display),
            "order" => FieldValue::Int(i64::from(self.order)),
            _ => FieldValue::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Matcher;

    #[test]
    fn test_substring_match_on_name() {
        let organizer = Organizer {
            seminar_id: "numthy".to_string(),
            name: "C. F. Gauss".to_string(),
            full_name: "Carl Friedrich Gauss".to_string(),
            homepage: String::new(),
            email: "gauss@example.edu".to_string(),
            display: true,
            order: 0,
        };
        let m = Matcher::ILike("gauss".to_string());
        assert!(m.matches(organizer.field("full_name")));
        assert!(!m.matches(organizer.field("homepage")));
    }
}
