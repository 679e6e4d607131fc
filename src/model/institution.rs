//! Institutions hosting seminar series.

use serde::{Deserialize, Serialize};

use crate::store::{FieldValue, Record};

/// An institution, referenced from series by shortname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub shortname: String,
    pub name: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub city: String,
    /// Email of the maintaining user.
    #[serde(default)]
    pub admin: String,
}

impl Record for Institution {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "shortname" => FieldValue::Str(&self.shortname),
            "name" => FieldValue::Str(&self.name),
            "homepage" => FieldValue::Str(&self.homepage),
            "city" => FieldValue::Str(&self.city),
            "admin" => FieldValue::Str(&self.admin),
            _ => FieldValue::Missing,
        }
    }
}
