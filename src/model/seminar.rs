//! Seminar series and conferences.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::store::{FieldValue, Record};
use crate::viewer::Viewer;

use super::{Faceted, VISIBILITY_PUBLIC};

/// A recurring named event series, or a conference when bounded by
/// `start_date`/`end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeminarSeries {
    /// Unique shortname; talks reference it as `seminar_id`.
    pub shortname: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub is_conference: bool,
    /// Conference start, absent for indefinitely recurring series.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Conference end; the browse cutoff is one day permissive on this.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Recurring weekday (0 = Monday), for institution listings.
    #[serde(default)]
    pub weekday: Option<u8>,
    /// Recurring time of day, paired with `weekday`.
    #[serde(default)]
    pub time_of_day: Option<NaiveTime>,
    #[serde(default)]
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_access")]
    pub access: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub room: String,
    /// Shortnames of hosting institutions; empty means unaffiliated.
    #[serde(default)]
    pub institutions: Vec<String>,
    /// Emails of people who may edit this series.
    #[serde(default)]
    pub editors: Vec<String>,
    #[serde(default = "default_true")]
    pub display: bool,
    /// Visibility tier; `2` is fully public.
    #[serde(default = "default_visibility")]
    pub visibility: i64,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_access() -> String {
    super::ACCESS_OPEN.to_string()
}

fn default_true() -> bool {
    true
}

fn default_visibility() -> i64 {
    VISIBILITY_PUBLIC
}

impl SeminarSeries {
    /// Whether listings may show this series to the given viewer.
    ///
    /// The store query already restricts on `display`/`visibility`, but the
    /// talk listing cannot express this join, so the fetch layer re-checks
    /// through here. Editors and admins see their own non-public series.
    pub fn visible_to(&self, viewer: &Viewer) -> bool {
        if !self.display {
            return false;
        }
        if self.visibility == VISIBILITY_PUBLIC {
            return true;
        }
        if viewer.is_admin || viewer.administers_any(&self.subjects) {
            return true;
        }
        match &viewer.email {
            Some(email) => self.editors.iter().any(|e| e == email),
            None => false,
        }
    }
}

impl Faceted for SeminarSeries {
    fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }

    fn subjects(&self) -> &BTreeSet<String> {
        &self.subjects
    }

    fn language(&self) -> &str {
        &self.language
    }
}

impl Record for SeminarSeries {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "shortname" => FieldValue::Str(&self.shortname),
            "name" => FieldValue::Str(&self.name),
            "description" => FieldValue::Str(&self.description),
            "homepage" => FieldValue::Str(&self.homepage),
            "comments" => FieldValue::Str(&self.comments),
            "is_conference" => FieldValue::Bool(self.is_conference),
            "start_date" => match self.start_date {
                Some(d) => FieldValue::Date(d),
                None => FieldValue::Missing,
            },
            "end_date" => match self.end_date {
                Some(d) => FieldValue::Date(d),
                None => FieldValue::Missing,
            },
            "topics" => FieldValue::StrSet(&self.topics),
            "subjects" => FieldValue::StrSet(&self.subjects),
            "language" => FieldValue::Str(&self.language),
            "access" => FieldValue::Str(&self.access),
            "online" => FieldValue::Bool(self.online),
            "room" => {
                if self.room.is_empty() {
                    FieldValue::Missing
                } else {
                    FieldValue::Str(&self.room)
                }
            }
            "institutions" => FieldValue::StrList(&self.institutions),
            "display" => FieldValue::Bool(self.display),
            "visibility" => FieldValue::Int(self.visibility),
            _ => FieldValue::Missing,
        }
    }
}
